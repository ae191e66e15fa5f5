use super::error::{StoreError, StoreResult};
use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate};
use std::env;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the data directory (local `.tally` or global `~/.tally`)
pub const DATA_DIR_NAME: &str = ".tally";

/// Completed entries for the tracked day
pub const ENTRIES_FILE: &str = "time-entries.json";

/// In-progress session, present only while tracking
pub const SESSION_FILE: &str = "current-session.json";

/// Machine-readable export of the tracked day
pub const EXPORT_JSON_FILE: &str = "time-tracking-export.json";

/// Log output while the terminal menu is running
pub const LOG_FILE: &str = "tally.log";

/// Report file name for a day (time-tracking-YYYY-MM-DD.txt)
pub fn report_file_name(day: NaiveDate) -> String {
    format!("time-tracking-{}.txt", day.format("%Y-%m-%d"))
}

/// Resolve the data directory: an explicit override, then a local .tally found
/// by walking up from the current directory, then the global ~/.tally
pub fn resolve_data_dir(override_dir: Option<&Path>) -> StoreResult<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }

    let current_dir = env::current_dir().map_err(|e| StoreError::io(".", e))?;
    if let Some(local_dir) = find_local_dir(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().ok_or(StoreError::NoDataDir)?;
    Ok(home.join(DATA_DIR_NAME))
}

/// Find a local .tally directory by walking up the directory tree
fn find_local_dir(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let candidate = current.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }

        current = current.parent()?;
    }
}

/// Ensure a directory exists
pub fn ensure_dir(dir: &Path) -> StoreResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    }
    Ok(())
}

/// Initialize a local .tally directory in the current directory
pub fn init_local_dir() -> anyhow::Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let data_dir = current_dir.join(DATA_DIR_NAME);

    if data_dir.exists() {
        anyhow::bail!("Tally directory already exists: {}", data_dir.display());
    }

    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create directory: {}", data_dir.display()))?;

    Ok(data_dir)
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> StoreResult<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| StoreError::io(path, e))?;

    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| StoreError::io(path, e))?;

    temp_file
        .persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;

    Ok(())
}

/// Read file content, `None` if the file doesn't exist
pub fn read_file<P: AsRef<Path>>(path: P) -> StoreResult<Option<String>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Remove a file, returns whether it existed
pub fn remove_file<P: AsRef<Path>>(path: P) -> StoreResult<bool> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Copy a file next to itself with a timestamped name (name.bak.YYYYMMDD_HHMMSS.ext)
pub fn backup_file<P: AsRef<Path>>(path: P, at: DateTime<Local>) -> StoreResult<PathBuf> {
    let path = path.as_ref();
    let timestamp = at.format("%Y%m%d_%H%M%S");
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bak")
        .to_string();
    let backup_path = path.with_extension(format!("bak.{}.{}", timestamp, extension));

    fs::copy(path, &backup_path).map_err(|e| StoreError::io(path, e))?;

    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_report_file_name() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(report_file_name(day), "time-tracking-2024-03-05.txt");
    }

    #[test]
    fn test_resolve_data_dir_prefers_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = resolve_data_dir(Some(temp_dir.path())).unwrap();
        assert_eq!(dir, temp_dir.path());
    }

    #[test]
    fn test_find_local_dir_walks_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let local = temp_dir.path().join(DATA_DIR_NAME);
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&local).unwrap();
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_local_dir(&nested), Some(local));
    }

    #[test]
    fn test_atomic_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.json");

        atomic_write(&test_file, "[]").unwrap();
        atomic_write(&test_file, "[1]").unwrap();

        assert_eq!(read_file(&test_file).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_atomic_write_into_missing_dir_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("missing").join("test.json");

        let err = atomic_write(&test_file, "[]").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_read_nonexistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("nonexistent.json");

        assert_eq!(read_file(&test_file).unwrap(), None);
    }

    #[test]
    fn test_remove_file_reports_existence() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("session.json");

        atomic_write(&test_file, "{}").unwrap();
        assert!(remove_file(&test_file).unwrap());
        assert!(!remove_file(&test_file).unwrap());
        assert!(!test_file.exists());
    }

    #[test]
    fn test_backup_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("time-entries.json");

        atomic_write(&test_file, "not json").unwrap();
        let at = Local.with_ymd_and_hms(2024, 3, 15, 8, 30, 5).unwrap();
        let backup_path = backup_file(&test_file, at).unwrap();

        assert_eq!(backup_path, temp_dir.path().join("time-entries.bak.20240315_083005.json"));
        assert_eq!(read_file(&backup_path).unwrap().as_deref(), Some("not json"));
    }
}
