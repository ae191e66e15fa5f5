use super::error::{StoreError, StoreResult};
use super::files::{atomic_write, read_file};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Load a JSON document, `None` if the file doesn't exist
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> StoreResult<Option<T>> {
    let path = path.as_ref();
    let Some(content) = read_file(path)? else {
        return Ok(None);
    };

    let value = serde_json::from_str(&content).map_err(|e| StoreError::json(path, e))?;
    Ok(Some(value))
}

/// Save a JSON document, replacing the file atomically
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> StoreResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::json(path, e))?;
    atomic_write(path, &json)
}
