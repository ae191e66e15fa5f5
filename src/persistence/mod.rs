pub mod error;
pub mod files;
pub mod json;

pub use error::{StoreError, StoreResult};
pub use files::{
    atomic_write, backup_file, ensure_dir, init_local_dir, read_file, remove_file,
    report_file_name, resolve_data_dir, ENTRIES_FILE, EXPORT_JSON_FILE, LOG_FILE, SESSION_FILE,
};
pub use json::{load_json, save_json};
