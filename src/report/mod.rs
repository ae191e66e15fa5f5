pub mod exporter;
pub mod summary;

pub use exporter::{ExportOptions, ExportOutput, Exporter};
pub use summary::{format_hms, Summary};
