pub mod category;
pub mod entry;

pub use category::Category;
pub use entry::{ActiveSession, SessionState, TimeEntry};
