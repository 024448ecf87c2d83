//! Local filesystem adapters.

pub mod fs;
pub mod progress_file;

pub use fs::LocalFileResolver;
pub use progress_file::JsonFileBackend;
