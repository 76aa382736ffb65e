//! Local adapters for running without cloud storage.

pub mod fs;

pub use fs::FsAdapter;
