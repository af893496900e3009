//! Repository implementations.
//!
//! - [`LocalRepository`]: in-memory, for tests and single-process runs
//! - [`FileRepository`]: NDJSON files on disk, shared between processes

pub mod file;
pub mod local;

pub use file::FileRepository;
pub use local::LocalRepository;
