#![forbid(unsafe_code)]

pub mod content;
pub mod kv;

pub use content::{ContentStore, InMemoryContentStore, QuestionFilter};
pub use kv::{FileBackend, KvStore, MemoryBackend, StorageBackend, StorageError};
