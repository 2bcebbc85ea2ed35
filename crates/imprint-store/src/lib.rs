//! # imprint-store
//!
//! [`FileStore`](imprint_core::FileStore) implementations.
//!
//! - **Filesystem store**: reads memory files from disk and discovers the
//!   root documents of each scope from a [`MemoryLayout`]
//! - **In-memory store**: same contract backed by a map, for tests and for
//!   hosts that already hold file contents

#![deny(unsafe_code)]

pub mod fs;
pub mod layout;
pub mod memory;

pub use fs::FsFileStore;
pub use layout::{MemoryLayout, managed_memory_file};
pub use memory::InMemoryFileStore;
