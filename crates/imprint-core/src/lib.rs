//! # imprint-core
//!
//! Shared types for the memory-file import resolver.
//!
//! - **Scopes**: `managed`, `local`, `project`, `user` with their precedence
//! - **Documents**: memory files as read from a [`FileStore`]
//! - **Import trees**: [`ImportNode`] with per-node existence, cycle, and error state
//! - **Instructions**: the merged [`EffectiveInstructionSet`] and its token usage

#![deny(unsafe_code)]

pub mod document;
pub mod instructions;
pub mod node;
pub mod scope;
pub mod store;

pub use document::MemoryDocument;
pub use instructions::{EffectiveInstructionSet, InstructionEntry, MemoryUsage, UsageItem};
pub use node::{ImportNode, NodeError, NodeErrorKind};
pub use scope::{ParseScopeError, Scope};
pub use store::{FileRead, FileStore, StoreError};
