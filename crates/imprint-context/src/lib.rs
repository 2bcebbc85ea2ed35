//! # imprint-context
//!
//! Resolves `@path` imports between memory files and merges memory scopes.
//!
//! - **Parser**: finds `@` directives outside code blocks and inline code
//! - **Paths**: lexical canonicalisation of references, home expansion, sandboxing
//! - **Graph**: import trees with cycle, missing, unreadable and depth annotations
//! - **Merge**: precedence-ordered roots flattened into one instruction set
//! - **Diagnostics**: flat list of broken imports
//!
//! [`MemoryResolver`] is the entry point; the pieces are public for hosts that
//! need them individually.

#![deny(unsafe_code)]

pub mod diagnostics;
pub mod errors;
pub mod graph;
pub mod merge;
pub mod parser;
pub mod paths;
pub mod resolver;

pub use diagnostics::{ImportIssue, IssueKind, collect_issues};
pub use errors::{ResolveError, Result};
pub use graph::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, ImportGraphBuilder, Resolution};
pub use merge::{flatten, merge_roots, order_roots, placeholder};
pub use parser::{ImportDirectives, ImportReference, parse};
pub use paths::{InvalidReference, PathResolver, normalize};
pub use resolver::{MemoryResolver, ResolverConfig};
