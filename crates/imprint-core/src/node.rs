//! Resolved import tree.
//!
//! An [`ImportNode`] is a pure computed value: one call to the graph builder
//! creates a tree, the caller renders or inspects it and drops it.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Why a node could not be expanded (other than "missing" or "cycle").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeErrorKind {
    /// The file exists but could not be read.
    ReadError,
    /// The directive does not form a usable path.
    InvalidReference,
    /// Expansion went deeper than the configured limit.
    DepthExceeded,
    /// The tree already held the configured number of nodes.
    NodeLimitExceeded,
}

impl NodeErrorKind {
    /// Stable name used in JSON and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadError => "read_error",
            Self::InvalidReference => "invalid_reference",
            Self::DepthExceeded => "depth_exceeded",
            Self::NodeLimitExceeded => "node_limit_exceeded",
        }
    }
}

/// Error recorded on a single node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeError {
    /// Error class.
    pub kind: NodeErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl NodeError {
    /// File exists but is unreadable.
    pub fn read_error(message: impl Into<String>) -> Self {
        Self {
            kind: NodeErrorKind::ReadError,
            message: message.into(),
        }
    }

    /// Directive could not be resolved to a path.
    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self {
            kind: NodeErrorKind::InvalidReference,
            message: message.into(),
        }
    }

    /// Expansion stopped at the depth limit.
    #[must_use]
    pub fn depth_exceeded(limit: usize) -> Self {
        Self {
            kind: NodeErrorKind::DepthExceeded,
            message: format!("import depth limit of {limit} exceeded"),
        }
    }

    /// Expansion stopped at the node budget.
    #[must_use]
    pub fn node_limit_exceeded(limit: usize) -> Self {
        Self {
            kind: NodeErrorKind::NodeLimitExceeded,
            message: format!("import tree node limit of {limit} exceeded"),
        }
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// One file in a resolved import tree.
///
/// Invariant: a node that is a cycle point, does not exist, or carries an
/// error has no children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportNode {
    /// Canonical path. For an invalid reference this is the un-normalised
    /// join of the importing directory and the raw reference.
    pub path: PathBuf,
    /// Directive path as written in the importing file (`None` for a root).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// 1-based line of the directive in the importing file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Whether the file exists in the store.
    pub exists: bool,
    /// `true` if this path is already one of its own ancestors.
    pub cycle: bool,
    /// Node-level failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<NodeError>,
    /// Imports found in this file, in source order.
    #[serde(default)]
    pub children: Vec<ImportNode>,
}

impl ImportNode {
    /// Create an existing, error-free node with no children.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reference: None,
            line: None,
            exists: true,
            cycle: false,
            error: None,
            children: Vec::new(),
        }
    }

    /// Node for a path that does not exist.
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self {
            exists: false,
            ..Self::new(path)
        }
    }

    /// Node for a path that is already on the expansion path.
    pub fn cycle(path: impl Into<PathBuf>, exists: bool) -> Self {
        Self {
            exists,
            cycle: true,
            ..Self::new(path)
        }
    }

    /// Node carrying an error.
    pub fn failed(path: impl Into<PathBuf>, exists: bool, error: NodeError) -> Self {
        Self {
            exists,
            error: Some(error),
            ..Self::new(path)
        }
    }

    /// Attach the directive this node was imported through.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>, line: usize) -> Self {
        self.reference = Some(reference.into());
        self.line = Some(line);
        self
    }

    /// Whether this node's file was read and expanded.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.exists && !self.cycle && self.error.is_none()
    }

    /// Whether this node or any descendant is missing, cyclic, or failed.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.is_expanded() || self.children.iter().any(Self::has_issues)
    }

    /// Total number of nodes in the tree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Height of the tree (a leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
