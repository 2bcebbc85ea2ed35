//! Memory scopes and their merge precedence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a memory file lives.
///
/// Ordering of the variants follows the default precedence, highest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Admin-enforced file, read-only for the user.
    Managed,
    /// Per-checkout file that is not committed (`CLAUDE.local.md`).
    Local,
    /// Project file shared through version control.
    Project,
    /// User-wide file under `~/.claude/`.
    User,
}

impl Scope {
    /// Default merge precedence, highest first.
    pub const PRECEDENCE: [Self; 4] = [Self::Managed, Self::Local, Self::Project, Self::User];

    /// Lowercase name used in settings, JSON, and display names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Managed => "managed",
            Self::Local => "local",
            Self::Project => "project",
            Self::User => "user",
        }
    }

    /// Position of this scope in `precedence`, or `None` if absent.
    #[must_use]
    pub fn rank_in(self, precedence: &[Self]) -> Option<usize> {
        precedence.iter().position(|s| *s == self)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known scope.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope '{0}' (expected managed, local, project, or user)")]
pub struct ParseScopeError(pub String);

impl FromStr for Scope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "managed" => Ok(Self::Managed),
            "local" => Ok(Self::Local),
            "project" => Ok(Self::Project),
            "user" => Ok(Self::User),
            _ => Err(ParseScopeError(s.to_owned())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
