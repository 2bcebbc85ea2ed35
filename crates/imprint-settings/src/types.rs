//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every section implements [`Default`]
//! and is marked `#[serde(default)]`, so a settings file only needs the keys
//! it overrides.

use std::path::PathBuf;

use imprint_core::Scope;
use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "paths": { "projectRoot": "/work/app" },
///   "resolver": { "maxDepth": 16 },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImprintSettings {
    /// Filesystem locations.
    pub paths: PathSettings,
    /// Import resolution limits and sandboxing.
    pub resolver: ResolverSettings,
    /// Scope merge behaviour.
    pub merge: MergeSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Filesystem locations used to find memory files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathSettings {
    /// Home directory for `~/` imports and user memory. `$HOME` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    /// Project whose memory files are resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<String>,
    /// Directory relative root paths are resolved against. `/` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
    /// Managed memory file. OS default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_file: Option<String>,
}

impl PathSettings {
    /// Home directory, falling back to `$HOME` and then `/tmp`.
    #[must_use]
    pub fn home_dir(&self) -> PathBuf {
        self.home
            .clone()
            .or_else(|| std::env::var("HOME").ok())
            .map_or_else(|| PathBuf::from("/tmp"), PathBuf::from)
    }
}

/// Import resolution settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverSettings {
    /// Maximum import nesting before a node is marked `depth_exceeded`.
    pub max_depth: usize,
    /// Maximum nodes in one import tree before the rest are marked
    /// `node_limit_exceeded`.
    pub max_nodes: usize,
    /// Path prefixes imports may resolve into. Empty means unrestricted.
    pub allowed_roots: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 10_000,
            allowed_roots: Vec::new(),
        }
    }
}

/// Scope merge settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeSettings {
    /// Scope precedence, highest first.
    pub precedence: Vec<Scope>,
    /// Characters per token for usage estimates.
    pub chars_per_token: usize,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            precedence: Scope::PRECEDENCE.to_vec(),
            chars_per_token: 4,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
