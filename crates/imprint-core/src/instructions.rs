//! Merged instruction output and its context-window footprint.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scope::Scope;

/// Separator placed between entries when rendering the merged text.
const ENTRY_SEPARATOR: &str = "\n\n";

/// One expanded root memory file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionEntry {
    /// Scope of the root file.
    pub scope: Scope,
    /// Canonical path of the root file.
    pub path: PathBuf,
    /// Root text with imports inlined.
    pub text: String,
    /// Paths whose content was inlined, in inlining order.
    pub included: Vec<PathBuf>,
}

/// Scope-ordered result of merging all root memory files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveInstructionSet {
    /// Entries, highest-precedence scope first.
    pub entries: Vec<InstructionEntry>,
}

impl EffectiveInstructionSet {
    /// Whether no root produced any text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for a single scope, in order.
    pub fn for_scope(&self, scope: Scope) -> impl Iterator<Item = &InstructionEntry> {
        self.entries.iter().filter(move |e| e.scope == scope)
    }

    /// Concatenate every entry's text, separated by a blank line.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }

    /// Estimate how much of the context window the merged memory occupies.
    ///
    /// Uses a flat `chars / chars_per_token` estimate per entry.
    #[must_use]
    pub fn usage(&self, chars_per_token: usize) -> MemoryUsage {
        let divisor = chars_per_token.max(1);
        let items: Vec<UsageItem> = self
            .entries
            .iter()
            .map(|e| UsageItem {
                name: display_name(e.scope, &e.path),
                scope: e.scope,
                path: e.path.clone(),
                estimated_tokens: e.text.chars().count() / divisor,
            })
            .collect();
        let total_tokens = items.iter().map(|i| i.estimated_tokens).sum();
        MemoryUsage {
            items,
            total_tokens,
        }
    }
}

/// Token estimate for one merged entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageItem {
    /// Short label (`project:CLAUDE.md`, `rule:testing`).
    pub name: String,
    /// Scope of the entry.
    pub scope: Scope,
    /// Root file path.
    pub path: PathBuf,
    /// Estimated token count.
    pub estimated_tokens: usize,
}

/// Token estimates for all merged memory files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Per-entry estimates in merge order.
    pub items: Vec<UsageItem>,
    /// Sum of all estimates.
    pub total_tokens: usize,
}

/// Label a root file: rules get `rule:<stem>`, everything else
/// `<scope>:<file name>`.
fn display_name(scope: Scope, path: &Path) -> String {
    let in_rules_dir = path
        .parent()
        .is_some_and(|p| p.components().any(|c| c.as_os_str() == "rules"));
    if in_rules_dir {
        let stem = path
            .file_stem()
            .map_or_else(|| "unknown".to_owned(), |s| s.to_string_lossy().into_owned());
        return format!("rule:{stem}");
    }
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
    format!("{scope}:{file_name}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(scope: Scope, path: &str, text: &str) -> InstructionEntry {
        InstructionEntry {
            scope,
            path: path.into(),
            text: text.into(),
            included: Vec::new(),
        }
    }

    #[test]
    fn render_joins_with_blank_line() {
        let set = EffectiveInstructionSet {
            entries: vec![
                entry(Scope::Local, "/p/CLAUDE.local.md", "local"),
                entry(Scope::User, "/home/u/.claude/CLAUDE.md", "user"),
            ],
        };
        assert_eq!(set.render(), "local\n\nuser");
    }

    #[test]
    fn render_empty() {
        assert!(EffectiveInstructionSet::default().render().is_empty());
        assert!(EffectiveInstructionSet::default().is_empty());
    }

    #[test]
    fn for_scope_filters() {
        let set = EffectiveInstructionSet {
            entries: vec![
                entry(Scope::Project, "/p/CLAUDE.md", "a"),
                entry(Scope::User, "/u/CLAUDE.md", "b"),
                entry(Scope::Project, "/p/.claude/CLAUDE.md", "c"),
            ],
        };
        let texts: Vec<_> = set.for_scope(Scope::Project).map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[test]
    fn usage_estimates_chars_over_four() {
        let set = EffectiveInstructionSet {
            entries: vec![
                entry(Scope::Project, "/p/CLAUDE.md", &"x".repeat(40)),
                entry(Scope::Project, "/p/.claude/rules/testing.md", &"y".repeat(9)),
            ],
        };
        let usage = set.usage(4);
        assert_eq!(usage.items[0].name, "project:CLAUDE.md");
        assert_eq!(usage.items[0].estimated_tokens, 10);
        assert_eq!(usage.items[1].name, "rule:testing");
        assert_eq!(usage.items[1].estimated_tokens, 2);
        assert_eq!(usage.total_tokens, 12);
    }

    #[test]
    fn usage_zero_divisor_is_clamped() {
        let set = EffectiveInstructionSet {
            entries: vec![entry(Scope::User, "/u/CLAUDE.md", "abc")],
        };
        assert_eq!(set.usage(0).total_tokens, 3);
    }
}
