//! Scope merge: ordered roots in, one effective instruction set out.
//!
//! Each root's import tree is flattened into a single text by splicing every
//! expanded child over the directive that imported it. Within one root a
//! document is inlined at most once; later references to it (and all cycle
//! references) become [`placeholder`] comments. The "already inlined" set is
//! distinct from the ancestor chain used while building and is reset for
//! every root.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use imprint_core::{EffectiveInstructionSet, FileStore, ImportNode, InstructionEntry, Scope};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::graph::{ImportGraphBuilder, Resolution};
use crate::parser::parse;

/// Text that replaces a directive whose target was already inlined.
#[must_use]
pub fn placeholder(path: &Path) -> String {
    format!("<!-- @{} already included -->", path.display())
}

/// Stable-sort roots by scope precedence.
///
/// Scopes missing from `precedence` go last; input order is kept within a
/// scope.
#[must_use]
pub fn order_roots(roots: &[(Scope, PathBuf)], precedence: &[Scope]) -> Vec<(Scope, PathBuf)> {
    let mut ordered = roots.to_vec();
    ordered.sort_by_key(|(scope, _)| scope.rank_in(precedence).unwrap_or(usize::MAX));
    ordered
}

/// Flatten a resolved root into its effective text.
///
/// Returns `None` when the root itself was not read. The second element lists
/// the inlined documents in inlining order (the root excluded). Works on full
/// and de-duplicated trees alike: any occurrence of an already inlined path
/// becomes a placeholder.
#[must_use]
pub fn flatten(resolution: &Resolution) -> Option<(String, Vec<PathBuf>)> {
    let root = &resolution.tree;
    if !root.is_expanded() {
        return None;
    }
    let mut expanded = HashSet::from([root.path.clone()]);
    let mut included = Vec::new();
    let text = splice(root, resolution, &mut expanded, &mut included)?;
    Some((text, included))
}

fn splice(
    node: &ImportNode,
    resolution: &Resolution,
    expanded: &mut HashSet<PathBuf>,
    included: &mut Vec<PathBuf>,
) -> Option<String> {
    let text = resolution.text(&node.path)?;
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    // children were built from this same parse, one per directive
    for (directive, child) in parse(text).zip(&node.children) {
        out.push_str(&text[cursor..directive.offset]);
        if child.cycle || expanded.contains(&child.path) {
            out.push_str(&placeholder(&child.path));
        } else if child.is_expanded() {
            let _ = expanded.insert(child.path.clone());
            included.push(child.path.clone());
            match splice(child, resolution, expanded, included) {
                Some(inlined) => out.push_str(inlined.trim_end_matches(['\n', '\r'])),
                None => out.push_str(&text[directive.span()]),
            }
        } else {
            out.push_str(&text[directive.span()]);
        }
        cursor = directive.offset + directive.len;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

/// Merge `roots` into one instruction set.
///
/// Roots are ordered by `precedence` first. A root that is missing, unreadable
/// or not a valid path produces no entry. Only a store outage fails the call.
pub fn merge_roots<S: FileStore + ?Sized>(
    builder: &ImportGraphBuilder<'_, S>,
    roots: &[(Scope, PathBuf)],
    precedence: &[Scope],
) -> Result<EffectiveInstructionSet> {
    let mut entries = Vec::new();
    for (scope, root) in order_roots(roots, precedence) {
        let resolution = builder.resolve_deduplicated(scope, &root)?;
        let Some((text, included)) = flatten(&resolution) else {
            let tree = &resolution.tree;
            if tree.exists {
                warn!(%scope, root = %tree.path.display(), error = ?tree.error, "memory root unreadable, skipped");
            } else {
                debug!(%scope, root = %tree.path.display(), "memory root missing, skipped");
            }
            continue;
        };
        debug!(%scope, root = %resolution.tree.path.display(), inlined = included.len(), "memory root merged");
        entries.push(InstructionEntry {
            scope,
            path: resolution.tree.path,
            text,
            included,
        });
    }
    Ok(EffectiveInstructionSet { entries })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
