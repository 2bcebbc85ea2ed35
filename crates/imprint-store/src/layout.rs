//! Where memory files live on disk.
//!
//! Root memory documents per scope (highest precedence first):
//!
//! | Scope | Files |
//! |---|---|
//! | managed | OS-specific `ClaudeCode/CLAUDE.md` under the system config dir |
//! | local | `<project>/CLAUDE.local.md` |
//! | project | `<project>/CLAUDE.md`, `<project>/.claude/CLAUDE.md`, `<project>/.claude/rules/**/*.md` |
//! | user | `~/.claude/CLAUDE.md`, `~/.claude/rules/**/*.md` |

use std::path::{Path, PathBuf};

use imprint_core::Scope;
use walkdir::WalkDir;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Name of a scope's main memory file.
const MEMORY_FILENAME: &str = "CLAUDE.md";

/// Name of the per-checkout memory file.
const LOCAL_MEMORY_FILENAME: &str = "CLAUDE.local.md";

/// Agent config directory inside a project or home directory.
const AGENT_DIR: &str = ".claude";

/// Rules directory inside the agent config directory.
const RULES_DIR: &str = "rules";

/// Maximum directory depth scanned below a rules directory.
const RULES_MAX_DEPTH: usize = 8;

/// OS-specific managed memory file (admin-enforced, read-only).
#[must_use]
pub fn managed_memory_file() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Library/Application Support/ClaudeCode/CLAUDE.md")
    } else if cfg!(target_os = "windows") {
        PathBuf::from("C:/ProgramData/ClaudeCode/CLAUDE.md")
    } else {
        PathBuf::from("/etc/claude-code/CLAUDE.md")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Locations of memory files for one user and (optionally) one project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryLayout {
    /// User home directory.
    pub home: PathBuf,
    /// Project root; without it, project and local scopes are empty.
    pub project_root: Option<PathBuf>,
    /// Managed memory file.
    pub managed_file: PathBuf,
}

impl MemoryLayout {
    /// Layout for a home directory with the OS default managed file.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            project_root: None,
            managed_file: managed_memory_file(),
        }
    }

    /// Set the project root.
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Override the managed memory file.
    #[must_use]
    pub fn with_managed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.managed_file = path.into();
        self
    }

    /// `~/.claude/CLAUDE.md`.
    #[must_use]
    pub fn user_memory_file(&self) -> PathBuf {
        self.home.join(AGENT_DIR).join(MEMORY_FILENAME)
    }

    /// `~/.claude/rules/`.
    #[must_use]
    pub fn user_rules_dir(&self) -> PathBuf {
        self.home.join(AGENT_DIR).join(RULES_DIR)
    }

    /// `<project>/CLAUDE.local.md`.
    #[must_use]
    pub fn local_memory_file(&self) -> Option<PathBuf> {
        self.project_root
            .as_ref()
            .map(|root| root.join(LOCAL_MEMORY_FILENAME))
    }

    /// Candidate root documents for a scope, in listing order.
    ///
    /// Only files that exist are returned. Rules files are listed after the
    /// scope's main memory files, sorted by path.
    #[must_use]
    pub fn roots(&self, scope: Scope) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        match scope {
            Scope::Managed => candidates.push(self.managed_file.clone()),
            Scope::Local => candidates.extend(self.local_memory_file()),
            Scope::Project => {
                if let Some(root) = &self.project_root {
                    candidates.push(root.join(MEMORY_FILENAME));
                    candidates.push(root.join(AGENT_DIR).join(MEMORY_FILENAME));
                }
            }
            Scope::User => candidates.push(self.user_memory_file()),
        }
        candidates.retain(|p| p.is_file());

        let rules_dir = match scope {
            Scope::Project => self
                .project_root
                .as_ref()
                .map(|root| root.join(AGENT_DIR).join(RULES_DIR)),
            Scope::User => Some(self.user_rules_dir()),
            Scope::Managed | Scope::Local => None,
        };
        if let Some(dir) = rules_dir {
            candidates.extend(rules_files(&dir));
        }
        candidates
    }
}

/// Markdown files below `dir`, depth-first, sorted by file name.
fn rules_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .max_depth(RULES_MAX_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("md"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, create_dir_all};
    use tempfile::TempDir;

    fn write_file(root: &Path, relative_path: &str, content: &str) {
        let full = root.join(relative_path);
        create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn layout(tmp: &TempDir) -> MemoryLayout {
        MemoryLayout::new(tmp.path().join("home"))
            .with_project_root(tmp.path().join("proj"))
            .with_managed_file(tmp.path().join("etc/CLAUDE.md"))
    }

    #[test]
    fn user_roots_memory_then_rules() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "home/.claude/CLAUDE.md", "user");
        write_file(tmp.path(), "home/.claude/rules/style.md", "style");
        write_file(tmp.path(), "home/.claude/rules/api/errors.md", "errors");
        write_file(tmp.path(), "home/.claude/rules/notes.txt", "ignored");

        let roots = layout(&tmp).roots(Scope::User);
        let home = tmp.path().join("home/.claude");
        assert_eq!(
            roots,
            vec![
                home.join("CLAUDE.md"),
                home.join("rules/api/errors.md"),
                home.join("rules/style.md"),
            ]
        );
    }

    #[test]
    fn project_roots_in_listing_order() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "proj/CLAUDE.md", "root");
        write_file(tmp.path(), "proj/.claude/CLAUDE.md", "agent dir");
        write_file(tmp.path(), "proj/.claude/rules/testing.md", "tests");

        let roots = layout(&tmp).roots(Scope::Project);
        let proj = tmp.path().join("proj");
        assert_eq!(
            roots,
            vec![
                proj.join("CLAUDE.md"),
                proj.join(".claude/CLAUDE.md"),
                proj.join(".claude/rules/testing.md"),
            ]
        );
    }

    #[test]
    fn local_and_managed_roots() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "proj/CLAUDE.local.md", "local");
        write_file(tmp.path(), "etc/CLAUDE.md", "managed");

        let layout = layout(&tmp);
        assert_eq!(
            layout.roots(Scope::Local),
            vec![tmp.path().join("proj/CLAUDE.local.md")]
        );
        assert_eq!(
            layout.roots(Scope::Managed),
            vec![tmp.path().join("etc/CLAUDE.md")]
        );
    }

    #[test]
    fn missing_files_are_not_listed() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp);
        for scope in Scope::PRECEDENCE {
            assert!(layout.roots(scope).is_empty(), "{scope}");
        }
    }

    #[test]
    fn no_project_root_means_no_project_or_local_roots() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "proj/CLAUDE.md", "root");
        write_file(tmp.path(), "proj/CLAUDE.local.md", "local");

        let layout = MemoryLayout::new(tmp.path().join("home"));
        assert!(layout.roots(Scope::Project).is_empty());
        assert!(layout.roots(Scope::Local).is_empty());
    }

    #[test]
    fn markdown_extension_case_insensitive() {
        assert!(is_markdown(Path::new("/a/B.MD")));
        assert!(!is_markdown(Path::new("/a/b.markdown")));
        assert!(!is_markdown(Path::new("/a/md")));
    }
}
