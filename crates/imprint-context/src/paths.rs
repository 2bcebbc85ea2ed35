//! Reference-to-path resolution.
//!
//! Everything here is lexical: no filesystem access, no symlink resolution.
//! Two spellings of the same location (`./a.md`, `a.md`, `x/../a.md`) map to
//! the same [`PathBuf`], which is what cycle detection and de-duplication
//! compare.

use std::path::{Component, Path, PathBuf};

/// Why a reference could not be turned into a path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReference {
    /// Empty or whitespace-only reference.
    #[error("empty import path")]
    Empty,

    /// Reference contains a NUL byte.
    #[error("import path contains a NUL byte")]
    ContainsNul,

    /// `..` climbs above the filesystem root.
    #[error("import path escapes the filesystem root: {0}")]
    EscapesRoot(String),

    /// Resolved path is outside every allowed root.
    #[error("import path outside allowed roots: {}", .0.display())]
    OutsideAllowedRoots(PathBuf),
}

/// Turns `@` references into canonical absolute paths.
#[derive(Clone, Debug)]
pub struct PathResolver {
    home: PathBuf,
    base_dir: PathBuf,
    allowed_roots: Vec<PathBuf>,
}

impl PathResolver {
    /// Resolver for a home directory, unrestricted, with `/` as base directory.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            home: normalize(&home).unwrap_or(home),
            base_dir: PathBuf::from("/"),
            allowed_roots: Vec::new(),
        }
    }

    /// Directory relative root paths are resolved against.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        self.base_dir = normalize(&base_dir).unwrap_or(base_dir);
        self
    }

    /// Restrict resolved imports to these directories. Empty = unrestricted.
    #[must_use]
    pub fn with_allowed_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.allowed_roots = roots
            .into_iter()
            .map(|root| {
                let root = root.into();
                let absolute = if root.is_absolute() {
                    root
                } else {
                    self.base_dir.join(root)
                };
                normalize(&absolute).unwrap_or(absolute)
            })
            .collect();
        self
    }

    /// Home directory used for `~`.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resolve `reference` as written in the document at `origin`.
    pub fn resolve(&self, reference: &str, origin: &Path) -> Result<PathBuf, InvalidReference> {
        if reference.trim().is_empty() {
            return Err(InvalidReference::Empty);
        }
        if reference.contains('\0') {
            return Err(InvalidReference::ContainsNul);
        }

        let joined = self.join(reference, origin);
        let resolved =
            normalize(&joined).ok_or_else(|| InvalidReference::EscapesRoot(reference.to_owned()))?;

        if !self.is_allowed(&resolved) {
            return Err(InvalidReference::OutsideAllowedRoots(resolved));
        }
        Ok(resolved)
    }

    /// The un-normalised location `reference` points at, for reporting
    /// references that failed to resolve.
    #[must_use]
    pub fn attempted_path(&self, reference: &str, origin: &Path) -> PathBuf {
        self.join(reference, origin)
    }

    /// Canonical form of a root document path.
    ///
    /// Relative roots are taken against the base directory. Allowed roots do
    /// not apply: roots are chosen by the host, not by document content.
    pub fn canonical_root(&self, path: &Path) -> Result<PathBuf, InvalidReference> {
        if path.as_os_str().is_empty() {
            return Err(InvalidReference::Empty);
        }
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        normalize(&absolute)
            .ok_or_else(|| InvalidReference::EscapesRoot(path.display().to_string()))
    }

    fn join(&self, reference: &str, origin: &Path) -> PathBuf {
        if reference == "~" {
            return self.home.clone();
        }
        if let Some(rest) = reference.strip_prefix("~/") {
            return self.home.join(rest.trim_start_matches('/'));
        }
        if reference.starts_with('/') {
            return PathBuf::from(reference);
        }
        origin
            .parent()
            .unwrap_or_else(|| Path::new("/"))
            .join(reference)
    }

    fn is_allowed(&self, path: &Path) -> bool {
        self.allowed_roots.is_empty() || self.allowed_roots.iter().any(|root| path.starts_with(root))
    }
}

/// Lexically normalise a path: drop `.`, apply `..`, collapse separators.
///
/// Returns `None` when `..` would climb above the first component.
#[must_use]
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                let _ = out.pop();
                depth -= 1;
            }
            Component::Normal(name) => {
                out.push(name);
                depth += 1;
            }
        }
    }
    Some(out)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn resolver() -> PathResolver {
        PathResolver::new("/home/dev")
    }

    const ORIGIN: &str = "/proj/docs/root.md";

    #[test]
    fn relative_to_origin_directory() {
        let r = resolver();
        assert_eq!(
            r.resolve("rules/security.md", Path::new(ORIGIN)).unwrap(),
            PathBuf::from("/proj/docs/rules/security.md")
        );
        assert_eq!(
            r.resolve("../root.md", Path::new("/proj/docs/rules/security.md"))
                .unwrap(),
            PathBuf::from("/proj/docs/root.md")
        );
    }

    #[test]
    fn spellings_canonicalize_equal() {
        let r = resolver();
        let origin = Path::new(ORIGIN);
        let a = r.resolve("./a.md", origin).unwrap();
        let b = r.resolve("a.md", origin).unwrap();
        let c = r.resolve("x/../a.md", origin).unwrap();
        let d = r.resolve("./x//.././a.md", origin).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c, d);
    }

    #[test]
    fn home_expansion() {
        let r = resolver();
        let origin = Path::new(ORIGIN);
        assert_eq!(r.resolve("~", origin).unwrap(), PathBuf::from("/home/dev"));
        assert_eq!(
            r.resolve("~/.claude/shared.md", origin).unwrap(),
            PathBuf::from("/home/dev/.claude/shared.md")
        );
        // a doubled slash after `~` stays under home
        assert_eq!(
            r.resolve("~//notes.md", origin).unwrap(),
            PathBuf::from("/home/dev/notes.md")
        );
    }

    #[test]
    fn tilde_without_slash_is_relative() {
        assert_eq!(
            resolver().resolve("~other.md", Path::new(ORIGIN)).unwrap(),
            PathBuf::from("/proj/docs/~other.md")
        );
    }

    #[test]
    fn absolute_reference() {
        assert_eq!(
            resolver()
                .resolve("/etc/./shared/../team.md", Path::new(ORIGIN))
                .unwrap(),
            PathBuf::from("/etc/team.md")
        );
    }

    #[test]
    fn empty_and_whitespace_invalid() {
        let r = resolver();
        assert_eq!(r.resolve("", Path::new(ORIGIN)), Err(InvalidReference::Empty));
        assert_eq!(r.resolve("  \t", Path::new(ORIGIN)), Err(InvalidReference::Empty));
    }

    #[test]
    fn nul_byte_invalid() {
        assert_eq!(
            resolver().resolve("a\0.md", Path::new(ORIGIN)),
            Err(InvalidReference::ContainsNul)
        );
    }

    #[test]
    fn escaping_root_invalid() {
        assert_matches!(
            resolver().resolve("../../../../x.md", Path::new(ORIGIN)),
            Err(InvalidReference::EscapesRoot(r)) if r == "../../../../x.md"
        );
        assert_matches!(
            resolver().resolve("/../x.md", Path::new(ORIGIN)),
            Err(InvalidReference::EscapesRoot(_))
        );
    }

    #[test]
    fn allowed_roots_sandbox() {
        let r = resolver().with_allowed_roots(["/proj", "/home/dev/.claude"]);
        let origin = Path::new(ORIGIN);
        assert!(r.resolve("a.md", origin).is_ok());
        assert!(r.resolve("~/.claude/x.md", origin).is_ok());
        assert_matches!(
            r.resolve("/etc/passwd", origin),
            Err(InvalidReference::OutsideAllowedRoots(p)) if p == Path::new("/etc/passwd")
        );
        // component-wise prefix, not string prefix
        assert!(r.resolve("/project-other/a.md", origin).is_err());
    }

    #[test]
    fn relative_allowed_roots_use_base_dir() {
        let r = resolver()
            .with_base_dir("/work")
            .with_allowed_roots(["proj"]);
        assert!(r.resolve("a.md", Path::new("/work/proj/CLAUDE.md")).is_ok());
        assert!(r.resolve("a.md", Path::new("/proj/CLAUDE.md")).is_err());
    }

    #[test]
    fn canonical_root_relative_and_absolute() {
        let r = resolver().with_base_dir("/work/./repo");
        assert_eq!(
            r.canonical_root(Path::new("docs/../CLAUDE.md")).unwrap(),
            PathBuf::from("/work/repo/CLAUDE.md")
        );
        assert_eq!(
            r.canonical_root(Path::new("/a/./b.md")).unwrap(),
            PathBuf::from("/a/b.md")
        );
        assert_eq!(r.canonical_root(Path::new("")), Err(InvalidReference::Empty));
    }

    #[test]
    fn attempted_path_is_unnormalized_join() {
        assert_eq!(
            resolver().attempted_path("../../../../x.md", Path::new(ORIGIN)),
            PathBuf::from("/proj/docs/../../../../x.md")
        );
    }

    #[test]
    fn normalize_rules() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), Some(PathBuf::from("/a/c")));
        assert_eq!(normalize(Path::new("/")), Some(PathBuf::from("/")));
        assert_eq!(normalize(Path::new("/..")), None);
        assert_eq!(normalize(Path::new("a/../..")), None);
    }
}
