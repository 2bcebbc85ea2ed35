//! Entry point tying the store, path rules and limits together.

use std::path::{Path, PathBuf};

use imprint_core::{EffectiveInstructionSet, FileStore, ImportNode, Scope};
use imprint_settings::ImprintSettings;
use tracing::debug;

use crate::errors::Result;
use crate::graph::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, ImportGraphBuilder, Resolution};
use crate::merge::merge_roots;
use crate::paths::PathResolver;

/// Limits and ordering for a [`MemoryResolver`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Deepest import level that is still expanded. The root is depth 0.
    pub max_depth: usize,
    /// Node budget for one import tree.
    pub max_nodes: usize,
    /// Scope precedence, highest first. Also the scopes `merge_discovered` lists.
    pub precedence: Vec<Scope>,
    /// Scope used by [`MemoryResolver::build`].
    pub default_scope: Scope,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
            precedence: Scope::PRECEDENCE.to_vec(),
            default_scope: Scope::Project,
        }
    }
}

/// Resolves memory-file imports and merges scopes against one [`FileStore`].
///
/// Stateless between calls: every call re-reads the store, so concurrent
/// calls on a shared resolver are independent.
#[derive(Debug)]
pub struct MemoryResolver<S> {
    store: S,
    paths: PathResolver,
    config: ResolverConfig,
}

impl<S: FileStore> MemoryResolver<S> {
    /// Resolver with default limits.
    pub fn new(store: S, paths: PathResolver) -> Self {
        Self {
            store,
            paths,
            config: ResolverConfig::default(),
        }
    }

    /// Resolver configured from loaded settings.
    pub fn from_settings(store: S, settings: &ImprintSettings) -> Self {
        let mut paths = PathResolver::new(settings.paths.home_dir());
        if let Some(base_dir) = &settings.paths.base_dir {
            paths = paths.with_base_dir(base_dir);
        }
        let paths = paths.with_allowed_roots(&settings.resolver.allowed_roots);

        Self::new(store, paths).with_config(ResolverConfig {
            max_depth: settings.resolver.max_depth,
            max_nodes: settings.resolver.max_nodes,
            precedence: settings.merge.precedence.clone(),
            default_scope: Scope::Project,
        })
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Path rules in use.
    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Current configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn builder(&self) -> ImportGraphBuilder<'_, S> {
        ImportGraphBuilder::new(&self.store, &self.paths)
            .with_max_depth(self.config.max_depth)
            .with_max_nodes(self.config.max_nodes)
    }

    /// Import tree of `root` in the default scope.
    pub fn build(&self, root: &Path) -> Result<ImportNode> {
        self.build_in_scope(self.config.default_scope, root)
    }

    /// Import tree of `root`, with imports inheriting `scope`.
    pub fn build_in_scope(&self, scope: Scope, root: &Path) -> Result<ImportNode> {
        self.builder().build(scope, root)
    }

    /// Import tree of `root` plus every document read to build it.
    pub fn resolve(&self, scope: Scope, root: &Path) -> Result<Resolution> {
        self.builder().resolve(scope, root)
    }

    /// Merge explicit roots into one instruction set.
    pub fn merge(&self, roots: &[(Scope, PathBuf)]) -> Result<EffectiveInstructionSet> {
        merge_roots(&self.builder(), roots, &self.config.precedence)
    }

    /// Roots listed by the store for each configured scope, in precedence order.
    pub fn discover_roots(&self) -> Result<Vec<(Scope, PathBuf)>> {
        let mut roots = Vec::new();
        for &scope in &self.config.precedence {
            let listed = self.store.list_roots(scope)?;
            debug!(%scope, count = listed.len(), "discovered memory roots");
            roots.extend(listed.into_iter().map(|path| (scope, path)));
        }
        Ok(roots)
    }

    /// Merge every root the store lists.
    pub fn merge_discovered(&self) -> Result<EffectiveInstructionSet> {
        let roots = self.discover_roots()?;
        self.merge(&roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imprint_store::InMemoryFileStore;

    #[test]
    fn from_settings_applies_limits() {
        let mut settings = ImprintSettings::default();
        settings.paths.home = Some("/home/dev".into());
        settings.paths.base_dir = Some("/work".into());
        settings.resolver.max_depth = 3;
        settings.resolver.max_nodes = 50;
        settings.resolver.allowed_roots = vec!["proj".into()];
        settings.merge.precedence = vec![Scope::User];

        let resolver = MemoryResolver::from_settings(InMemoryFileStore::new(), &settings);
        assert_eq!(resolver.config().max_depth, 3);
        assert_eq!(resolver.config().max_nodes, 50);
        assert_eq!(resolver.config().precedence, vec![Scope::User]);
        assert_eq!(resolver.paths().home(), Path::new("/home/dev"));
        assert!(
            resolver
                .paths()
                .resolve("a.md", Path::new("/elsewhere/CLAUDE.md"))
                .is_err()
        );
        assert!(
            resolver
                .paths()
                .resolve("a.md", Path::new("/work/proj/CLAUDE.md"))
                .is_ok()
        );
    }

    #[test]
    fn build_uses_default_scope() {
        let store = InMemoryFileStore::new().with_file("/p/CLAUDE.md", "hello");
        let resolver = MemoryResolver::new(store, PathResolver::new("/home/dev"));
        let tree = resolver.build(Path::new("/p/CLAUDE.md")).unwrap();
        assert!(tree.is_expanded());
        assert!(tree.children.is_empty());
    }

    #[test]
    fn discover_follows_configured_precedence() {
        let store = InMemoryFileStore::new()
            .with_root(Scope::User, "/u/CLAUDE.md", "user")
            .with_root(Scope::Project, "/p/CLAUDE.md", "project")
            .with_root(Scope::Managed, "/m/CLAUDE.md", "managed");
        let resolver = MemoryResolver::new(store, PathResolver::new("/u")).with_config(
            ResolverConfig {
                precedence: vec![Scope::User, Scope::Project],
                ..ResolverConfig::default()
            },
        );

        let roots = resolver.discover_roots().unwrap();
        assert_eq!(
            roots,
            vec![
                (Scope::User, PathBuf::from("/u/CLAUDE.md")),
                (Scope::Project, PathBuf::from("/p/CLAUDE.md")),
            ]
        );

        let set = resolver.merge_discovered().unwrap();
        assert_eq!(set.render(), "user\n\nproject");
    }
}
