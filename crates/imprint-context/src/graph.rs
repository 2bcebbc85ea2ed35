//! Import graph construction.
//!
//! Expands a root document into an [`ImportNode`] tree by recursively
//! following `@` directives. Every call terminates: a path already on the
//! current expansion path becomes a `cycle` leaf, and nodes deeper than the
//! configured limit become `depth_exceeded` leaves.
//!
//! The ancestor set is a linked chain on the call stack. Each recursive call
//! sees its parent chain plus the current path; siblings never share it. This
//! is separate from de-duplication, which only the merge step asks for.
//!
//! A full tree repeats a shared document's subtree under every importer, so
//! layered diamonds grow exponentially. [`ImportGraphBuilder::resolve`] caps
//! the tree at a node budget; nodes past it become `node_limit_exceeded`
//! leaves. [`ImportGraphBuilder::resolve_deduplicated`] expands each document
//! once and leaves later occurrences childless, which keeps the work linear
//! in the number of distinct files.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use imprint_core::{FileStore, ImportNode, MemoryDocument, NodeError, Scope};
use tracing::{debug, trace, warn};

use crate::errors::Result;
use crate::parser::parse;
use crate::paths::PathResolver;

/// Default limit on import nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default limit on nodes in one tree.
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Paths on the current expansion path, innermost first.
struct Ancestry<'p> {
    path: &'p Path,
    parent: Option<&'p Ancestry<'p>>,
}

impl Ancestry<'_> {
    fn contains(&self, path: &Path) -> bool {
        let mut link = Some(self);
        while let Some(ancestry) = link {
            if ancestry.path == path {
                return true;
            }
            link = ancestry.parent;
        }
        false
    }
}

/// Result of expanding one root.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// Import tree rooted at the (canonical) root path.
    pub tree: ImportNode,
    /// Every document read while building the tree, keyed by canonical path.
    pub documents: BTreeMap<PathBuf, MemoryDocument>,
}

impl Resolution {
    /// Text of a document read during this call.
    #[must_use]
    pub fn text(&self, path: &Path) -> Option<&str> {
        self.documents.get(path).and_then(MemoryDocument::text)
    }
}

/// Outcome of reading one document.
enum Loaded {
    Text(Rc<str>),
    Missing,
    Unreadable(String),
}

/// State of one resolve call.
#[derive(Default)]
struct Walk {
    documents: BTreeMap<PathBuf, MemoryDocument>,
    texts: HashMap<PathBuf, Rc<str>>,
    /// Paths expanded so far, when repeats collapse to leaves.
    expanded: Option<HashSet<PathBuf>>,
    nodes: usize,
}

/// Builds import trees against a [`FileStore`].
///
/// Holds no state between calls; documents are read at most once per call.
pub struct ImportGraphBuilder<'a, S: ?Sized> {
    store: &'a S,
    paths: &'a PathResolver,
    max_depth: usize,
    max_nodes: usize,
}

impl<'a, S: FileStore + ?Sized> ImportGraphBuilder<'a, S> {
    /// Builder with the default limits.
    pub fn new(store: &'a S, paths: &'a PathResolver) -> Self {
        Self {
            store,
            paths,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    /// Override the depth limit. The root is depth 0.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Override the node budget. The root always counts as node 1.
    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes.max(1);
        self
    }

    /// Build the tree for `root`, with imports inheriting `scope`.
    ///
    /// Only a store outage fails the call. A root path that cannot be
    /// canonicalised yields an `invalid_reference` root node.
    pub fn resolve(&self, scope: Scope, root: &Path) -> Result<Resolution> {
        self.run(scope, root, Walk::default())
    }

    /// Like [`resolve`](Self::resolve), but each document is expanded only at
    /// its first occurrence in depth-first order.
    ///
    /// Later occurrences that are not cycles become leaves with no children.
    /// This is the shape [`flatten`](crate::merge::flatten) needs.
    pub fn resolve_deduplicated(&self, scope: Scope, root: &Path) -> Result<Resolution> {
        let walk = Walk {
            expanded: Some(HashSet::new()),
            ..Walk::default()
        };
        self.run(scope, root, walk)
    }

    /// Build only the tree for `root`.
    pub fn build(&self, scope: Scope, root: &Path) -> Result<ImportNode> {
        Ok(self.resolve(scope, root)?.tree)
    }

    fn run(&self, scope: Scope, root: &Path, mut walk: Walk) -> Result<Resolution> {
        let tree = match self.paths.canonical_root(root) {
            Ok(path) => self.expand(path, None, None, 0, scope, &mut walk)?,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "invalid root path");
                ImportNode::failed(root, false, NodeError::invalid_reference(e.to_string()))
            }
        };
        if walk.nodes > self.max_nodes {
            warn!(
                root = %tree.path.display(),
                limit = self.max_nodes,
                "import tree node limit exceeded"
            );
        }
        debug!(
            root = %tree.path.display(),
            %scope,
            nodes = walk.nodes,
            documents = walk.documents.len(),
            "import tree built"
        );
        Ok(Resolution {
            tree,
            documents: walk.documents,
        })
    }

    fn expand(
        &self,
        path: PathBuf,
        via: Option<(&str, usize)>,
        ancestors: Option<&Ancestry<'_>>,
        depth: usize,
        scope: Scope,
        walk: &mut Walk,
    ) -> Result<ImportNode> {
        let attach = |node: ImportNode| match via {
            Some((reference, line)) => node.with_reference(reference, line),
            None => node,
        };
        walk.nodes += 1;

        if ancestors.is_some_and(|chain| chain.contains(&path)) {
            let exists = self.store.exists(scope, &path)?;
            debug!(path = %path.display(), "import cycle");
            return Ok(attach(ImportNode::cycle(path, exists)));
        }

        if walk
            .expanded
            .as_ref()
            .is_some_and(|seen| seen.contains(&path))
        {
            trace!(path = %path.display(), "import already expanded");
            return Ok(attach(ImportNode::new(path)));
        }

        if depth > self.max_depth {
            warn!(path = %path.display(), limit = self.max_depth, "import depth exceeded");
            let error = NodeError::depth_exceeded(self.max_depth);
            return Ok(attach(self.cut(path, scope, error)?));
        }

        if walk.nodes > self.max_nodes {
            trace!(path = %path.display(), limit = self.max_nodes, "import node limit reached");
            let error = NodeError::node_limit_exceeded(self.max_nodes);
            return Ok(attach(self.cut(path, scope, error)?));
        }

        let text = match self.load(&path, scope, walk)? {
            Loaded::Text(text) => text,
            Loaded::Unreadable(message) => {
                debug!(path = %path.display(), error = %message, "import unreadable");
                return Ok(attach(ImportNode::failed(
                    path,
                    true,
                    NodeError::read_error(message),
                )));
            }
            Loaded::Missing => {
                trace!(path = %path.display(), "import missing");
                return Ok(attach(ImportNode::missing(path)));
            }
        };
        if let Some(seen) = walk.expanded.as_mut() {
            let _ = seen.insert(path.clone());
        }

        let chain = Ancestry {
            path: &path,
            parent: ancestors,
        };
        let mut children = Vec::new();
        for reference in parse(&text) {
            let child = match self.paths.resolve(&reference.path, &path) {
                Ok(child_path) => self.expand(
                    child_path,
                    Some((reference.path.as_str(), reference.line)),
                    Some(&chain),
                    depth + 1,
                    scope,
                    walk,
                )?,
                Err(e) => {
                    debug!(
                        origin = %path.display(),
                        reference = %reference.path,
                        error = %e,
                        "invalid import reference"
                    );
                    walk.nodes += 1;
                    ImportNode::failed(
                        self.paths.attempted_path(&reference.path, &path),
                        false,
                        NodeError::invalid_reference(e.to_string()),
                    )
                    .with_reference(&reference.path, reference.line)
                }
            };
            children.push(child);
        }

        let mut node = attach(ImportNode::new(path));
        node.children = children;
        Ok(node)
    }

    /// Leaf for a node a limit stopped before reading.
    fn cut(&self, path: PathBuf, scope: Scope, error: NodeError) -> Result<ImportNode> {
        let exists = self.store.exists(scope, &path)?;
        Ok(ImportNode::failed(path, exists, error))
    }

    /// Read a document once per call.
    fn load(&self, path: &Path, scope: Scope, walk: &mut Walk) -> Result<Loaded> {
        if let Some(text) = walk.texts.get(path) {
            return Ok(Loaded::Text(Rc::clone(text)));
        }
        if let Some(document) = walk.documents.get(path) {
            return Ok(match &document.read_error {
                Some(message) => Loaded::Unreadable(message.clone()),
                None => Loaded::Missing,
            });
        }

        let read = self.store.read(path)?;
        let document = MemoryDocument::from_read(path.to_path_buf(), scope, read);
        let loaded = match (document.text(), &document.read_error) {
            (Some(text), _) => {
                let text: Rc<str> = Rc::from(text);
                let _ = walk.texts.insert(path.to_path_buf(), Rc::clone(&text));
                Loaded::Text(text)
            }
            (None, Some(message)) => Loaded::Unreadable(message.clone()),
            (None, None) => Loaded::Missing,
        };
        let _ = walk.documents.insert(path.to_path_buf(), document);
        Ok(loaded)
    }
}


// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
