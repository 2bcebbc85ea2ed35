//! Flat list of broken imports for display.

use std::path::{Path, PathBuf};

use imprint_core::{ImportNode, NodeErrorKind};
use serde::{Deserialize, Serialize};

/// What is wrong with an import.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Target does not exist.
    Missing,
    /// Target is already on the expansion path.
    Cycle,
    /// Target exists but could not be read.
    ReadError,
    /// Reference could not be resolved to a path.
    InvalidReference,
    /// Nesting limit reached.
    DepthExceeded,
    /// Node budget reached.
    NodeLimitExceeded,
}

impl From<NodeErrorKind> for IssueKind {
    fn from(kind: NodeErrorKind) -> Self {
        match kind {
            NodeErrorKind::ReadError => Self::ReadError,
            NodeErrorKind::InvalidReference => Self::InvalidReference,
            NodeErrorKind::DepthExceeded => Self::DepthExceeded,
            NodeErrorKind::NodeLimitExceeded => Self::NodeLimitExceeded,
        }
    }
}

/// One broken import.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportIssue {
    /// Problem category.
    pub kind: IssueKind,
    /// Path of the broken node.
    pub path: PathBuf,
    /// Reference text, if the node was imported through a directive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Line of the directive in the importing file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// File containing the directive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importer: Option<PathBuf>,
    /// Error detail, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Collect every issue in `root`, depth-first in tree order.
#[must_use]
pub fn collect_issues(root: &ImportNode) -> Vec<ImportIssue> {
    let mut issues = Vec::new();
    visit(root, None, &mut issues);
    issues
}

fn visit(node: &ImportNode, importer: Option<&Path>, issues: &mut Vec<ImportIssue>) {
    let kind = if node.cycle {
        Some(IssueKind::Cycle)
    } else if let Some(error) = &node.error {
        Some(error.kind.into())
    } else if !node.exists {
        Some(IssueKind::Missing)
    } else {
        None
    };

    if let Some(kind) = kind {
        issues.push(ImportIssue {
            kind,
            path: node.path.clone(),
            reference: node.reference.clone(),
            line: node.line,
            importer: importer.map(Path::to_path_buf),
            message: node.error.as_ref().map(|e| e.message.clone()),
        });
    }

    for child in &node.children {
        visit(child, Some(&node.path), issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imprint_core::NodeError;

    #[test]
    fn healthy_tree_has_no_issues() {
        let mut root = ImportNode::new("/a.md");
        root.children.push(ImportNode::new("/b.md").with_reference("b.md", 1));
        assert!(collect_issues(&root).is_empty());
    }

    #[test]
    fn issues_in_depth_first_order() {
        let mut b = ImportNode::new("/b.md").with_reference("b.md", 1);
        b.children
            .push(ImportNode::cycle("/a.md", true).with_reference("a.md", 3));
        let mut root = ImportNode::new("/a.md");
        root.children.push(b);
        root.children
            .push(ImportNode::missing("/gone.md").with_reference("gone.md", 2));
        root.children.push(
            ImportNode::failed("/deep.md", true, NodeError::depth_exceeded(8))
                .with_reference("deep.md", 4),
        );

        let issues = collect_issues(&root);
        let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            [IssueKind::Cycle, IssueKind::Missing, IssueKind::DepthExceeded]
        );
        assert_eq!(issues[0].importer.as_deref(), Some(Path::new("/b.md")));
        assert_eq!(issues[0].line, Some(3));
        assert_eq!(issues[1].importer.as_deref(), Some(Path::new("/a.md")));
        assert_eq!(
            issues[2].message.as_deref(),
            Some("import depth limit of 8 exceeded")
        );
    }

    #[test]
    fn missing_root_has_no_importer() {
        let issues = collect_issues(&ImportNode::missing("/nope.md"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Missing);
        assert!(issues[0].importer.is_none());
        assert!(issues[0].reference.is_none());
    }

    #[test]
    fn serializes_snake_case_kind() {
        let issue = ImportIssue {
            kind: IssueKind::InvalidReference,
            path: "/x".into(),
            reference: Some("../../x".into()),
            line: Some(1),
            importer: None,
            message: Some("empty import path".into()),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "invalid_reference");
        assert_eq!(json["reference"], "../../x");
        assert!(json.get("importer").is_none());
    }
}
