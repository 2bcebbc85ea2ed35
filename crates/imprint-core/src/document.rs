//! Memory documents as seen by one resolution call.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scope::Scope;
use crate::store::FileRead;

/// A memory file read from the store during a single resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDocument {
    /// Canonical path.
    pub path: PathBuf,
    /// Scope of the root this document was reached from.
    pub scope: Scope,
    /// Raw text, absent when the file is missing or unreadable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Whether the file exists.
    pub exists: bool,
    /// Read failure message for files that exist but could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_error: Option<String>,
}

impl MemoryDocument {
    /// Build a document from a store read outcome.
    #[must_use]
    pub fn from_read(path: PathBuf, scope: Scope, read: FileRead) -> Self {
        match read {
            FileRead::Found(text) => Self {
                path,
                scope,
                content: Some(text),
                exists: true,
                read_error: None,
            },
            FileRead::NotFound => Self {
                path,
                scope,
                content: None,
                exists: false,
                read_error: None,
            },
            FileRead::ReadError(message) => Self {
                path,
                scope,
                content: None,
                exists: true,
                read_error: Some(message),
            },
        }
    }

    /// Text content if the document was read successfully.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_document() {
        let doc = MemoryDocument::from_read(
            "/p/CLAUDE.md".into(),
            Scope::Project,
            FileRead::Found("# rules".into()),
        );
        assert!(doc.exists);
        assert_eq!(doc.text(), Some("# rules"));
        assert!(doc.read_error.is_none());
    }

    #[test]
    fn missing_document() {
        let doc = MemoryDocument::from_read("/x.md".into(), Scope::User, FileRead::NotFound);
        assert!(!doc.exists);
        assert!(doc.text().is_none());
    }

    #[test]
    fn unreadable_document_exists_with_error() {
        let doc = MemoryDocument::from_read(
            "/x.md".into(),
            Scope::User,
            FileRead::ReadError("permission denied".into()),
        );
        assert!(doc.exists);
        assert!(doc.text().is_none());
        assert_eq!(doc.read_error.as_deref(), Some("permission denied"));
    }
}
