//! Error types for import resolution.

use imprint_core::StoreError;

/// Hard failures of a resolve call.
///
/// Per-file problems (missing, unreadable, cyclic, invalid, too deep) are
/// reported on [`ImportNode`](imprint_core::ImportNode)s instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The file store could not be reached.
    #[error("file store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}

/// Convenience result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts() {
        let err: ResolveError = StoreError::Unavailable("disk offline".into()).into();
        assert_eq!(err, ResolveError::StoreUnavailable("disk offline".into()));
        assert_eq!(err.to_string(), "file store unavailable: disk offline");
    }
}
