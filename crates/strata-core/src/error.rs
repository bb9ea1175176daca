//! Error types for Strata.

use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A content category.
    Category,
    /// A content item.
    Content,
    /// A user group.
    Group,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Category => "category",
            EntityKind::Content => "content",
            EntityKind::Group => "group",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while modifying category access or syncing the index.
///
/// Every variant aborts the batch in progress. Nothing at this layer retries;
/// [`Error::is_retryable`] only tells the enclosing transaction manager
/// whether a retry could succeed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The actor may not update the given category.
    #[error("Access denied: {actor} may not update category {category}")]
    AccessDenied {
        /// Actor that attempted the update
        actor: String,
        /// Category the update was refused for
        category: String,
    },

    /// A referenced entity does not exist.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// What kind of entity was looked up
        kind: EntityKind,
        /// Key that was not found
        key: String,
    },

    /// An index transaction operation was invoked in the wrong state.
    #[error("Cannot {operation} index transaction in state {state}")]
    State {
        /// Operation that was attempted
        operation: &'static str,
        /// State the transaction was in
        state: String,
    },

    /// The index store rejected or failed to apply a batch.
    #[error("Index error: {0}")]
    Index(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error with the path that caused it
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Strata operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates an access-denied error.
    pub fn access_denied(actor: impl fmt::Display, category: impl fmt::Display) -> Self {
        Error::AccessDenied {
            actor: actor.to_string(),
            category: category.to_string(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(kind: EntityKind, key: impl fmt::Display) -> Self {
        Error::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Creates a state error.
    pub fn state(operation: &'static str, state: impl fmt::Display) -> Self {
        Error::State {
            operation,
            state: state.to_string(),
        }
    }

    /// Creates an index error.
    pub fn index<S: Into<String>>(message: S) -> Self {
        Error::Index(message.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Wraps an I/O error with the path it occurred at.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns whether retrying the enclosing unit of work could succeed.
    ///
    /// Only store and I/O failures are transient; authorization, lookup
    /// and state errors will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Index(_) | Error::Io { .. } => true,
            Error::AccessDenied { .. }
            | Error::NotFound { .. }
            | Error::State { .. }
            | Error::Config(_) => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_display() {
        let err = Error::access_denied("user:bob", 42);
        assert_eq!(
            err.to_string(),
            "Access denied: user:bob may not update category 42"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found(EntityKind::Group, "G9");
        assert_eq!(err.to_string(), "group not found: G9");
    }

    #[test]
    fn test_state_display() {
        let err = Error::state("commit", "inactive");
        assert_eq!(
            err.to_string(),
            "Cannot commit index transaction in state inactive"
        );
    }

    #[test]
    fn test_io_with_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::io_with_path(io, "/tmp/strata.toml");
        let Error::Io { path, .. } = &err else {
            unreachable!("Expected Io error variant");
        };
        assert_eq!(path, Path::new("/tmp/strata.toml"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::index("writer closed").is_retryable());
        assert!(!Error::config("bad backend").is_retryable());
        assert!(!Error::state("register", "committed").is_retryable());
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
