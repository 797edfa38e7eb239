use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`SyncError`].
///
/// Every failure of a sync run falls into one of these buckets; the CLI maps
/// each bucket to its own diagnostic code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Missing or invalid configuration, directory, sheet header or mode flags.
    Config,
    /// Malformed ARB document or sheet structure.
    Parse,
    /// Transport, authentication or API failure of the sheet backend.
    Remote,
    /// Local filesystem failure while reading or writing documents.
    Io,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("--init and --push cannot be used together")]
    ConflictingModes,

    #[error("ARB directory not found: {}", .path.display())]
    MissingDirectory { path: PathBuf },

    #[error("no ARB files matching `{pattern}` in {}", .dir.display())]
    NoDocuments { dir: PathBuf, pattern: String },

    #[error("the sheet has no header row")]
    MissingHeader,

    #[error("invalid ARB file {}: {reason}", .path.display())]
    Document { path: PathBuf, reason: String },

    #[error("{} and {} both map to language '{language}'", .first.display(), .second.display())]
    DuplicateDocument {
        language: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("invalid sheet row {row}: {reason}")]
    Row { row: usize, reason: String },

    #[error("invalid sheet header: {reason}")]
    Header { reason: String },

    #[error("sheet request failed: {message}")]
    Remote {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Build a [`SyncError::Remote`] without an underlying error.
    pub fn remote(message: impl Into<String>) -> Self {
        SyncError::Remote {
            message: message.into(),
            source: None,
        }
    }

    /// Build a [`SyncError::Remote`] that keeps the transport error as its source.
    pub fn remote_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SyncError::Remote {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::ConflictingModes
            | SyncError::MissingDirectory { .. }
            | SyncError::NoDocuments { .. }
            | SyncError::MissingHeader => ErrorKind::Config,
            SyncError::Document { .. }
            | SyncError::DuplicateDocument { .. }
            | SyncError::Row { .. }
            | SyncError::Header { .. } => ErrorKind::Parse,
            SyncError::Remote { .. } => ErrorKind::Remote,
            SyncError::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(SyncError::ConflictingModes.kind(), ErrorKind::Config);
        assert_eq!(SyncError::MissingHeader.kind(), ErrorKind::Config);
        assert_eq!(
            SyncError::Row {
                row: 3,
                reason: "duplicate key".to_string()
            }
            .kind(),
            ErrorKind::Parse
        );
        assert_eq!(SyncError::remote("401").kind(), ErrorKind::Remote);
    }

    #[test]
    fn test_messages_name_the_culprit() {
        let err = SyncError::Document {
            path: PathBuf::from("l10n/app_en.arb"),
            reason: "expected a JSON object".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid ARB file l10n/app_en.arb: expected a JSON object"
        );

        let err = SyncError::Row {
            row: 7,
            reason: "duplicate key 'hello'".to_string(),
        };
        assert_eq!(err.to_string(), "invalid sheet row 7: duplicate key 'hello'");
    }
}
