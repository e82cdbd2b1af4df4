use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that abort a whole batch run. No report file is produced.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("source directory not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("no image files found in {}", .0.display())]
    NoImages(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl BatchError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        BatchError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Failure of the recognition engine on a single image.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("recognition engine failed: {0}")]
    Failed(String),

    #[error("recognition did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("recognition engine crashed")]
    Crashed,
}

/// Failure of one item's pipeline. The batch skips the item and continues.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("cannot decode {file}: {source}")]
    Decode {
        file: String,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot read {file}: {source}")]
    Read {
        file: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("unexpected failure while processing {0}")]
    Unexpected(String),
}

impl ItemError {
    /// Short label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ItemError::Decode { .. } | ItemError::Read { .. } => "decode",
            ItemError::Engine(EngineError::TimedOut(_)) => "timeout",
            ItemError::Engine(_) => "engine",
            ItemError::Unexpected(_) => "unexpected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        let timeout = ItemError::from(EngineError::TimedOut(Duration::from_secs(3)));
        assert_eq!(timeout.kind(), "timeout");
        assert_eq!(ItemError::from(EngineError::Crashed).kind(), "engine");

        let read = ItemError::Read {
            file: "A1.png".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(read.kind(), "decode");
        assert_eq!(read.to_string(), "cannot read A1.png: gone");
    }
}
