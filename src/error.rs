use std::path::PathBuf;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("cannot serialize graph for {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid job configuration {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl ConvertError {
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConvertError::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Classify a csv error: I/O failures are access errors, everything else
    /// is malformed input.
    pub fn from_csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let path = path.into();
        let position = err.position().map(|p| p.line());
        match err.into_kind() {
            csv::ErrorKind::Io(source) => ConvertError::FileAccess { path, source },
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => ConvertError::Parse {
                path,
                reason: format!(
                    "line {}: expected {} fields, found {}",
                    position.unwrap_or_default(),
                    expected_len,
                    len
                ),
            },
            csv::ErrorKind::Utf8 { err, .. } => ConvertError::Parse {
                path,
                reason: format!(
                    "line {}: invalid UTF-8 in field {}",
                    position.unwrap_or_default(),
                    err.field() + 1
                ),
            },
            other => ConvertError::Parse {
                path,
                reason: format!("{:?}", other),
            },
        }
    }

    /// Classify a serde_json error raised while writing to `path`.
    pub fn from_json(path: impl Into<PathBuf>, err: serde_json::Error) -> Self {
        let path = path.into();
        if err.is_io() {
            ConvertError::FileAccess {
                path,
                source: err.into(),
            }
        } else {
            ConvertError::Serialization { path, source: err }
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            ConvertError::FileAccess { path, .. }
            | ConvertError::Parse { path, .. }
            | ConvertError::Serialization { path, .. }
            | ConvertError::Config { path, .. } => path,
        }
    }
}
