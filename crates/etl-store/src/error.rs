//! Errores del content store.
//! Se convierten a `EtlError::Store` para viajar por el contrato de los steps.

use std::path::PathBuf;

use etl_core::EtlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store handle is closed")]
    Closed,
    #[error("{0} has no tracked outputs")]
    NotTracked(PathBuf),
    #[error("object {hash} not found in {remote}")]
    ObjectNotFound { hash: String, remote: String },
    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch { path: PathBuf, expected: String, actual: String },
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tracking record {path}: {reason}")]
    Tracking { path: PathBuf, reason: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Errores de IO que vale la pena reintentar.
    pub fn is_transient(&self) -> bool {
        use std::io::ErrorKind;
        match self {
            Self::Io { source, .. } => {
                matches!(source.kind(), ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock)
            }
            _ => false,
        }
    }
}

impl From<StoreError> for EtlError {
    fn from(err: StoreError) -> Self {
        EtlError::Store(err.to_string())
    }
}
