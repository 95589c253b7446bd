//! Errores del core.
//!
//! Un único enum (`EtlError`) atraviesa el contrato de los steps. Las
//! variantes se agrupan en las clases que el operador necesita distinguir
//! (ver `ErrorCategory`): configuración, staleness, remoto, grafo, IO y
//! transformaciones.

use std::path::PathBuf;

use thiserror::Error;

/// Clase de un error, usada por el binario para decidir cómo reportarlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Metadata ausente o inválida, implementación no encontrada. Nunca se reintenta.
    Configuration,
    /// El output de un upstream no existe. El scheduler lo trata como "dirty".
    Staleness,
    /// Fallos de red o del content store.
    Remote,
    /// Ciclos o dependencias no resolubles. Se detectan antes de ejecutar nada.
    Graph,
    /// Errores del filesystem local.
    Io,
    /// El programa de transformación de un step terminó con error.
    Transform,
}

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("metadata file {0} not found")]
    MetadataNotFound(PathBuf),
    #[error("metadata YAML {0} should be stored under `meta` key")]
    MissingMetaKey(PathBuf),
    #[error("invalid metadata in {path}: {reason}")]
    InvalidMetadata { path: PathBuf, reason: String },
    #[error("no versioning field found")]
    NoVersioningField,
    #[error("have no idea how to run step: {0}")]
    NoImplementation(String),
    #[error("step {step}: module {module} does not define run(dest_dir)")]
    MissingEntryPoint { step: String, module: String },
    #[error("ambiguous implementation for step {step}: {candidates:?}")]
    AmbiguousImplementation { step: String, candidates: Vec<PathBuf> },
    #[error("malformed step uri: {0}")]
    MalformedUri(String),
    #[error("source_data_url is not set for snapshot {0}")]
    SourceUrlNotSet(String),

    #[error("dataset has not been created yet: {0}")]
    DatasetNotFound(PathBuf),

    #[error("no checksum available for {0}")]
    NoChecksum(String),
    #[error("content store: {0}")]
    Store(String),
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("dependency cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
    #[error("step {0} is not declared in the dag")]
    UnknownStep(String),
    #[error("step {step} depends on undeclared step {dependency}")]
    UnknownDependency { step: String, dependency: String },
    #[error("step {step} declared twice ({first} and {second})")]
    DuplicateStep { step: String, first: PathBuf, second: PathBuf },
    #[error("invalid step pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("transform for {step} failed: {reason}")]
    Transform { step: String, reason: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("yaml error in {path}: {reason}")]
    Yaml { path: PathBuf, reason: String },
    #[error("json error in {path}: {reason}")]
    Json { path: PathBuf, reason: String },

    /// Envoltura con el path del step que falló durante una pasada del scheduler.
    #[error("step {step} failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<EtlError>,
    },
}

impl EtlError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MetadataNotFound(_)
            | Self::MissingMetaKey(_)
            | Self::InvalidMetadata { .. }
            | Self::NoVersioningField
            | Self::NoImplementation(_)
            | Self::AmbiguousImplementation { .. }
            | Self::MissingEntryPoint { .. }
            | Self::MalformedUri(_)
            | Self::SourceUrlNotSet(_)
            | Self::Yaml { .. }
            | Self::Json { .. } => ErrorCategory::Configuration,
            Self::DatasetNotFound(_) => ErrorCategory::Staleness,
            Self::NoChecksum(_) | Self::Store(_) | Self::Http { .. } => ErrorCategory::Remote,
            Self::Cycle(_)
            | Self::UnknownStep(_)
            | Self::UnknownDependency { .. }
            | Self::DuplicateStep { .. }
            | Self::InvalidPattern { .. } => ErrorCategory::Graph,
            Self::Transform { .. } => ErrorCategory::Transform,
            Self::Io { .. } => ErrorCategory::Io,
            Self::StepFailed { source, .. } => source.category(),
        }
    }
}
