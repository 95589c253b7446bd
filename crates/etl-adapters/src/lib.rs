//! etl-adapters: steps concretos sobre filesystem, store y HTTP.
//!
//! - `DataStep`: corre la transformación de un step y estampa el
//!   `source_checksum` del dataset resultante.
//! - `SnapshotStep`: materializa un snapshot desde el content store.
//! - `EtagStep`: usa el `ETag` de un recurso externo como checksum.
//!
//! `DefaultStepFactory` conecta estas variantes con el planner del core.
pub mod factory;
pub mod implementation;
pub mod paths;
pub mod runner;
pub mod snapshot;
pub mod steps;

pub use factory::DefaultStepFactory;
pub use implementation::Implementation;
pub use paths::EtlPaths;
pub use runner::{CommandRunner, RunnerConfig, TransformRunner};
pub use snapshot::{Snapshot, SnapshotMeta, SnapshotState};
pub use steps::{DataStep, EtagStep, SnapshotStep};
