//! etlflow
//!
//! Fachada del pipeline de curación de datos:
//! - `config`: configuración desde entorno (.env).
//! - `pipeline`: carga del DAG, selección de steps y ejecución incremental.
//!
//! Los crates del workspace se re-exportan para uso desde `main.rs` o
//! desde otros clientes.

pub mod config;
pub mod pipeline;

pub use etl_adapters::{CommandRunner, DefaultStepFactory, EtlPaths, RunnerConfig, Snapshot, SnapshotMeta, SnapshotState,
                       TransformRunner};
pub use etl_core::{Dag, EtlError, FailurePolicy, RunOptions, RunReport, StepOutcome};
pub use etl_store::{ContentStore, LocalObjectStore, Remote, StoreConfig};
pub use pipeline::{Pipeline, Selection};
