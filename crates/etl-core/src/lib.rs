//! etl-core: motor incremental de steps.
//!
//! Modela los steps del pipeline como nodos de un DAG, calcula fingerprints
//! de sus inputs para decidir qué está desactualizado y re-ejecuta sólo lo
//! que cambió. Las variantes concretas de step (datasets, snapshots, etags)
//! viven en `etl-adapters`; aquí sólo está el contrato y la orquestación.
pub mod constants;
pub mod dag;
pub mod dataset;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod step;

pub use dag::Dag;
pub use dataset::{Dataset, DatasetMeta, Table, TableMeta};
pub use engine::{build_plan, ExecutionPlan, FailurePolicy, RunOptions, RunReport, Scheduler, StepFactory, StepOutcome};
pub use errors::{ErrorCategory, EtlError};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use step::{SharedStep, Step, StepKind, StepUri};
