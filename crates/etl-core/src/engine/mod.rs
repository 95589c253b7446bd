//! Engine: registry de steps, plan topológico y scheduler incremental.

pub mod registry;
pub mod report;
pub mod scheduler;

pub use registry::{build_plan, ExecutionPlan, StepFactory, StepRegistry};
pub use report::{RunReport, StepOutcome, StepRecord};
pub use scheduler::{FailurePolicy, RunOptions, Scheduler};
