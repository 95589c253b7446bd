//! Resultado de una pasada del scheduler.

use chrono::{DateTime, Utc};

/// Qué pasó con un step en la pasada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// `run()` terminó correctamente.
    Executed,
    /// El step estaba limpio.
    Skipped,
    /// Dry-run: se habría ejecutado.
    WouldRun,
    /// Sucio pero sin implementación ejecutable.
    Unrunnable,
    /// `is_dirty()` o `run()` fallaron (sólo con `FailurePolicy::ContinueUnrelated`).
    Failed { error: String },
    /// No se intentó porque un upstream falló o no era ejecutable.
    Blocked { by: String },
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: String,
    pub outcome: StepOutcome,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub records: Vec<StepRecord>,
}

impl RunReport {
    pub fn outcome(&self, step: &str) -> Option<&StepOutcome> {
        self.records.iter().find(|r| r.step == step).map(|r| &r.outcome)
    }

    /// Steps con el outcome indicado, en orden de ejecución.
    pub fn steps_with(&self, outcome: &StepOutcome) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| &r.outcome == outcome)
            .map(|r| r.step.as_str())
            .collect()
    }

    pub fn executed(&self) -> Vec<&str> {
        self.steps_with(&StepOutcome::Executed)
    }

    pub fn executed_count(&self) -> usize {
        self.executed().len()
    }

    pub fn skipped_count(&self) -> usize {
        self.steps_with(&StepOutcome::Skipped).len()
    }

    pub fn failed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, StepOutcome::Failed { .. }))
            .count()
    }

    /// `true` si ningún step falló, quedó bloqueado o sin implementación.
    pub fn is_success(&self) -> bool {
        self.records
            .iter()
            .all(|r| !matches!(r.outcome, StepOutcome::Failed { .. } | StepOutcome::Blocked { .. } | StepOutcome::Unrunnable))
    }
}
