//! Scheduler: recorre el plan en orden topológico y ejecuta sólo lo sucio.
//!
//! La suciedad de cada step se evalúa justo antes de decidir si correrlo,
//! después de que sus dependencias ya se reconstruyeron en esta misma
//! pasada: `checksum_input()` lee el `checksum_output()` *actual* de los
//! upstream. Evaluar todo por adelantado usaría estado viejo.
//!
//! Single-thread por diseño: las instancias compartidas y los datasets en
//! disco no admiten `run()` concurrentes sobre subgrafos solapados.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use log::{error, info, warn};

use super::registry::ExecutionPlan;
use super::report::{RunReport, StepOutcome, StepRecord};
use crate::errors::EtlError;
use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use crate::step::SharedStep;

/// Qué hacer cuando un step falla.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// El primer fallo detiene la pasada y se devuelve como error.
    #[default]
    Abort,
    /// El fallo se registra, sus dependientes quedan bloqueados y los
    /// subgrafos no relacionados continúan.
    ContinueUnrelated,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub force: bool,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug)]
pub struct Scheduler<E: EventStore = InMemoryEventStore> {
    options: RunOptions,
    event_store: E,
}

impl Scheduler<InMemoryEventStore> {
    pub fn new(options: RunOptions) -> Self {
        Self { options,
               event_store: InMemoryEventStore::default() }
    }
}

impl<E: EventStore> Scheduler<E> {
    pub fn with_event_store(options: RunOptions, event_store: E) -> Self {
        Self { options, event_store }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.event_store.list()
    }

    /// Ejecuta una pasada sobre el plan.
    ///
    /// Con `FailurePolicy::Abort` el primer error se devuelve envuelto en
    /// `EtlError::StepFailed` con el URI del step; los outputs ya producidos
    /// quedan en disco.
    pub fn run(&mut self, plan: &ExecutionPlan) -> Result<RunReport, EtlError> {
        let opts = self.options;
        self.event_store.append_kind(RunEventKind::RunStarted { step_count: plan.len(),
                                                                dry_run: opts.dry_run,
                                                                force: opts.force });
        let mut report = RunReport::default();
        // step → step raíz que lo dejó inutilizable
        let mut broken: HashMap<String, String> = HashMap::new();
        // dry-run: steps que se habrían ejecutado
        let mut pending: HashSet<String> = HashSet::new();

        for step in plan.steps() {
            let uri = step.uri().to_string();

            if let Some(cause) = blocking_cause(step, &broken) {
                warn!("{uri}: bloqueado por {cause}");
                self.skip(&mut report, &uri, StepOutcome::Blocked { by: cause.clone() }, format!("blocked by {cause}"));
                broken.insert(uri, cause);
                continue;
            }

            let upstream_pending = step.dependencies().iter().any(|d| pending.contains(&d.uri().to_string()));
            // el dataset de referencia nunca se reconstruye, ni siquiera con `force`
            let forced = opts.force && !step.uri().is_reference();
            let dirty = if forced || (opts.dry_run && upstream_pending) {
                Ok(true)
            } else {
                step.is_dirty()
            };
            let dirty = match dirty {
                Ok(d) => d,
                Err(e) => {
                    self.fail(&mut report, &uri, e, None)?;
                    broken.insert(uri.clone(), uri);
                    continue;
                }
            };

            if !dirty {
                info!("{uri}: limpio, se omite");
                self.skip(&mut report, &uri, StepOutcome::Skipped, "clean".into());
                continue;
            }

            // antes del dry-run: el reporte debe coincidir con el de una pasada real
            if !step.can_execute() {
                warn!("{uri}: sucio pero sin implementación ejecutable");
                self.skip(&mut report, &uri, StepOutcome::Unrunnable, "no runnable implementation".into());
                broken.insert(uri.clone(), uri);
                continue;
            }

            if opts.dry_run {
                info!("{uri}: se ejecutaría");
                self.skip(&mut report, &uri, StepOutcome::WouldRun, "dry run".into());
                pending.insert(uri);
                continue;
            }

            let started = Utc::now();
            info!("{uri}: ejecutando");
            self.event_store.append_kind(RunEventKind::StepStarted { step: uri.clone() });
            match step.run() {
                Ok(()) => {
                    self.event_store.append_kind(RunEventKind::StepFinished { step: uri.clone() });
                    report.records.push(StepRecord { step: uri,
                                                     outcome: StepOutcome::Executed,
                                                     started_at: Some(started),
                                                     finished_at: Some(Utc::now()) });
                }
                Err(e) => {
                    self.fail(&mut report, &uri, e, Some(started))?;
                    broken.insert(uri.clone(), uri);
                }
            }
        }

        self.complete(&report);
        Ok(report)
    }

    fn skip(&mut self, report: &mut RunReport, uri: &str, outcome: StepOutcome, reason: String) {
        self.event_store.append_kind(RunEventKind::StepSkipped { step: uri.to_string(), reason });
        report.records.push(StepRecord { step: uri.to_string(),
                                         outcome,
                                         started_at: None,
                                         finished_at: None });
    }

    /// Registra un fallo. Con `Abort` cierra la pasada y devuelve el error.
    fn fail(&mut self,
            report: &mut RunReport,
            uri: &str,
            err: EtlError,
            started: Option<chrono::DateTime<Utc>>)
            -> Result<(), EtlError> {
        error!("{uri}: {err}");
        self.event_store.append_kind(RunEventKind::StepFailed { step: uri.to_string(),
                                                                error: err.to_string() });
        report.records.push(StepRecord { step: uri.to_string(),
                                         outcome: StepOutcome::Failed { error: err.to_string() },
                                         started_at: started,
                                         finished_at: Some(Utc::now()) });
        match self.options.failure_policy {
            FailurePolicy::Abort => {
                self.complete(report);
                Err(EtlError::StepFailed { step: uri.to_string(),
                                           source: Box::new(err) })
            }
            FailurePolicy::ContinueUnrelated => Ok(()),
        }
    }

    fn complete(&mut self, report: &RunReport) {
        let executed = report.executed_count();
        let skipped = report.skipped_count();
        let failed = report.failed_count();
        info!("pasada terminada: {executed} ejecutados, {skipped} omitidos, {failed} fallidos");
        self.event_store.append_kind(RunEventKind::RunCompleted { executed, skipped, failed });
    }
}

fn blocking_cause(step: &SharedStep, broken: &HashMap<String, String>) -> Option<String> {
    step.dependencies()
        .iter()
        .find_map(|d| broken.get(&d.uri().to_string()).cloned())
}
