//! Tipos de evento de una pasada del scheduler y estructura `RunEvent`.
//!
//! Cada pasada emite eventos a un `EventStore` append-only. Permiten
//! reconstruir qué se ejecutó, qué se saltó y por qué, sin depender del
//! `RunReport` en memoria.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Inicio de la pasada: cantidad de steps planificados.
    RunStarted { step_count: usize, dry_run: bool, force: bool },
    /// Un step comenzó a ejecutarse. No implica éxito.
    StepStarted { step: String },
    /// Un step terminó correctamente.
    StepFinished { step: String },
    /// Un step no se ejecutó (limpio, bloqueado, sin implementación o dry-run).
    StepSkipped { step: String, reason: String },
    /// Un step terminó con error.
    StepFailed { step: String, error: String },
    /// Cierre de la pasada.
    RunCompleted { executed: usize, skipped: usize, failed: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>,
}
