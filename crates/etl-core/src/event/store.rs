use chrono::Utc;

use super::{RunEvent, RunEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, kind: RunEventKind) -> RunEvent;
    /// Lista los eventos en orden ascendente por seq.
    fn list(&self) -> Vec<RunEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    pub inner: Vec<RunEvent>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, kind: RunEventKind) -> RunEvent {
        let ev = RunEvent { seq: self.inner.len() as u64,
                            kind,
                            ts: Utc::now() };
        self.inner.push(ev.clone());
        ev
    }

    fn list(&self) -> Vec<RunEvent> {
        self.inner.clone()
    }
}
