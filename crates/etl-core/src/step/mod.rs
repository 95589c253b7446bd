//! Definiciones relacionadas a Steps.
//!
//! Un Step es una unidad de trabajo del pipeline identificada por su URI.
//! Este módulo define:
//! - `Step`: contrato uniforme (run / is_dirty / checksum_output) usado por el scheduler.
//! - `StepUri` y `StepKind`: nombre y variante (conjunto cerrado) de cada step.
//! - `checksum_input`: fingerprint de los ingredientes de un step de cómputo.

pub mod checksum;
pub mod definition;
pub mod uri;

pub use checksum::checksum_input;
pub use definition::{SharedStep, Step};
pub use uri::{StepAttributes, StepKind, StepUri};
