use std::fmt::Debug;
use std::rc::Rc;

use super::uri::{StepKind, StepUri};
use crate::errors::EtlError;

/// Referencia compartida a un step. El registry construye una única
/// instancia por URI y todos los dependientes apuntan a ella.
pub type SharedStep = Rc<dyn Step>;

/// Trait que define un Step.
///
/// `is_dirty` y `checksum_output` son consultas sin efectos sobre el estado
/// actual en disco/store; sólo `run` modifica el mundo.
pub trait Step: Debug {
    /// URI estable y único dentro del DAG.
    fn uri(&self) -> &StepUri;

    /// Variante del step (derivada del esquema del URI).
    fn kind(&self) -> StepKind {
        self.uri().kind()
    }

    /// Dependencias directas, resueltas una sola vez al construir el grafo.
    fn dependencies(&self) -> &[SharedStep] {
        &[]
    }

    /// Produce el output del step.
    fn run(&self) -> Result<(), EtlError>;

    /// `true` si el output actual está desactualizado respecto a sus inputs.
    fn is_dirty(&self) -> Result<bool, EtlError>;

    /// Fingerprint del artefacto producido actualmente por el step.
    fn checksum_output(&self) -> Result<String, EtlError>;

    /// `false` cuando el step aún no produjo nada en disco.
    fn has_existing_data(&self) -> bool {
        true
    }

    /// `true` si existe una implementación que permita ejecutar el step.
    fn can_execute(&self) -> bool {
        true
    }
}
