use std::rc::Rc;

use etl_core::{EtlError, SharedStep, StepFactory, StepKind, StepUri};
use etl_store::ContentStore;
use log::warn;

use crate::paths::EtlPaths;
use crate::runner::TransformRunner;
use crate::steps::{DataStep, EtagStep, SnapshotStep};

/// Construye la variante de step según el esquema del URI.
#[derive(Debug, Clone)]
pub struct DefaultStepFactory {
    paths: Rc<EtlPaths>,
    store: Rc<dyn ContentStore>,
    runner: Rc<dyn TransformRunner>,
}

impl DefaultStepFactory {
    pub fn new(paths: Rc<EtlPaths>, store: Rc<dyn ContentStore>, runner: Rc<dyn TransformRunner>) -> Self {
        Self { paths, store, runner }
    }

    pub fn paths(&self) -> &EtlPaths {
        &self.paths
    }
}

impl StepFactory for DefaultStepFactory {
    fn build(&self, uri: &StepUri, dependencies: Vec<SharedStep>) -> Result<SharedStep, EtlError> {
        if uri.kind() != StepKind::Data && !dependencies.is_empty() {
            warn!("{uri}: las dependencias de un step hoja se ignoran");
        }
        let step: SharedStep = match uri.kind() {
            StepKind::Data => Rc::new(DataStep::new(uri.clone(), dependencies, self.paths.clone(), self.runner.clone())),
            StepKind::Snapshot => Rc::new(SnapshotStep::new(uri.clone(), self.paths.clone(), self.store.clone())?),
            StepKind::Etag => Rc::new(EtagStep::new(uri.clone())),
        };
        Ok(step)
    }
}
