use std::path::PathBuf;
use std::rc::Rc;

use etl_core::{EtlError, Step, StepUri};
use etl_store::ContentStore;
use log::debug;

use crate::paths::EtlPaths;
use crate::snapshot::Snapshot;

/// Step respaldado por el content store: asegura que el archivo del
/// snapshot esté materializado localmente.
#[derive(Debug)]
pub struct SnapshotStep {
    uri: StepUri,
    snapshot: Snapshot,
}

impl SnapshotStep {
    /// Falla si el sidecar del snapshot no existe.
    pub fn new(uri: StepUri, paths: Rc<EtlPaths>, store: Rc<dyn ContentStore>) -> Result<Self, EtlError> {
        let snapshot = Snapshot::new(uri.path(), paths, store)?;
        Ok(Self { uri, snapshot })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn path(&self) -> PathBuf {
        self.snapshot.path()
    }
}

impl Step for SnapshotStep {
    fn uri(&self) -> &StepUri {
        &self.uri
    }

    fn run(&self) -> Result<(), EtlError> {
        if self.path().exists() {
            debug!("{}: ya materializado", self.uri);
            return Ok(());
        }
        self.snapshot.pull()
    }

    /// Sólo existencia del archivo; el contenido no se vuelve a hashear.
    fn is_dirty(&self) -> Result<bool, EtlError> {
        Ok(!self.path().exists())
    }

    fn checksum_output(&self) -> Result<String, EtlError> {
        self.snapshot
            .checksum()?
            .ok_or_else(|| EtlError::NoChecksum(self.uri.path().to_string()))
    }
}
