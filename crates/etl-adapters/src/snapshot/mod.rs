//! Snapshot: un archivo crudo de origen externo más su metadata.
//!
//! Ciclo de vida (`SnapshotState`):
//! `Declared` (sidecar sin archivo) → `Materialized` (archivo local) →
//! `Registered` (checksum en el sidecar) → `Published` (objeto en el remoto).

mod download;
mod meta;

use std::path::PathBuf;
use std::rc::Rc;

use etl_core::EtlError;
use etl_store::{ContentStore, Remote};
use log::info;

use crate::paths::EtlPaths;
pub use download::{download, fetch_etag};
pub use meta::SnapshotMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    Declared,
    Materialized,
    Registered,
    Published,
}

#[derive(Debug)]
pub struct Snapshot {
    uri: String,
    pub metadata: SnapshotMeta,
    paths: Rc<EtlPaths>,
    store: Rc<dyn ContentStore>,
}

impl Snapshot {
    /// `uri` es `namespace/version/short_name.ext`. El sidecar tiene que existir.
    pub fn new(uri: &str, paths: Rc<EtlPaths>, store: Rc<dyn ContentStore>) -> Result<Self, EtlError> {
        let metadata_path = paths.snapshot_metadata(uri);
        if !metadata_path.exists() {
            return Err(EtlError::MetadataNotFound(metadata_path));
        }
        let metadata = SnapshotMeta::load_from_yaml(&metadata_path)?;
        Ok(Self { uri: uri.to_string(),
                  metadata,
                  paths,
                  store })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Archivo materializado.
    pub fn path(&self) -> PathBuf {
        self.paths.snapshot_file(&self.uri)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.paths.snapshot_metadata(&self.uri)
    }

    pub fn remote(&self) -> Remote {
        Remote::for_visibility(self.metadata.is_public)
    }

    pub fn pull(&self) -> Result<(), EtlError> {
        self.store.pull(&self.path(), &self.metadata_path(), self.remote())?;
        Ok(())
    }

    pub fn download_from_source(&self) -> Result<(), EtlError> {
        let url = self.metadata
                      .source_data_url
                      .as_deref()
                      .ok_or_else(|| EtlError::SourceUrlNotSet(self.uri.clone()))?;
        download(url, &self.path())?;
        Ok(())
    }

    /// Registra el archivo local en el store y, con `upload`, lo sube al
    /// canal que corresponde según `is_public`.
    pub fn dvc_add(&self, upload: bool) -> Result<(), EtlError> {
        let out = self.store.add(&self.path(), &self.metadata_path())?;
        info!("snapshot {} registrado con hash {}", self.uri, out.hash);
        if upload {
            self.store.push(&self.path(), &self.metadata_path(), self.remote())?;
        }
        Ok(())
    }

    /// Checksum registrado en el store, si hay.
    pub fn checksum(&self) -> Result<Option<String>, EtlError> {
        Ok(self.store.checksum(&self.metadata_path())?)
    }

    pub fn state(&self) -> Result<SnapshotState, EtlError> {
        let registered = self.checksum()?.is_some();
        let state = if registered && self.store.has_remote_object(&self.metadata_path(), self.remote())? {
            SnapshotState::Published
        } else if registered {
            SnapshotState::Registered
        } else if self.path().exists() {
            SnapshotState::Materialized
        } else {
            SnapshotState::Declared
        };
        Ok(state)
    }
}
