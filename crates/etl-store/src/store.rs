use std::fmt::Debug;
use std::path::Path;

use crate::error::StoreError;
use crate::remote::Remote;
use crate::tracking::TrackedOutput;

/// Contrato del content store de archivos grandes.
///
/// Cada operación recibe el archivo local y su sidecar de tracking: el
/// sidecar es lo único que liga el archivo con el objeto remoto.
/// El handle se construye explícitamente, se inyecta en snapshots y steps y
/// se cierra al final del proceso.
pub trait ContentStore: Debug {
    /// Trae el objeto registrado al path local. No-op si ya está.
    fn pull(&self, local_path: &Path, tracking_path: &Path, remote: Remote) -> Result<(), StoreError>;

    /// Registra el checksum del archivo local en el sidecar y lo guarda en el cache.
    fn add(&self, local_path: &Path, tracking_path: &Path) -> Result<TrackedOutput, StoreError>;

    /// Sube el objeto registrado al canal remoto.
    fn push(&self, local_path: &Path, tracking_path: &Path, remote: Remote) -> Result<(), StoreError>;

    /// Checksum registrado del objeto; `None` si el sidecar no tiene `outs`.
    fn checksum(&self, tracking_path: &Path) -> Result<Option<String>, StoreError>;

    /// `true` si el objeto registrado ya existe en el remoto.
    fn has_remote_object(&self, tracking_path: &Path, remote: Remote) -> Result<bool, StoreError>;

    /// Libera el handle. Las operaciones posteriores fallan con `StoreError::Closed`.
    fn close(&self) -> Result<(), StoreError>;
}
