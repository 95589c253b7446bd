//! Registro de tracking en el sidecar YAML.
//!
//! El sidecar de un snapshot guarda la metadata bajo `meta:`; el store sólo
//! toca la clave `outs:`, que liga el archivo local con su objeto:
//!
//! ```yaml
//! meta:
//!   name: ...
//! outs:
//!   - hash: 9f86d0...
//!     size: 1024
//!     path: a.csv
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use sha2::{Digest, Sha256};

use crate::error::StoreError;

const OUTS_KEY: &str = "outs";

/// Una entrada de `outs`: sha256 hex, tamaño en bytes y nombre de archivo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedOutput {
    pub hash: String,
    pub size: u64,
    pub path: String,
}

#[derive(Deserialize)]
struct TrackingDoc {
    #[serde(default)]
    outs: Vec<TrackedOutput>,
}

/// Lee las salidas registradas. Un sidecar sin `outs` devuelve lista vacía.
pub fn read_outs(tracking_path: &Path) -> Result<Vec<TrackedOutput>, StoreError> {
    let raw = fs::read_to_string(tracking_path).map_err(|e| StoreError::io(tracking_path, e))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: TrackingDoc = serde_yaml::from_str(&raw).map_err(|e| StoreError::Tracking { path: tracking_path.to_path_buf(),
                                                                                         reason: e.to_string() })?;
    Ok(doc.outs)
}

/// Primera salida registrada, o `NotTracked`.
pub fn tracked_output(tracking_path: &Path) -> Result<TrackedOutput, StoreError> {
    read_outs(tracking_path)?.into_iter()
                             .next()
                             .ok_or_else(|| StoreError::NotTracked(tracking_path.to_path_buf()))
}

/// Reemplaza `outs` conservando el resto del documento (en particular `meta`).
pub fn write_outs(tracking_path: &Path, outs: &[TrackedOutput]) -> Result<(), StoreError> {
    let invalid = |reason: String| StoreError::Tracking { path: tracking_path.to_path_buf(),
                                                          reason };
    let mut doc = if tracking_path.exists() {
        let raw = fs::read_to_string(tracking_path).map_err(|e| StoreError::io(tracking_path, e))?;
        match serde_yaml::from_str::<Value>(&raw).map_err(|e| invalid(e.to_string()))? {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => return Err(invalid("top level is not a mapping".into())),
        }
    } else {
        Mapping::new()
    };
    let value = serde_yaml::to_value(outs).map_err(|e| invalid(e.to_string()))?;
    doc.insert(Value::String(OUTS_KEY.into()), value);
    let rendered = serde_yaml::to_string(&doc).map_err(|e| invalid(e.to_string()))?;
    fs::write(tracking_path, rendered).map_err(|e| StoreError::io(tracking_path, e))
}

/// sha256 hex y tamaño de un archivo, leído por bloques.
pub fn sha256_file(path: &Path) -> Result<(String, u64), StoreError> {
    let mut file = fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut size = 0u64;
    loop {
        let n = file.read(&mut buf).map_err(|e| StoreError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }
    Ok((format!("{:x}", hasher.finalize()), size))
}
