use std::collections::BTreeMap;
use std::path::PathBuf;

use log::debug;

use super::definition::SharedStep;
use crate::errors::EtlError;
use crate::hashing::{checksum_file, fingerprint};

/// Fingerprint de todos los ingredientes de un step de cómputo: el
/// `checksum_output` de cada dependencia (clave = URI) y el checksum de cada
/// archivo que define el step (clave = path).
///
/// Las dependencias se leen en su estado *actual*, por lo que el valor cambia
/// en cuanto un upstream se reconstruye dentro de la misma pasada.
pub fn checksum_input(uri: &str, dependencies: &[SharedStep], step_files: &[PathBuf]) -> Result<String, EtlError> {
    let mut checksums = BTreeMap::new();
    for dep in dependencies {
        checksums.insert(dep.uri().to_string(), dep.checksum_output()?);
    }
    for file in step_files {
        checksums.insert(file.to_string_lossy().into_owned(), checksum_file(file)?);
    }
    let fp = fingerprint(&checksums);
    debug!("checksum_input {uri}: {} ingredientes -> {fp}", checksums.len());
    Ok(fp)
}
