//! Hash helpers – abstracción para poder cambiar de algoritmo sin tocar el resto del core.
//!
//! Todos los fingerprints son digests blake3 en hex (64 caracteres).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use blake3::Hasher;

use crate::constants::CHECKSUM_SEPARATOR;
use crate::errors::EtlError;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Checksum del contenido de un archivo (lectura en bloques de 64k).
pub fn checksum_file(path: &Path) -> Result<String, EtlError> {
    let mut file = File::open(path).map_err(|e| EtlError::io(path, e))?;
    let mut h = Hasher::new();
    let mut buf = [0u8; 1 << 16];
    loop {
        let n = file.read(&mut buf).map_err(|e| EtlError::io(path, e))?;
        if n == 0 {
            break;
        }
        h.update(&buf[..n]);
    }
    Ok(h.finalize().to_hex().to_string())
}

/// Fingerprint de un conjunto de checksums indexados por clave.
///
/// Los valores se concatenan con `,` en el orden de las claves (el `BTreeMap`
/// ya está ordenado), de modo que el resultado no depende del orden en que se
/// insertaron.
pub fn fingerprint(checksums: &BTreeMap<String, String>) -> String {
    let in_order: Vec<&str> = checksums.values().map(String::as_str).collect();
    hash_str(&in_order.join(CHECKSUM_SEPARATOR))
}
