//! Constantes del motor.
//!
//! Nombres de archivo y convenciones compartidas entre el core y los
//! adapters. Cambiar cualquiera de ellos invalida los checksums ya
//! estampados en datasets existentes.

/// Path del dataset de referencia. Nunca se reconstruye automáticamente.
pub const REFERENCE_PATH: &str = "garden/reference";

/// Archivo de metadata de un dataset.
pub const INDEX_FILE: &str = "index.json";

/// Extensión de los archivos de filas de una tabla (JSON lines).
pub const TABLE_EXTENSION: &str = "jsonl";

/// Sufijo del archivo de metadata de una tabla.
pub const TABLE_META_SUFFIX: &str = ".meta.json";

/// Separador usado al concatenar checksums antes de hashear.
pub const CHECKSUM_SEPARATOR: &str = ",";
