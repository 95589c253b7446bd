//! Dataset en disco: output de un step de cómputo.
//!
//! Un dataset es un directorio con:
//! - `index.json`: metadata del dataset, incluido `source_checksum`.
//! - `{tabla}.jsonl`: filas de cada tabla (un objeto JSON por línea).
//! - `{tabla}.meta.json`: metadata de cada tabla.
//!
//! El motor sólo interpreta `source_checksum` y `checksum()`; el resto de la
//! metadata es para consumidores downstream.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{INDEX_FILE, TABLE_EXTENSION, TABLE_META_SUFFIX};
use crate::errors::EtlError;
use crate::hashing::{checksum_file, fingerprint};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_accessed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Metadata a nivel dataset (`index.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub licenses: Vec<License>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    /// Fingerprint de los inputs que produjeron este dataset (estampado por el step).
    #[serde(default)]
    pub source_checksum: Option<String>,
}

impl Default for DatasetMeta {
    fn default() -> Self {
        Self { channel: None,
               namespace: None,
               version: None,
               short_name: None,
               title: None,
               description: None,
               sources: Vec::new(),
               licenses: Vec::new(),
               is_public: true,
               source_checksum: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    pub short_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_key: Vec<String>,
}

/// Tabla: metadata + filas JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub meta: TableMeta,
    pub rows: Vec<Value>,
}

impl Table {
    pub fn new(short_name: impl Into<String>, rows: Vec<Value>) -> Self {
        Self { meta: TableMeta { short_name: short_name.into(),
                                 ..TableMeta::default() },
               rows }
    }

    pub fn name(&self) -> &str {
        &self.meta.short_name
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    pub metadata: DatasetMeta,
}

impl Dataset {
    /// Crea (o recrea) un dataset vacío en `path`. Un dataset previo en el
    /// mismo directorio se elimina por completo.
    pub fn create_empty(path: impl Into<PathBuf>, metadata: DatasetMeta) -> Result<Self, EtlError> {
        let path = path.into();
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| EtlError::io(&path, e))?;
        }
        fs::create_dir_all(&path).map_err(|e| EtlError::io(&path, e))?;
        let ds = Self { path, metadata };
        ds.save()?;
        Ok(ds)
    }

    /// Abre un dataset existente. Falla con `DatasetNotFound` si no hay `index.json`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, EtlError> {
        let path = path.into();
        let index = path.join(INDEX_FILE);
        if !index.is_file() {
            return Err(EtlError::DatasetNotFound(path));
        }
        let metadata = read_json(&index)?;
        Ok(Self { path, metadata })
    }

    pub fn exists(path: &Path) -> bool {
        path.join(INDEX_FILE).is_file()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persiste la metadata en `index.json`.
    pub fn save(&self) -> Result<(), EtlError> {
        write_json(&self.path.join(INDEX_FILE), &self.metadata)
    }

    pub fn add_table(&mut self, table: &Table) -> Result<(), EtlError> {
        let name = table.name();
        let rows_path = self.path.join(format!("{name}.{TABLE_EXTENSION}"));
        let file = fs::File::create(&rows_path).map_err(|e| EtlError::io(&rows_path, e))?;
        let mut w = BufWriter::new(file);
        for row in &table.rows {
            writeln!(w, "{row}").map_err(|e| EtlError::io(&rows_path, e))?;
        }
        w.flush().map_err(|e| EtlError::io(&rows_path, e))?;
        write_json(&self.path.join(format!("{name}{TABLE_META_SUFFIX}")), &table.meta)
    }

    /// Nombres de tablas presentes, ordenados.
    pub fn table_names(&self) -> Result<Vec<String>, EtlError> {
        let mut names: Vec<String> = self.files()?
                                         .iter()
                                         .filter_map(|p| p.file_name()?.to_str()?.strip_suffix(TABLE_META_SUFFIX).map(String::from))
                                         .collect();
        names.sort();
        Ok(names)
    }

    pub fn read_table(&self, name: &str) -> Result<Table, EtlError> {
        let meta: TableMeta = read_json(&self.path.join(format!("{name}{TABLE_META_SUFFIX}")))?;
        let rows_path = self.path.join(format!("{name}.{TABLE_EXTENSION}"));
        let file = fs::File::open(&rows_path).map_err(|e| EtlError::io(&rows_path, e))?;
        let mut rows = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| EtlError::io(&rows_path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(&line).map_err(|e| EtlError::Json { path: rows_path.clone(),
                                                                               reason: e.to_string() })?);
        }
        Ok(Table { meta, rows })
    }

    /// Checksum agregado: fingerprint de los checksums de `index.json` y de
    /// cada archivo de tabla, indexados por nombre de archivo.
    pub fn checksum(&self) -> Result<String, EtlError> {
        let mut checksums = BTreeMap::new();
        for file in self.files()? {
            let name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let is_table_file = name.ends_with(TABLE_META_SUFFIX) || name.ends_with(&format!(".{TABLE_EXTENSION}"));
            if name == INDEX_FILE || is_table_file {
                checksums.insert(name, checksum_file(&file)?);
            }
        }
        Ok(fingerprint(&checksums))
    }

    fn files(&self) -> Result<Vec<PathBuf>, EtlError> {
        let entries = fs::read_dir(&self.path).map_err(|e| EtlError::io(&self.path, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| EtlError::io(&self.path, e))?;
            let p = entry.path();
            if p.is_file() {
                files.push(p);
            }
        }
        Ok(files)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, EtlError> {
    let raw = fs::read_to_string(path).map_err(|e| EtlError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| EtlError::Json { path: path.to_path_buf(),
                                                            reason: e.to_string() })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), EtlError> {
    let raw = serde_json::to_string_pretty(value).map_err(|e| EtlError::Json { path: path.to_path_buf(),
                                                                               reason: e.to_string() })?;
    fs::write(path, raw + "\n").map_err(|e| EtlError::io(path, e))
}
