//! Metadata de un snapshot (sección `meta` del sidecar YAML).

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::Local;
use etl_core::EtlError;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

const META_KEY: &str = "meta";

/// Escalar YAML que puede llegar como texto o número (`2020` vs `"2020"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

fn default_true() -> bool {
    true
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Forma tal cual viene del YAML, antes de resolver la versión.
#[derive(Debug, Deserialize)]
struct RawSnapshotMeta {
    namespace: String,
    short_name: String,
    name: String,
    #[serde(default)]
    description: String,
    source_name: String,
    url: String,
    file_extension: String,
    #[serde(default)]
    date_accessed: Option<Scalar>,
    #[serde(default)]
    source_data_url: Option<String>,
    #[serde(default)]
    license_url: Option<String>,
    #[serde(default)]
    license_name: Option<String>,
    #[serde(default)]
    access_notes: Option<String>,
    #[serde(default = "default_true")]
    is_public: bool,
    #[serde(default)]
    version: Option<Scalar>,
    #[serde(default)]
    publication_year: Option<i64>,
    #[serde(default)]
    publication_date: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotMeta {
    pub namespace: String,
    pub short_name: String,
    pub name: String,
    pub description: String,
    pub source_name: String,
    pub url: String,
    pub file_extension: String,
    /// `YYYY-MM-DD`; hoy si no viene en el YAML.
    pub date_accessed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_notes: Option<String>,
    pub is_public: bool,
    /// Siempre string, aunque se derive de un año o una fecha.
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,
    /// Fecha `YYYY-MM-DD` o el literal `latest`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
}

impl TryFrom<RawSnapshotMeta> for SnapshotMeta {
    type Error = EtlError;

    /// La versión explícita gana; si no, `publication_date` y luego `publication_year`.
    fn try_from(raw: RawSnapshotMeta) -> Result<Self, Self::Error> {
        let publication_date = raw.publication_date.map(|d| d.to_string());
        let version = match (&raw.version, &publication_date, raw.publication_year) {
            (Some(v), _, _) => v.to_string(),
            (None, Some(d), _) => d.clone(),
            (None, None, Some(y)) => y.to_string(),
            (None, None, None) => return Err(EtlError::NoVersioningField),
        };
        Ok(Self { namespace: raw.namespace,
                  short_name: raw.short_name,
                  name: raw.name,
                  description: raw.description,
                  source_name: raw.source_name,
                  url: raw.url,
                  file_extension: raw.file_extension,
                  date_accessed: raw.date_accessed.map(|d| d.to_string()).unwrap_or_else(today),
                  source_data_url: raw.source_data_url,
                  license_url: raw.license_url,
                  license_name: raw.license_name,
                  access_notes: raw.access_notes,
                  is_public: raw.is_public,
                  version,
                  publication_year: raw.publication_year,
                  publication_date })
    }
}

impl SnapshotMeta {
    /// Parsea la sección `meta` de un sidecar. Sin `meta` es error duro.
    pub fn load_from_yaml(path: &Path) -> Result<Self, EtlError> {
        let raw = fs::read_to_string(path).map_err(|e| EtlError::io(path, e))?;
        Self::from_yaml_str(&raw, path)
    }

    pub fn from_yaml_str(raw: &str, origin: &Path) -> Result<Self, EtlError> {
        let doc: Value = serde_yaml::from_str(raw).map_err(|e| EtlError::Yaml { path: origin.to_path_buf(),
                                                                              reason: e.to_string() })?;
        let meta = doc.get(META_KEY)
                      .cloned()
                      .ok_or_else(|| EtlError::MissingMetaKey(origin.to_path_buf()))?;
        let parsed: RawSnapshotMeta =
            serde_yaml::from_value(meta).map_err(|e| EtlError::InvalidMetadata { path: origin.to_path_buf(),
                                                                                 reason: e.to_string() })?;
        SnapshotMeta::try_from(parsed)
    }

    /// Escribe la metadata bajo `meta`, conservando el resto del sidecar
    /// (en particular el registro de tracking `outs`).
    pub fn to_yaml(&self, path: &Path) -> Result<(), EtlError> {
        let yaml_err = |reason: String| EtlError::Yaml { path: path.to_path_buf(),
                                                         reason };
        let mut doc = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|e| EtlError::io(path, e))?;
            match serde_yaml::from_str::<Value>(&raw).map_err(|e| yaml_err(e.to_string()))? {
                Value::Mapping(m) => m,
                _ => Mapping::new(),
            }
        } else {
            Mapping::new()
        };
        let value = serde_yaml::to_value(self).map_err(|e| yaml_err(e.to_string()))?;
        doc.insert(Value::String(META_KEY.into()), value);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| EtlError::io(parent, e))?;
        }
        let rendered = serde_yaml::to_string(&doc).map_err(|e| yaml_err(e.to_string()))?;
        fs::write(path, rendered).map_err(|e| EtlError::io(path, e))
    }
}
