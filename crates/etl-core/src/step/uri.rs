//! URIs de steps (`scheme://path`).
//!
//! El esquema decide la variante de step que se construye:
//! - `data://` / `data-private://` → step de cómputo.
//! - `snapshot://` / `snapshot-private://` → step respaldado por el content store.
//! - `etag://` → step de servicio externo.

use std::fmt;
use std::str::FromStr;

use crate::constants::REFERENCE_PATH;
use crate::errors::EtlError;

/// Conjunto cerrado de variantes de step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
    Data,
    Snapshot,
    Etag,
}

impl StepKind {
    fn scheme(&self) -> &'static str {
        match self {
            StepKind::Data => "data",
            StepKind::Snapshot => "snapshot",
            StepKind::Etag => "etag",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepUri {
    kind: StepKind,
    path: String,
    is_private: bool,
}

/// Atributos de un step: `channel/namespace/version/short_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepAttributes {
    pub channel: String,
    pub namespace: String,
    pub version: String,
    pub short_name: String,
}

impl StepUri {
    pub fn parse(raw: &str) -> Result<Self, EtlError> {
        let malformed = || EtlError::MalformedUri(raw.to_string());
        let (prefix, path) = raw.split_once("://").ok_or_else(malformed)?;
        let (scheme, is_private) = match prefix.strip_suffix("-private") {
            Some(s) => (s, true),
            None => (prefix, false),
        };
        let kind = match scheme {
            "data" => StepKind::Data,
            "snapshot" => StepKind::Snapshot,
            "etag" if !is_private => StepKind::Etag,
            _ => return Err(malformed()),
        };
        if path.is_empty() || path.starts_with('/') || path.ends_with('/') || path.split('/').any(str::is_empty) {
            return Err(malformed());
        }
        let segments = path.split('/').count();
        let valid = match kind {
            StepKind::Data => segments == 4 || path == REFERENCE_PATH,
            StepKind::Snapshot => segments == 3 && path.rsplit('/').next().is_some_and(|f| f.contains('.')),
            StepKind::Etag => true,
        };
        if !valid {
            return Err(malformed());
        }
        Ok(Self { kind, path: path.to_string(), is_private })
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Path sin esquema, p.ej. `garden/who/2022-07-17/who_vaccination`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    pub fn is_reference(&self) -> bool {
        self.kind == StepKind::Data && self.path == REFERENCE_PATH
    }

    /// Atributos del step.
    ///
    /// - datos: `channel/namespace/version/short_name`; el dataset de referencia
    ///   no tiene namespace ni versión propios y se reporta como `garden/owid/latest/reference`.
    /// - snapshot: canal `snapshot`, `short_name` es el nombre de archivo con extensión.
    /// - etag: canal y namespace `etag`, versión `latest`; `short_name` es el path completo.
    pub fn attributes(&self) -> Option<StepAttributes> {
        let attrs = |channel: &str, namespace: &str, version: &str, short_name: &str| StepAttributes { channel: channel.into(),
                                                                                                        namespace: namespace.into(),
                                                                                                        version: version.into(),
                                                                                                        short_name: short_name.into() };
        match self.kind {
            StepKind::Etag => Some(attrs("etag", "etag", "latest", self.path.as_str())),
            _ if self.is_reference() => Some(attrs("garden", "owid", "latest", "reference")),
            StepKind::Snapshot => {
                let mut parts = self.path.split('/');
                Some(attrs("snapshot", parts.next()?, parts.next()?, parts.next()?))
            }
            StepKind::Data => {
                let mut parts = self.path.split('/');
                Some(attrs(parts.next()?, parts.next()?, parts.next()?, parts.next()?))
            }
        }
    }
}

impl fmt::Display for StepUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let private = if self.is_private { "-private" } else { "" };
        write!(f, "{}{}://{}", self.kind.scheme(), private, self.path)
    }
}

impl FromStr for StepUri {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
