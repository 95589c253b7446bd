use etl_core::{EtlError, Step, StepUri};

use crate::snapshot::fetch_etag;

/// Step de servicio externo: su output es el `ETag` de una URL HTTPS.
/// Nunca está sucio y `run` no hace nada.
#[derive(Debug)]
pub struct EtagStep {
    uri: StepUri,
}

impl EtagStep {
    pub fn new(uri: StepUri) -> Self {
        Self { uri }
    }

    pub fn url(&self) -> String {
        format!("https://{}", self.uri.path())
    }
}

impl Step for EtagStep {
    fn uri(&self) -> &StepUri {
        &self.uri
    }

    fn run(&self) -> Result<(), EtlError> {
        Ok(())
    }

    fn is_dirty(&self) -> Result<bool, EtlError> {
        Ok(false)
    }

    fn checksum_output(&self) -> Result<String, EtlError> {
        fetch_etag(&self.url())?.ok_or_else(|| EtlError::NoChecksum(self.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_dirty_and_url_is_https() {
        let step = EtagStep::new(StepUri::parse("etag://example.org/data/file.csv").unwrap());
        assert!(!step.is_dirty().unwrap());
        step.run().unwrap();
        assert_eq!(step.url(), "https://example.org/data/file.csv");
    }
}
