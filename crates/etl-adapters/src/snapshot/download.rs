use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use etl_core::EtlError;
use log::info;
use tempfile::NamedTempFile;

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new().timeout_connect(Duration::from_secs(10))
                             .timeout_read(Duration::from_secs(300))
                             .build()
}

/// Descarga `url` a `dest`. El cuerpo se escribe en un temporal junto al
/// destino y se renombra al terminar, así un corte nunca deja un archivo a medias.
pub fn download(url: &str, dest: &Path) -> Result<u64, EtlError> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| EtlError::io(parent, e))?;

    let response = agent().get(url)
                          .call()
                          .map_err(|e| EtlError::Http { url: url.to_string(),
                                                        reason: e.to_string() })?;
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| EtlError::io(parent, e))?;
    let bytes = io::copy(&mut response.into_reader(), &mut tmp).map_err(|e| EtlError::Http { url: url.to_string(),
                                                                                             reason: e.to_string() })?;
    tmp.persist(dest).map_err(|e| EtlError::io(dest, e.error))?;
    info!("descargados {bytes} bytes de {url}");
    Ok(bytes)
}

/// Header `ETag` de un `HEAD` a `url`.
pub fn fetch_etag(url: &str) -> Result<Option<String>, EtlError> {
    let response = agent().head(url)
                          .call()
                          .map_err(|e| EtlError::Http { url: url.to_string(),
                                                        reason: e.to_string() })?;
    Ok(response.header("ETag").map(|s| s.trim_matches('"').to_string()))
}
