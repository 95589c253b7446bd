//! Store direccionado por contenido sobre el filesystem.
//!
//! Layout bajo `root`:
//! - `cache/`: objetos registrados con `add`.
//! - `public/`, `private/`: un directorio por canal remoto.
//!
//! Cada objeto vive en `{hash[..2]}/{hash[2..]}`.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::remote::Remote;
use crate::store::ContentStore;
use crate::tracking::{read_outs, sha256_file, tracked_output, write_outs, TrackedOutput};

const CACHE_DIR: &str = "cache";

#[derive(Debug)]
pub struct LocalObjectStore {
    config: StoreConfig,
    closed: Cell<bool>,
    transfers: Cell<usize>,
}

impl LocalObjectStore {
    /// Abre el store creando el layout si no existe.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        for dir in [CACHE_DIR, Remote::Public.name(), Remote::Private.name()] {
            let p = config.root.join(dir);
            fs::create_dir_all(&p).map_err(|e| StoreError::io(&p, e))?;
        }
        info!("content store abierto en {}", config.root.display());
        Ok(Self { config,
                  closed: Cell::new(false),
                  transfers: Cell::new(0) })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Copias hechas desde que se abrió el handle.
    pub fn transfers(&self) -> usize {
        self.transfers.get()
    }

    pub fn cache_path(&self, hash: &str) -> PathBuf {
        object_path(&self.config.root.join(CACHE_DIR), hash)
    }

    pub fn remote_path(&self, hash: &str, remote: Remote) -> PathBuf {
        object_path(&self.config.root.join(remote.name()), hash)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.get() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    /// Copia `from` → `to` con reintentos ante errores transitorios.
    fn transfer(&self, from: &Path, to: &Path) -> Result<(), StoreError> {
        with_retry(self.config.max_attempts, || copy_file(from, to))?;
        self.transfers.set(self.transfers.get() + 1);
        debug!("transferido {} -> {}", from.display(), to.display());
        Ok(())
    }
}

impl ContentStore for LocalObjectStore {
    fn pull(&self, local_path: &Path, tracking_path: &Path, remote: Remote) -> Result<(), StoreError> {
        self.ensure_open()?;
        let out = tracked_output(tracking_path)?;
        if local_path.exists() && sha256_file(local_path)?.0 == out.hash {
            debug!("{} ya está materializado", local_path.display());
            return Ok(());
        }

        let cached = self.cache_path(&out.hash);
        if !cached.exists() {
            let remote_obj = self.remote_path(&out.hash, remote);
            if !remote_obj.exists() {
                return Err(StoreError::ObjectNotFound { hash: out.hash,
                                                        remote: remote.to_string() });
            }
            self.transfer(&remote_obj, &cached)?;
        }
        self.transfer(&cached, local_path)?;

        let (actual, _) = sha256_file(local_path)?;
        if actual != out.hash {
            let _ = fs::remove_file(local_path);
            return Err(StoreError::ChecksumMismatch { path: local_path.to_path_buf(),
                                                      expected: out.hash,
                                                      actual });
        }
        info!("pull {} desde {remote}", local_path.display());
        Ok(())
    }

    fn add(&self, local_path: &Path, tracking_path: &Path) -> Result<TrackedOutput, StoreError> {
        self.ensure_open()?;
        let (hash, size) = sha256_file(local_path)?;
        let cached = self.cache_path(&hash);
        if !cached.exists() {
            self.transfer(local_path, &cached)?;
        }
        let name = local_path.file_name()
                             .map(|n| n.to_string_lossy().into_owned())
                             .unwrap_or_default();
        let out = TrackedOutput { hash, size, path: name };
        write_outs(tracking_path, std::slice::from_ref(&out))?;
        info!("registrado {} ({} bytes)", local_path.display(), out.size);
        Ok(out)
    }

    fn push(&self, local_path: &Path, tracking_path: &Path, remote: Remote) -> Result<(), StoreError> {
        self.ensure_open()?;
        let out = tracked_output(tracking_path)?;
        let target = self.remote_path(&out.hash, remote);
        if target.exists() {
            debug!("objeto {} ya está en {remote}", out.hash);
            return Ok(());
        }
        let cached = self.cache_path(&out.hash);
        let source = if cached.exists() {
            cached
        } else if local_path.exists() {
            let (actual, _) = sha256_file(local_path)?;
            if actual != out.hash {
                return Err(StoreError::ChecksumMismatch { path: local_path.to_path_buf(),
                                                          expected: out.hash,
                                                          actual });
            }
            local_path.to_path_buf()
        } else {
            return Err(StoreError::ObjectNotFound { hash: out.hash,
                                                    remote: CACHE_DIR.into() });
        };
        self.transfer(&source, &target)?;
        info!("push {} a {remote}", local_path.display());
        Ok(())
    }

    fn checksum(&self, tracking_path: &Path) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        Ok(read_outs(tracking_path)?.into_iter().next().map(|o| o.hash))
    }

    fn has_remote_object(&self, tracking_path: &Path, remote: Remote) -> Result<bool, StoreError> {
        self.ensure_open()?;
        match read_outs(tracking_path)?.first() {
            Some(out) => Ok(self.remote_path(&out.hash, remote).exists()),
            None => Ok(false),
        }
    }

    fn close(&self) -> Result<(), StoreError> {
        if !self.closed.replace(true) {
            info!("content store cerrado ({} transferencias)", self.transfers.get());
        }
        Ok(())
    }
}

fn object_path(base: &Path, hash: &str) -> PathBuf {
    let split = hash.len().min(2);
    base.join(&hash[..split]).join(&hash[split..])
}

fn copy_file(from: &Path, to: &Path) -> Result<(), StoreError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    fs::copy(from, to).map_err(|e| StoreError::io(from, e))?;
    Ok(())
}

/// Reintenta `f` ante errores transitorios, con backoff lineal corto.
fn with_retry<F, T>(max_attempts: u32, mut f: F) -> Result<T, StoreError>
    where F: FnMut() -> Result<T, StoreError>
{
    let mut attempts = 1;
    loop {
        match f() {
            Err(e) if e.is_transient() && attempts < max_attempts => {
                let delay_ms = 15 * u64::from(attempts);
                warn!("error transitorio (intento {attempts}): {e} -> esperando {delay_ms}ms");
                thread::sleep(Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}
