#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::thread;

use etl_adapters::{EtlPaths, Implementation, TransformRunner};
use etl_core::{Dataset, DatasetMeta, EtlError, StepUri, Table};
use etl_store::{LocalObjectStore, StoreConfig};
use serde_json::json;
use tempfile::TempDir;

/// Runner en proceso: escribe un dataset de una tabla en `dest_dir`.
#[derive(Debug, Default)]
pub struct WriteDataset {
    pub calls: RefCell<Vec<String>>,
}

impl TransformRunner for WriteDataset {
    fn run(&self, step: &StepUri, _implementation: &Implementation, dest_dir: &Path) -> Result<(), EtlError> {
        self.calls.borrow_mut().push(step.to_string());
        let short_name = step.attributes().map(|a| a.short_name);
        let mut ds = Dataset::create_empty(dest_dir, DatasetMeta { short_name: short_name.clone(),
                                                                   ..DatasetMeta::default() })?;
        ds.add_table(&Table::new(short_name.unwrap_or_default(), vec![json!({"step": step.to_string()})]))?;
        Ok(())
    }
}

pub struct Project {
    pub dir: TempDir,
    pub paths: Rc<EtlPaths>,
    pub store: Rc<LocalObjectStore>,
    pub runner: Rc<WriteDataset>,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let paths = Rc::new(EtlPaths::new(dir.path()));
        let store = Rc::new(LocalObjectStore::open(StoreConfig::new(dir.path().join(".store"))).unwrap());
        Self { dir,
               paths,
               store,
               runner: Rc::new(WriteDataset::default()) }
    }

    /// Crea `{step_path}.py` con el contenido dado.
    pub fn write_script(&self, step_path: &str, body: &str) -> PathBuf {
        let mut p = self.paths.step_search_path(step_path).into_os_string();
        p.push(".py");
        let p = PathBuf::from(p);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(&p, body).unwrap();
        p
    }

    /// Sidecar de un snapshot con la metadata mínima.
    pub fn write_snapshot_meta(&self, uri: &str, is_public: bool) -> PathBuf {
        let p = self.paths.snapshot_metadata(uri);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(&p,
                  format!("meta:\n  namespace: x\n  short_name: a\n  name: A\n  source_name: S\n  url: https://example.org\n  \
                           file_extension: csv\n  publication_year: 2020\n  is_public: {is_public}\n"))
            .unwrap();
        p
    }

    pub fn write_snapshot_file(&self, uri: &str, content: &str) -> PathBuf {
        let p = self.paths.snapshot_file(uri);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(&p, content).unwrap();
        p
    }
}

/// Servidor HTTP de una sola respuesta; devuelve `http://host:port`.
pub fn serve_once(response: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}
