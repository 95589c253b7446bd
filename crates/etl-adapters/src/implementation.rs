//! Descubrimiento de la implementación de un step de datos.
//!
//! Para la base `steps_dir/data/{path}` se prueban tres formas, mutuamente
//! excluyentes: script `{base}.py`, paquete `{base}/__init__.py` y notebook
//! `{base}.ipynb`.

use std::fs;
use std::path::{Path, PathBuf};

use etl_core::EtlError;
use walkdir::WalkDir;

/// Directorios generados por los intérpretes; no forman parte del step.
const IGNORED_DIRS: [&str; 2] = ["__pycache__", ".ipynb_checkpoints"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Implementation {
    Script(PathBuf),
    Package { dir: PathBuf, entry: PathBuf },
    Notebook(PathBuf),
}

impl Implementation {
    pub fn path(&self) -> &Path {
        match self {
            Implementation::Script(p) | Implementation::Notebook(p) => p,
            Implementation::Package { entry, .. } => entry,
        }
    }
}

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut p = base.as_os_str().to_os_string();
    p.push(ext);
    PathBuf::from(p)
}

/// Devuelve la única implementación presente, `None` si no hay ninguna.
/// Más de una es ambigua.
pub fn discover(step: &str, search_path: &Path) -> Result<Option<Implementation>, EtlError> {
    let script = with_suffix(search_path, ".py");
    let entry = search_path.join("__init__.py");
    let notebook = with_suffix(search_path, ".ipynb");

    let mut found = Vec::new();
    if script.is_file() {
        found.push(Implementation::Script(script));
    }
    if entry.is_file() {
        found.push(Implementation::Package { dir: search_path.to_path_buf(),
                                             entry });
    }
    if notebook.is_file() {
        found.push(Implementation::Notebook(notebook));
    }

    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        _ => Err(EtlError::AmbiguousImplementation { step: step.to_string(),
                                                     candidates: found.iter().map(|i| i.path().to_path_buf()).collect() }),
    }
}

/// Archivos que definen el step, ordenados.
///
/// Paquete: todo archivo bajo el directorio. Si no: los hermanos
/// `{base}.*` (script, notebook, `.meta.yml`, ...).
pub fn step_files(search_path: &Path) -> Result<Vec<PathBuf>, EtlError> {
    let mut files = Vec::new();
    if search_path.is_dir() {
        let walker = WalkDir::new(search_path).into_iter()
                                              .filter_entry(|e| !IGNORED_DIRS.iter().any(|d| e.file_name() == *d));
        for entry in walker {
            let entry = entry.map_err(|e| {
                                 let path = e.path().unwrap_or(search_path).to_path_buf();
                                 EtlError::io(path, e.into())
                             })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    } else if let (Some(parent), Some(stem)) = (search_path.parent(), search_path.file_name()) {
        let prefix = format!("{}.", stem.to_string_lossy());
        if parent.is_dir() {
            for entry in fs::read_dir(parent).map_err(|e| EtlError::io(parent, e))? {
                let path = entry.map_err(|e| EtlError::io(parent, e))?.path();
                let matches = path.file_name().is_some_and(|n| n.to_string_lossy().starts_with(&prefix));
                if matches && path.is_file() {
                    files.push(path);
                }
            }
        }
    }
    files.sort();
    Ok(files)
}
