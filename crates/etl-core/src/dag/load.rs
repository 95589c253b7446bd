use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use super::Dag;
use crate::errors::EtlError;

#[derive(Debug, Default, Deserialize)]
struct DagFile {
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    steps: BTreeMap<String, Option<Vec<String>>>,
}

/// Carga un DAG desde disco resolviendo `include:` de forma recursiva
/// (paths relativos al archivo que los incluye). Un mismo step declarado en
/// dos archivos es un error de grafo.
pub fn load_dag(path: &Path) -> Result<Dag, EtlError> {
    let mut dag = Dag::new();
    let mut origins: HashMap<String, PathBuf> = HashMap::new();
    let mut visited = BTreeSet::new();
    load_into(path, &mut dag, &mut origins, &mut visited)?;
    debug!("dag cargado desde {}: {} steps", path.display(), dag.len());
    Ok(dag)
}

fn load_into(path: &Path,
             dag: &mut Dag,
             origins: &mut HashMap<String, PathBuf>,
             visited: &mut BTreeSet<PathBuf>)
             -> Result<(), EtlError> {
    // un include repetido (o circular) se carga una sola vez
    if !visited.insert(path.to_path_buf()) {
        return Ok(());
    }
    let raw = fs::read_to_string(path).map_err(|e| EtlError::io(path, e))?;
    let file = parse_file(&raw, path)?;

    for (step, deps) in file.steps {
        if let Some(first) = origins.get(&step) {
            return Err(EtlError::DuplicateStep { step,
                                                 first: first.clone(),
                                                 second: path.to_path_buf() });
        }
        origins.insert(step.clone(), path.to_path_buf());
        dag.insert(step, deps.unwrap_or_default().into_iter().collect());
    }

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for inc in file.include {
        load_into(&base.join(inc), dag, origins, visited)?;
    }
    Ok(())
}

/// Parsea un DAG desde texto YAML sin seguir `include:`.
pub fn parse_dag(yaml: &str, origin: &Path) -> Result<Dag, EtlError> {
    let file = parse_file(yaml, origin)?;
    Ok(file.steps
           .into_iter()
           .map(|(step, deps)| (step, deps.unwrap_or_default().into_iter().collect()))
           .collect())
}

fn parse_file(yaml: &str, origin: &Path) -> Result<DagFile, EtlError> {
    if yaml.trim().is_empty() {
        return Ok(DagFile::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| EtlError::Yaml { path: origin.to_path_buf(),
                                                            reason: e.to_string() })
}
