use std::path::{Path, PathBuf};

/// Convenciones de directorios del proyecto, derivadas de `base_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlPaths {
    pub base_dir: PathBuf,
    /// Outputs: datasets y snapshots materializados.
    pub data_dir: PathBuf,
    /// Implementaciones de steps (`steps_dir/data/{path}`).
    pub steps_dir: PathBuf,
    /// Sidecars `.dvc` de los snapshots.
    pub snapshots_dir: PathBuf,
    pub dag_file: PathBuf,
}

impl EtlPaths {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let steps_dir = base_dir.join("etl").join("steps");
        Self { data_dir: base_dir.join("data"),
               snapshots_dir: base_dir.join("snapshots"),
               dag_file: steps_dir.join("dag.yml"),
               steps_dir,
               base_dir }
    }

    /// Directorio de output de un step de datos.
    pub fn dataset_dir(&self, step_path: &str) -> PathBuf {
        self.data_dir.join(step_path.trim_start_matches('/'))
    }

    /// Base de búsqueda de la implementación de un step de datos.
    pub fn step_search_path(&self, step_path: &str) -> PathBuf {
        self.steps_dir.join("data").join(step_path)
    }

    pub fn snapshot_file(&self, uri: &str) -> PathBuf {
        self.data_dir.join("snapshots").join(uri)
    }

    pub fn snapshot_metadata(&self, uri: &str) -> PathBuf {
        let mut p = self.snapshots_dir.join(uri).into_os_string();
        p.push(".dvc");
        PathBuf::from(p)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_base_dir() {
        let p = EtlPaths::new("/etl");
        assert_eq!(p.dag_file, PathBuf::from("/etl/etl/steps/dag.yml"));
        assert_eq!(p.dataset_dir("garden/x/2020/c"), PathBuf::from("/etl/data/garden/x/2020/c"));
        assert_eq!(p.step_search_path("garden/x/2020/c"), PathBuf::from("/etl/etl/steps/data/garden/x/2020/c"));
        assert_eq!(p.snapshot_file("x/2020/a.csv"), PathBuf::from("/etl/data/snapshots/x/2020/a.csv"));
        assert_eq!(p.snapshot_metadata("x/2020/a.csv"), PathBuf::from("/etl/snapshots/x/2020/a.csv.dvc"));
    }
}
