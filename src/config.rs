//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
use std::env;
use std::path::PathBuf;

use etl_adapters::{EtlPaths, RunnerConfig};
use etl_store::StoreConfig;
use once_cell::sync::Lazy;

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Raíz del proyecto (`ETL_BASE_DIR`, por defecto el directorio actual).
    pub base_dir: PathBuf,
    pub store: StoreConfig,
    pub runner: RunnerConfig,
    /// Filtro de logs (`ETL_LOG`, sintaxis de `EnvFilter`).
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        etl_store::config::init_dotenv();
        let base_dir = env::var("ETL_BASE_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."));
        let defaults = RunnerConfig::default();
        let runner = RunnerConfig { python: env::var("ETL_PYTHON").unwrap_or(defaults.python),
                                    notebook_runner: env::var("ETL_NOTEBOOK_RUNNER").unwrap_or(defaults.notebook_runner) };
        Self { base_dir,
               store: StoreConfig::from_env(),
               runner,
               log_filter: env::var("ETL_LOG").unwrap_or_else(|_| "info".into()) }
    }

    /// Igual que `self` pero con otra raíz de proyecto.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn paths(&self) -> EtlPaths {
        EtlPaths::new(&self.base_dir)
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    // única lectura del entorno en este binario de tests: sin carreras con otros tests
    #[test]
    fn from_env_is_the_single_entry_point() {
        env::set_var("ETL_BASE_DIR", "/srv/etl");
        env::set_var("ETL_PYTHON", "python3.11");
        env::set_var("ETL_STORE_MAX_ATTEMPTS", "5");
        let config = AppConfig::from_env();
        assert_eq!(config.base_dir, PathBuf::from("/srv/etl"));
        assert_eq!(config.runner.python, "python3.11");
        assert_eq!(config.runner.notebook_runner, "papermill");
        assert_eq!(config.store.max_attempts, 5);
        assert_eq!(config.paths().dag_file, PathBuf::from("/srv/etl/etl/steps/dag.yml"));
    }
}
