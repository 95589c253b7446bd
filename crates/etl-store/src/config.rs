//! Configuración del store desde variables de entorno.
//! `ETL_STORE_DIR` (raíz del store) y `ETL_STORE_MAX_ATTEMPTS` (reintentos).

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const DEFAULT_STORE_DIR: &str = ".etl-store";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Raíz con `cache/`, `public/` y `private/`.
    pub root: PathBuf,
    /// Intentos por transferencia ante errores transitorios (mínimo 1).
    pub max_attempts: u32,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(),
               max_attempts: DEFAULT_MAX_ATTEMPTS }
    }

    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let root = env::var("ETL_STORE_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_DIR));
        let max_attempts = env::var("ETL_STORE_MAX_ATTEMPTS").ok()
                                                             .and_then(|v| v.parse().ok())
                                                             .filter(|n| *n > 0)
                                                             .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        Self { root, max_attempts }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
