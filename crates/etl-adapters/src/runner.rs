//! Ejecución de las transformaciones de los steps de datos.
//!
//! El engine trata el programa de transformación como una llamada
//! bloqueante: sin timeout ni cancelación.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use etl_core::{EtlError, StepUri};
use log::{debug, error};

use crate::implementation::Implementation;

/// Invoca la implementación de un step para que escriba su dataset en `dest_dir`.
pub trait TransformRunner: Debug {
    fn run(&self, step: &StepUri, implementation: &Implementation, dest_dir: &Path) -> Result<(), EtlError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Intérprete para scripts y paquetes.
    pub python: String,
    /// Ejecutor de notebooks parametrizados.
    pub notebook_runner: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { python: "python".into(),
               notebook_runner: "papermill".into() }
    }
}

/// Lanza la implementación como proceso hijo con `base_dir` como directorio de trabajo.
///
/// Scripts y paquetes se importan como módulo (`etl.steps.data.…`) y se
/// llama a su `run(dest_dir)`; los notebooks pasan por papermill.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    config: RunnerConfig,
    base_dir: PathBuf,
}

const STDERR_TAIL_LINES: usize = 20;

/// Código de salida del importador cuando el módulo no define `run` (EX_CONFIG).
const MISSING_RUN_EXIT: i32 = 78;

/// Importa `argv[1]` y llama a su `run(argv[2])`.
const IMPORT_AND_RUN: &str = "\
import importlib, os, sys
sys.path.insert(0, os.getcwd())
module = importlib.import_module(sys.argv[1])
run = getattr(module, 'run', None)
if not callable(run):
    sys.stderr.write('module %s has no run(dest_dir)\\n' % sys.argv[1])
    sys.exit(78)
run(sys.argv[2])
";

impl CommandRunner {
    pub fn new(config: RunnerConfig, base_dir: impl Into<PathBuf>) -> Self {
        Self { config,
               base_dir: base_dir.into() }
    }

    /// Nombre de módulo importable: path relativo a `base_dir`, sin `.py`, con puntos.
    fn module_name(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.base_dir).unwrap_or(path);
        let rel = if rel.extension().is_some_and(|e| e == "py") { rel.with_extension("") } else { rel.to_path_buf() };
        rel.components()
           .map(|c| c.as_os_str().to_string_lossy().into_owned())
           .collect::<Vec<_>>()
           .join(".")
    }

    /// Módulo que se importará para un script o paquete.
    fn entry_module(&self, implementation: &Implementation) -> Option<String> {
        match implementation {
            Implementation::Script(script) => Some(self.module_name(script)),
            Implementation::Package { dir, .. } => Some(self.module_name(dir)),
            Implementation::Notebook(_) => None,
        }
    }

    fn command(&self, implementation: &Implementation, dest_dir: &Path, scratch: &Path) -> Command {
        match self.entry_module(implementation) {
            Some(module) => {
                let mut cmd = Command::new(&self.config.python);
                cmd.arg("-c").arg(IMPORT_AND_RUN).arg(module).arg(dest_dir);
                cmd
            }
            None => {
                let mut cmd = Command::new(&self.config.notebook_runner);
                cmd.arg(implementation.path())
                   .arg(scratch.join("notebook.ipynb"))
                   .arg("-p")
                   .arg("dest_dir")
                   .arg(dest_dir);
                cmd
            }
        }
    }
}

impl TransformRunner for CommandRunner {
    fn run(&self, step: &StepUri, implementation: &Implementation, dest_dir: &Path) -> Result<(), EtlError> {
        // el notebook ejecutado se descarta junto con el temporal
        let scratch = tempfile::tempdir().map_err(|e| EtlError::io(std::env::temp_dir(), e))?;
        let mut cmd = self.command(implementation, dest_dir, scratch.path());
        cmd.current_dir(&self.base_dir);
        debug!("{step}: {:?} {:?}", cmd.get_program(), self.entry_module(implementation));

        let output = cmd.output().map_err(|e| EtlError::Transform { step: step.to_string(),
                                                                    reason: format!("failed to spawn {:?}: {e}", cmd.get_program()) })?;
        if output.status.code() == Some(MISSING_RUN_EXIT) {
            if let Some(module) = self.entry_module(implementation) {
                return Err(EtlError::MissingEntryPoint { step: step.to_string(),
                                                         module });
            }
        }
        check_status(step, &output)
    }
}

fn check_status(step: &StepUri, output: &Output) -> Result<(), EtlError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
    error!("{step}: {}\n{}", output.status, String::from_utf8_lossy(&output.stdout));
    Err(EtlError::Transform { step: step.to_string(),
                              reason: format!("{}: {tail}", output.status) })
}
