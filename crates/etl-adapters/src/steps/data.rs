//! Step de cómputo: ejecuta una transformación y produce un dataset en
//! `data_dir/{path}`.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use etl_core::step::checksum_input;
use etl_core::{Dataset, ErrorCategory, EtlError, SharedStep, Step, StepUri};
use log::{debug, info};

use crate::implementation::{discover, step_files, Implementation};
use crate::paths::EtlPaths;
use crate::runner::TransformRunner;

#[derive(Debug)]
pub struct DataStep {
    uri: StepUri,
    dependencies: Vec<SharedStep>,
    paths: Rc<EtlPaths>,
    runner: Rc<dyn TransformRunner>,
}

impl DataStep {
    pub fn new(uri: StepUri, dependencies: Vec<SharedStep>, paths: Rc<EtlPaths>, runner: Rc<dyn TransformRunner>) -> Self {
        Self { uri,
               dependencies,
               paths,
               runner }
    }

    pub fn dest_dir(&self) -> PathBuf {
        self.paths.dataset_dir(self.uri.path())
    }

    pub fn search_path(&self) -> PathBuf {
        self.paths.step_search_path(self.uri.path())
    }

    pub fn implementation(&self) -> Result<Implementation, EtlError> {
        discover(self.uri.path(), &self.search_path())?.ok_or_else(|| EtlError::NoImplementation(self.uri.path().to_string()))
    }

    pub fn step_files(&self) -> Result<Vec<PathBuf>, EtlError> {
        step_files(&self.search_path())
    }

    /// Fingerprint de dependencias + archivos del step.
    pub fn checksum_input(&self) -> Result<String, EtlError> {
        checksum_input(&self.uri.to_string(), &self.dependencies, &self.step_files()?)
    }

    fn output_dataset(&self) -> Result<Dataset, EtlError> {
        Dataset::load(self.dest_dir())
    }
}

impl Step for DataStep {
    fn uri(&self) -> &StepUri {
        &self.uri
    }

    fn dependencies(&self) -> &[SharedStep] {
        &self.dependencies
    }

    fn run(&self) -> Result<(), EtlError> {
        let dest = self.dest_dir();
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| EtlError::io(parent, e))?;
        }
        let implementation = self.implementation()?;
        self.runner.run(&self.uri, &implementation, &dest)?;

        // recordar con qué inputs se construyó el dataset
        let mut dataset = self.output_dataset()?;
        dataset.metadata.source_checksum = Some(self.checksum_input()?);
        if self.uri.is_private() {
            dataset.metadata.is_public = false;
        }
        dataset.save()?;
        info!("{}: dataset guardado en {}", self.uri, dest.display());
        Ok(())
    }

    fn is_dirty(&self) -> Result<bool, EtlError> {
        if self.uri.is_reference() {
            return Ok(false);
        }
        if !self.dest_dir().is_dir() || self.dependencies.iter().any(|d| !d.has_existing_data()) {
            return Ok(true);
        }
        let found = match self.output_dataset() {
            Ok(ds) => ds.metadata.source_checksum,
            Err(e) if e.category() == ErrorCategory::Staleness => return Ok(true),
            Err(e) => return Err(e),
        };
        let expected = match self.checksum_input() {
            Ok(c) => c,
            Err(e) if e.category() == ErrorCategory::Staleness => {
                debug!("{}: upstream sin output ({e}), se asume sucio", self.uri);
                return Ok(true);
            }
            Err(e) => return Err(e),
        };
        Ok(found.as_deref() != Some(expected.as_str()))
    }

    fn checksum_output(&self) -> Result<String, EtlError> {
        self.output_dataset()?.checksum()
    }

    fn has_existing_data(&self) -> bool {
        self.dest_dir().is_dir()
    }

    fn can_execute(&self) -> bool {
        !matches!(discover(self.uri.path(), &self.search_path()), Ok(None))
    }
}
