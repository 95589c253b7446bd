//! Steps en memoria para probar el engine sin filesystem.
//!
//! `World` hace de disco: el "código" de cada step y los outputs producidos.
//! `FakeStep` sigue el mismo contrato que un step de datos real: estampa el
//! fingerprint de sus inputs al correr y se declara sucio cuando cambia.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use etl_core::hashing::{fingerprint, hash_str};
use etl_core::{Dag, EtlError, SharedStep, Step, StepFactory, StepUri};

#[derive(Debug, Default)]
pub struct World {
    pub code: RefCell<BTreeMap<String, String>>,
    /// uri → (checksum_output, source_checksum estampado)
    pub outputs: RefCell<BTreeMap<String, (String, String)>>,
    pub runs: RefCell<Vec<String>>,
    pub failing: RefCell<BTreeSet<String>>,
    pub not_executable: RefCell<BTreeSet<String>>,
    pub dirty_checks: RefCell<Vec<String>>,
}

impl World {
    pub fn set_code(&self, uri: &str, code: &str) {
        self.code.borrow_mut().insert(uri.to_string(), code.to_string());
    }

    pub fn take_runs(&self) -> Vec<String> {
        std::mem::take(&mut *self.runs.borrow_mut())
    }
}

#[derive(Debug)]
pub struct FakeStep {
    uri: StepUri,
    deps: Vec<SharedStep>,
    world: Rc<World>,
}

impl FakeStep {
    fn checksum_input(&self) -> Result<String, EtlError> {
        let mut checksums = BTreeMap::new();
        for d in &self.deps {
            checksums.insert(d.uri().to_string(), d.checksum_output()?);
        }
        let code = self.world.code.borrow().get(&self.uri.to_string()).cloned().unwrap_or_default();
        checksums.insert(format!("{}.py", self.uri.path()), hash_str(&code));
        Ok(fingerprint(&checksums))
    }
}

impl Step for FakeStep {
    fn uri(&self) -> &StepUri {
        &self.uri
    }

    fn dependencies(&self) -> &[SharedStep] {
        &self.deps
    }

    fn run(&self) -> Result<(), EtlError> {
        let uri = self.uri.to_string();
        self.world.runs.borrow_mut().push(uri.clone());
        if self.world.failing.borrow().contains(&uri) {
            return Err(EtlError::Transform { step: uri,
                                             reason: "exit status 1".into() });
        }
        let input = self.checksum_input()?;
        let code = self.world.code.borrow().get(&uri).cloned().unwrap_or_default();
        let output = hash_str(&format!("{code}|{input}"));
        self.world.outputs.borrow_mut().insert(uri, (output, input));
        Ok(())
    }

    fn is_dirty(&self) -> Result<bool, EtlError> {
        let uri = self.uri.to_string();
        self.world.dirty_checks.borrow_mut().push(uri.clone());
        if self.uri.is_reference() {
            return Ok(false);
        }
        let stamped = match self.world.outputs.borrow().get(&uri) {
            Some((_, stamped)) => stamped.clone(),
            None => return Ok(true),
        };
        if self.deps.iter().any(|d| !d.has_existing_data()) {
            return Ok(true);
        }
        Ok(stamped != self.checksum_input()?)
    }

    fn checksum_output(&self) -> Result<String, EtlError> {
        self.world
            .outputs
            .borrow()
            .get(&self.uri.to_string())
            .map(|(out, _)| out.clone())
            .ok_or_else(|| EtlError::DatasetNotFound(self.uri.path().into()))
    }

    fn has_existing_data(&self) -> bool {
        self.world.outputs.borrow().contains_key(&self.uri.to_string())
    }

    fn can_execute(&self) -> bool {
        !self.world.not_executable.borrow().contains(&self.uri.to_string())
    }
}

#[derive(Debug, Default)]
pub struct FakeFactory {
    pub world: Rc<World>,
    pub built: RefCell<Vec<String>>,
}

impl StepFactory for FakeFactory {
    fn build(&self, uri: &StepUri, dependencies: Vec<SharedStep>) -> Result<SharedStep, EtlError> {
        self.built.borrow_mut().push(uri.to_string());
        Ok(Rc::new(FakeStep { uri: uri.clone(),
                              deps: dependencies,
                              world: self.world.clone() }))
    }
}

pub fn dag(edges: &[(&str, &[&str])]) -> Dag {
    edges.iter()
         .map(|(step, deps)| (step.to_string(), deps.iter().map(|d| d.to_string()).collect()))
         .collect()
}

pub fn targets(uris: &[&str]) -> Vec<String> {
    uris.iter().map(|s| s.to_string()).collect()
}
