//! Cableado del pipeline: DAG + factory + scheduler sobre un proyecto.
//!
//! Cada invocación construye steps nuevos a partir del DAG; nada de los
//! steps persiste entre pasadas, sólo los datasets y snapshots en disco.

use std::rc::Rc;

use etl_adapters::{DefaultStepFactory, EtlPaths, Snapshot, TransformRunner};
use etl_core::dag::{filter_to_subgraph, load_dag};
use etl_core::{build_plan, Dag, EtlError, ExecutionPlan, RunOptions, RunReport, Scheduler};
use etl_store::ContentStore;
use log::info;

/// Qué steps correr: regex de inclusión/exclusión y si sumar dependientes.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub downstream: bool,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(patterns: &[&str]) -> Self {
        Self { includes: patterns.iter().map(|p| p.to_string()).collect(),
               ..Self::default() }
    }
}

#[derive(Debug)]
pub struct Pipeline {
    paths: Rc<EtlPaths>,
    store: Rc<dyn ContentStore>,
    runner: Rc<dyn TransformRunner>,
    dag: Dag,
}

impl Pipeline {
    pub fn new(paths: Rc<EtlPaths>, store: Rc<dyn ContentStore>, runner: Rc<dyn TransformRunner>, dag: Dag) -> Self {
        Self { paths, store, runner, dag }
    }

    /// Lee el DAG desde `paths.dag_file`.
    pub fn load(paths: Rc<EtlPaths>, store: Rc<dyn ContentStore>, runner: Rc<dyn TransformRunner>) -> Result<Self, EtlError> {
        let dag = load_dag(&paths.dag_file)?;
        info!("dag cargado: {} steps declarados", dag.len());
        Ok(Self::new(paths, store, runner, dag))
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    pub fn paths(&self) -> &EtlPaths {
        &self.paths
    }

    fn factory(&self) -> DefaultStepFactory {
        DefaultStepFactory::new(self.paths.clone(), self.store.clone(), self.runner.clone())
    }

    /// Steps declarados que entran en la selección (cerrada sobre dependencias).
    pub fn targets(&self, selection: &Selection) -> Result<Vec<String>, EtlError> {
        let sub = filter_to_subgraph(&self.dag, &selection.includes, &selection.excludes, selection.downstream)?;
        Ok(sub.into_keys().collect())
    }

    pub fn plan(&self, selection: &Selection) -> Result<ExecutionPlan, EtlError> {
        build_plan(&self.dag, &self.targets(selection)?, &self.factory())
    }

    pub fn run(&self, selection: &Selection, options: RunOptions) -> Result<RunReport, EtlError> {
        let plan = self.plan(selection)?;
        Scheduler::new(options).run(&plan)
    }

    /// Snapshot por URI `namespace/version/short_name.ext`.
    pub fn snapshot(&self, uri: &str) -> Result<Snapshot, EtlError> {
        Snapshot::new(uri, self.paths.clone(), self.store.clone())
    }

    /// Cierra el handle del store.
    pub fn close(&self) -> Result<(), EtlError> {
        self.store.close()?;
        Ok(())
    }
}
