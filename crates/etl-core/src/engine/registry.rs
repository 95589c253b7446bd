//! Registry de steps y construcción del plan de ejecución.
//!
//! El plan se arma con un recorrido DFS post-orden desde los targets: cada
//! dependencia queda antes que sus dependientes y cada URI se construye una
//! única vez (el registry memoiza URI → step). Un back-edge durante el
//! recorrido es un ciclo y aborta la construcción antes de ejecutar nada.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::dag::{graph_nodes, Dag};
use crate::errors::EtlError;
use crate::step::{SharedStep, StepKind, StepUri};

/// Construye la variante concreta de step para un URI, con sus
/// dependencias ya resueltas.
pub trait StepFactory {
    fn build(&self, uri: &StepUri, dependencies: Vec<SharedStep>) -> Result<SharedStep, EtlError>;
}

/// URI → instancia única de step.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: HashMap<String, SharedStep>,
}

impl StepRegistry {
    pub fn get(&self, uri: &str) -> Option<&SharedStep> {
        self.steps.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.steps.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Steps en orden topológico (dependencias primero).
#[derive(Debug)]
pub struct ExecutionPlan {
    steps: Vec<SharedStep>,
    registry: StepRegistry,
}

impl ExecutionPlan {
    pub fn steps(&self) -> &[SharedStep] {
        &self.steps
    }

    pub fn uris(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.uri().to_string()).collect()
    }

    pub fn get(&self, uri: &str) -> Option<&SharedStep> {
        self.registry.get(uri)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

struct PlanBuilder<'a> {
    dag: &'a Dag,
    factory: &'a dyn StepFactory,
    registry: StepRegistry,
    marks: HashMap<String, Mark>,
    stack: Vec<String>,
    order: Vec<SharedStep>,
}

/// Resuelve el cierre transitivo de `targets` y devuelve el plan.
///
/// Errores de grafo: target o dependencia `data://` no declarada en el DAG
/// (excepto el dataset de referencia), URI malformado, ciclo.
pub fn build_plan(dag: &Dag, targets: &[String], factory: &dyn StepFactory) -> Result<ExecutionPlan, EtlError> {
    let nodes = graph_nodes(dag);
    let mut builder = PlanBuilder { dag,
                                    factory,
                                    registry: StepRegistry::default(),
                                    marks: HashMap::new(),
                                    stack: Vec::new(),
                                    order: Vec::new() };
    for target in targets {
        if !nodes.contains(target) && !StepUri::parse(target)?.is_reference() {
            return Err(EtlError::UnknownStep(target.clone()));
        }
        builder.visit(target, None)?;
    }
    debug!("plan: {} steps para {} targets", builder.order.len(), targets.len());
    Ok(ExecutionPlan { steps: builder.order,
                       registry: builder.registry })
}

impl PlanBuilder<'_> {
    fn visit(&mut self, uri: &str, parent: Option<&str>) -> Result<SharedStep, EtlError> {
        match self.marks.get(uri) {
            Some(Mark::Done) => {
                return self.registry
                           .get(uri)
                           .cloned()
                           .ok_or_else(|| EtlError::UnknownStep(uri.to_string()));
            }
            Some(Mark::Visiting) => {
                let start = self.stack.iter().position(|s| s == uri).unwrap_or(0);
                let mut cycle = self.stack[start..].to_vec();
                cycle.push(uri.to_string());
                return Err(EtlError::Cycle(cycle));
            }
            None => {}
        }

        let parsed = StepUri::parse(uri)?;
        let deps: BTreeSet<String> = match self.dag.get(uri) {
            Some(deps) => deps.clone(),
            None if parsed.kind() == StepKind::Data && !parsed.is_reference() => {
                return Err(match parent {
                               Some(p) => EtlError::UnknownDependency { step: p.to_string(),
                                                                        dependency: uri.to_string() },
                               None => EtlError::UnknownStep(uri.to_string()),
                           });
            }
            None => BTreeSet::new(),
        };

        self.marks.insert(uri.to_string(), Mark::Visiting);
        self.stack.push(uri.to_string());

        let mut dependencies = Vec::with_capacity(deps.len());
        for dep in &deps {
            dependencies.push(self.visit(dep, Some(uri))?);
        }
        let step = self.factory.build(&parsed, dependencies)?;

        self.stack.pop();
        self.marks.insert(uri.to_string(), Mark::Done);
        self.registry.steps.insert(uri.to_string(), step.clone());
        self.order.push(step.clone());
        Ok(step)
    }
}
