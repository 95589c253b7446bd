//! Consultas sobre el DAG y selección de subgrafos.
//!
//! Los recorridos usan un set de visitados, así que terminan aunque el DAG
//! contenga un ciclo; los ciclos se rechazan recién al planificar.

use std::collections::BTreeSet;

use regex::Regex;

use super::Dag;
use crate::errors::EtlError;

/// Invierte las aristas: step → steps que dependen de él.
pub fn reverse_graph(dag: &Dag) -> Dag {
    let mut reverse = Dag::new();
    for (step, deps) in dag {
        reverse.entry(step.clone()).or_default();
        for dep in deps {
            reverse.entry(dep.clone()).or_default().insert(step.clone());
        }
    }
    reverse
}

/// Todos los steps del DAG, incluidas las hojas implícitas.
pub fn graph_nodes(dag: &Dag) -> BTreeSet<String> {
    dag.iter()
       .flat_map(|(step, deps)| std::iter::once(step).chain(deps.iter()))
       .cloned()
       .collect()
}

/// Steps que dependen directamente de `step`.
pub fn direct_dependents(dag: &Dag, step: &str) -> BTreeSet<String> {
    dag.iter()
       .filter(|(_, deps)| deps.contains(step))
       .map(|(s, _)| s.clone())
       .collect()
}

/// Dependencias transitivas de `step` (sin incluirlo).
pub fn dependencies_of(dag: &Dag, step: &str) -> BTreeSet<String> {
    reachable(dag, step)
}

/// Dependientes transitivos de `step` (sin incluirlo).
pub fn dependents_of(dag: &Dag, step: &str) -> BTreeSet<String> {
    reachable(&reverse_graph(dag), step)
}

fn reachable(graph: &Dag, start: &str) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<&str> = vec![start];
    while let Some(current) = stack.pop() {
        if let Some(next) = graph.get(current) {
            for n in next {
                if seen.insert(n.clone()) {
                    stack.push(n.as_str());
                }
            }
        }
    }
    seen.remove(start);
    seen
}

/// Restringe el DAG a los steps seleccionados y sus dependencias.
///
/// - `includes`: regex; sin patrones se seleccionan todos los steps declarados.
/// - `downstream`: agrega los dependientes transitivos de la selección.
/// - `excludes`: regex; quita steps de la selección antes de cerrarla sobre
///   sus dependencias (una dependencia requerida vuelve a entrar).
///
/// Las hojas implícitas quedan como dependencias, sin entrada propia.
pub fn filter_to_subgraph(dag: &Dag, includes: &[String], excludes: &[String], downstream: bool) -> Result<Dag, EtlError> {
    let includes = compile(includes)?;
    let excludes = compile(excludes)?;

    let mut selected: BTreeSet<String> = if includes.is_empty() {
        dag.keys().cloned().collect()
    } else {
        graph_nodes(dag).into_iter()
                        .filter(|s| includes.iter().any(|re| re.is_match(s)))
                        .collect()
    };

    if downstream {
        let reverse = reverse_graph(dag);
        let extra: BTreeSet<String> = selected.iter().flat_map(|s| reachable(&reverse, s)).collect();
        selected.extend(extra);
    }

    selected.retain(|s| !excludes.iter().any(|re| re.is_match(s)));

    let closure: BTreeSet<String> = selected.iter().flat_map(|s| reachable(dag, s)).collect();
    selected.extend(closure);

    Ok(selected.into_iter()
               .filter_map(|s| dag.get(&s).map(|deps| (s, deps.clone())))
               .collect())
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, EtlError> {
    patterns.iter()
            .map(|p| {
                Regex::new(p).map_err(|e| EtlError::InvalidPattern { pattern: p.clone(),
                                                                     reason: e.to_string() })
            })
            .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Dag {
        let mut dag = Dag::new();
        dag.insert("data://meadow/x/2020/b".into(), ["snapshot://x/2020/a.csv".to_string()].into());
        dag.insert("data://garden/x/2020/c".into(), ["data://meadow/x/2020/b".to_string()].into());
        dag.insert("data://grapher/x/2020/d".into(), ["data://garden/x/2020/c".to_string()].into());
        dag.insert("data://garden/y/2021/e".into(), BTreeSet::new());
        dag
    }

    #[test]
    fn transitive_queries() {
        let dag = sample();
        let expected: BTreeSet<String> = ["data://garden/x/2020/c", "data://meadow/x/2020/b", "snapshot://x/2020/a.csv"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dependencies_of(&dag, "data://grapher/x/2020/d"), expected);
        assert_eq!(dependents_of(&dag, "snapshot://x/2020/a.csv").len(), 3);
        assert_eq!(direct_dependents(&dag, "data://meadow/x/2020/b"),
                   BTreeSet::from(["data://garden/x/2020/c".to_string()]));
        assert_eq!(graph_nodes(&dag).len(), 5);
    }

    #[test]
    fn filter_closes_over_dependencies() {
        let dag = sample();
        let sub = filter_to_subgraph(&dag, &["garden/x".into()], &[], false).unwrap();
        let keys: Vec<&String> = sub.keys().collect();
        assert_eq!(keys, vec!["data://garden/x/2020/c", "data://meadow/x/2020/b"]);
    }

    #[test]
    fn filter_downstream_and_excludes() {
        let dag = sample();
        let sub = filter_to_subgraph(&dag, &["meadow/x".into()], &["grapher".into()], true).unwrap();
        assert!(sub.contains_key("data://garden/x/2020/c"));
        assert!(!sub.contains_key("data://grapher/x/2020/d"));

        let all = filter_to_subgraph(&dag, &[], &[], false).unwrap();
        assert_eq!(all, dag);
    }

    #[test]
    fn invalid_pattern_is_graph_error() {
        let err = filter_to_subgraph(&sample(), &["(".into()], &[], false).unwrap_err();
        assert!(matches!(err, EtlError::InvalidPattern { .. }));
    }
}
