//! Diagrama Mermaid (`flowchart TD`) con las dependencias de un step.
//!
//! Cada nodo lleva un `click` hacia el archivo que lo define: el script del
//! step de datos, el sidecar del snapshot o la URL del etag.

use std::collections::BTreeMap;
use std::fmt::Write;

use super::query::{filter_to_subgraph, graph_nodes};
use super::Dag;
use crate::errors::EtlError;
use crate::step::{StepKind, StepUri};

/// Repositorio usado para los links cuando no se indica otro.
pub const DEFAULT_REPOSITORY_URL: &str = "https://github.com/owid/etl/tree/master";

/// Link del nodo. `repository_url` es la raíz del proyecto publicada.
fn node_link(uri: &StepUri, repository_url: &str) -> String {
    let repo = repository_url.trim_end_matches('/');
    match (uri.kind(), uri.attributes()) {
        (StepKind::Etag, _) => format!("https://{}", uri.path()),
        (StepKind::Snapshot, Some(a)) => format!("{repo}/snapshots/{}/{}/{}.dvc", a.namespace, a.version, a.short_name),
        _ => format!("{repo}/etl/steps/data/{}.py", uri.path()),
    }
}

/// Subgrafo de `step` (el step y todas sus dependencias) como Mermaid.
pub fn mermaid(dag: &Dag, step: &str, repository_url: &str) -> Result<String, EtlError> {
    if !dag.contains_key(step) {
        return Err(EtlError::UnknownStep(step.to_string()));
    }
    let sub = filter_to_subgraph(dag, &[format!("^{}$", regex::escape(step))], &[], false)?;

    // ids estables: orden alfabético de todos los nodos, hojas incluidas
    let ids: BTreeMap<String, usize> = graph_nodes(&sub).into_iter().enumerate().map(|(i, s)| (s, i)).collect();

    let mut out = String::from("flowchart TD\n");
    for (child, parents) in &sub {
        for parent in parents {
            let _ = writeln!(out, "    {}[\"{parent}\"] --> {}[\"{child}\"]", ids[parent], ids[child]);
        }
    }
    for (node, id) in &ids {
        let uri = StepUri::parse(node)?;
        let _ = writeln!(out, "    click {id} href \"{}\"", node_link(&uri, repository_url));
    }
    Ok(out)
}
