//! DAG declarativo de steps.
//!
//! Un `Dag` mapea el URI de cada step declarado a sus dependencias directas.
//! Los steps que sólo aparecen como dependencia (snapshots, etags) son hojas
//! implícitas y no tienen entrada propia.
//!
//! Formato del archivo YAML:
//!
//! ```yaml
//! include:
//!   - dag/archive.yml
//! steps:
//!   data://meadow/x/2020/b:
//!     - snapshot://x/2020/a.csv
//!   data://garden/x/2020/c:
//!     - data://meadow/x/2020/b
//! ```

mod load;
mod mermaid;
mod query;

use std::collections::{BTreeMap, BTreeSet};

pub use load::{load_dag, parse_dag};
pub use mermaid::{mermaid, DEFAULT_REPOSITORY_URL};
pub use query::{dependencies_of, dependents_of, direct_dependents, filter_to_subgraph, graph_nodes, reverse_graph};

/// Step → dependencias directas. Ordenado para que todo recorrido sea determinista.
pub type Dag = BTreeMap<String, BTreeSet<String>>;
