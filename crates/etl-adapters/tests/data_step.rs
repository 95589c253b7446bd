mod common;

use std::fs;
use std::rc::Rc;

use common::Project;
use etl_adapters::DataStep;
use etl_core::{Dataset, EtlError, SharedStep, Step, StepUri};
use pretty_assertions::assert_eq;

fn data_step(p: &Project, uri: &str, deps: Vec<SharedStep>) -> Rc<DataStep> {
    Rc::new(DataStep::new(StepUri::parse(uri).unwrap(), deps, p.paths.clone(), p.runner.clone()))
}

#[test]
fn run_stamps_source_checksum() {
    let p = Project::new();
    p.write_script("meadow/x/2020/b", "def run(dest_dir): ...\n");
    let b = data_step(&p, "data://meadow/x/2020/b", vec![]);

    assert!(b.can_execute());
    assert!(b.is_dirty().unwrap());
    b.run().unwrap();

    let ds = Dataset::load(b.dest_dir()).unwrap();
    assert_eq!(ds.metadata.source_checksum, Some(b.checksum_input().unwrap()));
    assert_eq!(ds.table_names().unwrap(), vec!["b"]);
    assert!(!b.is_dirty().unwrap());
}

#[test]
fn editing_a_step_file_makes_it_dirty() {
    let p = Project::new();
    let script = p.write_script("meadow/x/2020/b", "def run(dest_dir): ...\n");
    let b = data_step(&p, "data://meadow/x/2020/b", vec![]);
    b.run().unwrap();
    assert!(!b.is_dirty().unwrap());

    fs::write(script, "def run(dest_dir):\n    pass\n").unwrap();
    assert!(b.is_dirty().unwrap());

    // también cuentan los archivos hermanos `{base}.*`
    b.run().unwrap();
    fs::write(p.paths.step_search_path("meadow/x/2020").join("b.meta.yml"), "dataset: {}\n").unwrap();
    assert!(b.is_dirty().unwrap());
}

#[test]
fn upstream_rebuild_propagates() {
    let p = Project::new();
    let script_b = p.write_script("meadow/x/2020/b", "v1");
    p.write_script("garden/x/2020/c", "v1");
    let b = data_step(&p, "data://meadow/x/2020/b", vec![]);
    let c = data_step(&p, "data://garden/x/2020/c", vec![b.clone() as SharedStep]);
    b.run().unwrap();
    c.run().unwrap();
    assert!(!c.is_dirty().unwrap());

    fs::write(script_b, "v2").unwrap();
    b.run().unwrap();
    // c no cambió, pero el output de b sí
    assert!(c.is_dirty().unwrap());
}

#[test]
fn missing_upstream_output_means_dirty() {
    let p = Project::new();
    p.write_script("meadow/x/2020/b", "v1");
    p.write_script("garden/x/2020/c", "v1");
    let b = data_step(&p, "data://meadow/x/2020/b", vec![]);
    let c = data_step(&p, "data://garden/x/2020/c", vec![b.clone() as SharedStep]);
    b.run().unwrap();
    c.run().unwrap();

    fs::remove_dir_all(b.dest_dir()).unwrap();
    assert!(!b.has_existing_data());
    assert!(c.is_dirty().unwrap());
}

#[test]
fn missing_index_means_dirty() {
    let p = Project::new();
    p.write_script("meadow/x/2020/b", "v1");
    let b = data_step(&p, "data://meadow/x/2020/b", vec![]);
    fs::create_dir_all(b.dest_dir()).unwrap();
    assert!(b.is_dirty().unwrap());
}

#[test]
fn checksum_input_ignores_dependency_order() {
    let p = Project::new();
    for path in ["meadow/x/2020/a", "meadow/x/2020/b", "garden/x/2020/c"] {
        p.write_script(path, path);
    }
    let a = data_step(&p, "data://meadow/x/2020/a", vec![]);
    let b = data_step(&p, "data://meadow/x/2020/b", vec![]);
    a.run().unwrap();
    b.run().unwrap();

    let c1 = data_step(&p, "data://garden/x/2020/c", vec![a.clone() as SharedStep, b.clone() as SharedStep]);
    let c2 = data_step(&p, "data://garden/x/2020/c", vec![b.clone() as SharedStep, a.clone() as SharedStep]);
    assert_eq!(c1.checksum_input().unwrap(), c2.checksum_input().unwrap());
}

#[test]
fn reference_is_never_dirty() {
    let p = Project::new();
    let reference = data_step(&p, "data://garden/reference", vec![]);
    assert!(!reference.dest_dir().exists());
    assert!(!reference.is_dirty().unwrap());
}

#[test]
fn no_implementation() {
    let p = Project::new();
    let b = data_step(&p, "data://meadow/x/2020/b", vec![]);
    assert!(!b.can_execute());
    let err = b.run().unwrap_err();
    assert_eq!(err.to_string(), "have no idea how to run step: meadow/x/2020/b");
    assert!(matches!(err, EtlError::NoImplementation(_)));
}

#[test]
fn ambiguous_implementation_fails_on_run() {
    let p = Project::new();
    p.write_script("meadow/x/2020/b", "v1");
    fs::write(p.paths.step_search_path("meadow/x/2020").join("b.ipynb"), "{}").unwrap();
    let b = data_step(&p, "data://meadow/x/2020/b", vec![]);
    assert!(b.can_execute());
    assert!(matches!(b.run(), Err(EtlError::AmbiguousImplementation { .. })));
    assert!(p.runner.calls.borrow().is_empty());
}

#[test]
fn private_steps_produce_private_datasets() {
    let p = Project::new();
    p.write_script("garden/x/2020/c", "v1");
    let c = data_step(&p, "data-private://garden/x/2020/c", vec![]);
    c.run().unwrap();
    assert!(!Dataset::load(c.dest_dir()).unwrap().metadata.is_public);
}
