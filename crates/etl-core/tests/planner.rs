mod test_support;

use std::rc::Rc;

use etl_core::{build_plan, EtlError, ErrorCategory};
use test_support::{dag, targets, FakeFactory};

const SNAP: &str = "snapshot://x/2020/a.csv";
const MEADOW: &str = "data://meadow/x/2020/b";
const GARDEN: &str = "data://garden/x/2020/c";
const GRAPHER: &str = "data://grapher/x/2020/d";

#[test]
fn dependencies_come_first() {
    let g = dag(&[(MEADOW, &[SNAP]), (GARDEN, &[MEADOW]), (GRAPHER, &[GARDEN])]);
    let factory = FakeFactory::default();
    let plan = build_plan(&g, &targets(&[GRAPHER]), &factory).expect("plan");
    assert_eq!(plan.uris(), vec![SNAP, MEADOW, GARDEN, GRAPHER]);
}

#[test]
fn shared_dependency_is_built_once_and_shared() {
    // diamante: d → (b, c) → a
    let b = "data://garden/x/2020/b";
    let c = "data://garden/x/2020/c";
    let d = "data://grapher/x/2020/d";
    let g = dag(&[(b, &[SNAP]), (c, &[SNAP]), (d, &[b, c])]);
    let factory = FakeFactory::default();
    let plan = build_plan(&g, &targets(&[d, b]), &factory).expect("plan");

    assert_eq!(plan.len(), 4);
    let built = factory.built.borrow();
    assert_eq!(built.iter().filter(|u| u.as_str() == SNAP).count(), 1);
    assert_eq!(built.len(), 4);

    let via_b = plan.get(b).unwrap().dependencies()[0].clone();
    let via_c = plan.get(c).unwrap().dependencies()[0].clone();
    assert!(Rc::ptr_eq(&via_b, &via_c), "el snapshot debe ser la misma instancia");
}

#[test]
fn cycle_is_rejected_before_building() {
    let x = "data://garden/x/2020/x";
    let y = "data://garden/x/2020/y";
    let g = dag(&[(x, &[y]), (y, &[x])]);
    let factory = FakeFactory::default();
    let err = build_plan(&g, &targets(&[x]), &factory).unwrap_err();
    match err {
        EtlError::Cycle(path) => assert_eq!(path, vec![x, y, x]),
        other => panic!("se esperaba ciclo, llegó {other:?}"),
    }
    assert!(factory.built.borrow().is_empty());
}

#[test]
fn self_reference_is_a_cycle() {
    let x = "data://garden/x/2020/x";
    let g = dag(&[(x, &[x])]);
    let err = build_plan(&g, &targets(&[x]), &FakeFactory::default()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Graph);
    assert!(matches!(err, EtlError::Cycle(p) if p == vec![x, x]));
}

#[test]
fn undeclared_data_dependency_is_rejected() {
    let g = dag(&[(GARDEN, &[MEADOW])]);
    let err = build_plan(&g, &targets(&[GARDEN]), &FakeFactory::default()).unwrap_err();
    assert!(matches!(err, EtlError::UnknownDependency { step, dependency } if step == GARDEN && dependency == MEADOW));
}

#[test]
fn reference_and_leaves_need_no_declaration() {
    let g = dag(&[(GARDEN, &["data://garden/reference", SNAP])]);
    let plan = build_plan(&g, &targets(&[GARDEN]), &FakeFactory::default()).expect("plan");
    assert_eq!(plan.len(), 3);
}

#[test]
fn unknown_target_and_malformed_uri() {
    let g = dag(&[(GARDEN, &["not-a-uri"])]);
    let err = build_plan(&g, &targets(&["data://garden/z/2020/z"]), &FakeFactory::default()).unwrap_err();
    assert!(matches!(err, EtlError::UnknownStep(_)));

    let err = build_plan(&g, &targets(&[GARDEN]), &FakeFactory::default()).unwrap_err();
    assert!(matches!(err, EtlError::MalformedUri(u) if u == "not-a-uri"));
}
