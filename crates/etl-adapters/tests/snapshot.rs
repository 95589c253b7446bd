mod common;

use std::fs;
use std::rc::Rc;

use common::{serve_once, Project};
use etl_adapters::snapshot::{download, fetch_etag};
use etl_adapters::{DefaultStepFactory, Snapshot, SnapshotState, SnapshotStep};
use etl_core::{EtlError, Step, StepFactory, StepKind, StepUri};
use etl_store::{ContentStore, Remote};

const URI: &str = "x/2020/a.csv";

fn snapshot(p: &Project) -> Result<Snapshot, EtlError> {
    Snapshot::new(URI, p.paths.clone(), p.store.clone())
}

#[test]
fn metadata_must_exist() {
    let p = Project::new();
    let err = snapshot(&p).unwrap_err();
    assert!(matches!(err, EtlError::MetadataNotFound(path) if path.ends_with("snapshots/x/2020/a.csv.dvc")));
}

#[test]
fn lifecycle_from_declared_to_published() {
    let p = Project::new();
    p.write_snapshot_meta(URI, true);
    let snap = snapshot(&p).unwrap();
    assert_eq!(snap.metadata.version, "2020");
    assert_eq!(snap.state().unwrap(), SnapshotState::Declared);

    p.write_snapshot_file(URI, "a,b\n1,2\n");
    assert_eq!(snap.state().unwrap(), SnapshotState::Materialized);

    snap.dvc_add(false).unwrap();
    assert_eq!(snap.state().unwrap(), SnapshotState::Registered);
    assert_eq!(snap.checksum().unwrap().map(|c| c.len()), Some(64));

    snap.dvc_add(true).unwrap();
    assert_eq!(snap.state().unwrap(), SnapshotState::Published);
    // el sidecar sigue siendo metadata válida
    assert_eq!(Snapshot::new(URI, p.paths.clone(), p.store.clone()).unwrap().metadata.name, "A");
}

#[test]
fn private_snapshots_go_to_private_remote() {
    let p = Project::new();
    let sidecar = p.write_snapshot_meta(URI, false);
    p.write_snapshot_file(URI, "secret\n");
    let snap = snapshot(&p).unwrap();
    assert_eq!(snap.remote(), Remote::Private);
    snap.dvc_add(true).unwrap();
    assert!(p.store.has_remote_object(&sidecar, Remote::Private).unwrap());
    assert!(!p.store.has_remote_object(&sidecar, Remote::Public).unwrap());
}

#[test]
fn snapshot_step_pulls_when_absent() {
    let p = Project::new();
    p.write_snapshot_meta(URI, true);
    let file = p.write_snapshot_file(URI, "a,b\n1,2\n");
    snapshot(&p).unwrap().dvc_add(true).unwrap();
    fs::remove_file(&file).unwrap();

    let step = SnapshotStep::new(StepUri::parse(&format!("snapshot://{URI}")).unwrap(), p.paths.clone(), p.store.clone()).unwrap();
    assert!(step.is_dirty().unwrap());
    step.run().unwrap();
    assert!(!step.is_dirty().unwrap());
    assert_eq!(fs::read_to_string(&file).unwrap(), "a,b\n1,2\n");
    assert_eq!(Some(step.checksum_output().unwrap()), step.snapshot().checksum().unwrap());
}

#[test]
fn unregistered_snapshot_has_no_checksum() {
    let p = Project::new();
    p.write_snapshot_meta(URI, true);
    let step = SnapshotStep::new(StepUri::parse(&format!("snapshot://{URI}")).unwrap(), p.paths.clone(), p.store.clone()).unwrap();
    assert!(matches!(step.checksum_output(), Err(EtlError::NoChecksum(_))));
}

#[test]
fn download_requires_source_url() {
    let p = Project::new();
    p.write_snapshot_meta(URI, true);
    let err = snapshot(&p).unwrap().download_from_source().unwrap_err();
    assert!(matches!(err, EtlError::SourceUrlNotSet(uri) if uri == URI));
}

#[test]
fn download_writes_body_to_destination() {
    let base = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\nhello,world".into());
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested/a.csv");
    let bytes = download(&format!("{base}/a.csv"), &dest).unwrap();
    assert_eq!(bytes, 11);
    assert_eq!(fs::read_to_string(dest).unwrap(), "hello,world");
}

#[test]
fn etag_header_is_read() {
    let base = serve_once("HTTP/1.1 200 OK\r\nETag: \"abc123\"\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".into());
    assert_eq!(fetch_etag(&format!("{base}/file.csv")).unwrap(), Some("abc123".to_string()));
}

#[test]
fn factory_picks_variant_by_scheme() {
    let p = Project::new();
    p.write_snapshot_meta(URI, true);
    let factory = DefaultStepFactory::new(p.paths.clone(), p.store.clone(), p.runner.clone());

    let snap = factory.build(&StepUri::parse(&format!("snapshot://{URI}")).unwrap(), vec![]).unwrap();
    assert_eq!(snap.kind(), StepKind::Snapshot);
    let data = factory.build(&StepUri::parse("data://garden/x/2020/c").unwrap(), vec![snap.clone()]).unwrap();
    assert_eq!(data.dependencies().len(), 1);
    assert!(Rc::ptr_eq(&data.dependencies()[0], &snap));
    let etag = factory.build(&StepUri::parse("etag://example.org/f.csv").unwrap(), vec![]).unwrap();
    assert!(!etag.is_dirty().unwrap());

    let missing = factory.build(&StepUri::parse("snapshot://y/2021/b.csv").unwrap(), vec![]);
    assert!(matches!(missing, Err(EtlError::MetadataNotFound(_))));
}
