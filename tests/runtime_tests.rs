//! Foreground serve loop: discovery, requested activations and the shutdown
//! sweep, over containers started by the serving runtime.

mod support;

use std::time::Duration;

use tokio::sync::watch;

use modelplane::domain::{ContainerState, SourceKind};
use modelplane::infrastructure::orchestration::{serve, teardown};
use modelplane::testkit::domain;
use modelplane::testkit::engine::FakeEngine;
use modelplane::testkit::plane::TestPlane;

#[tokio::test]
async fn serve_activates_requested_models_and_sweeps_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path())
        .serving_runtime()
        .build()
        .unwrap();
    domain::saved_model(plane.models_dir(), "fire").unwrap();
    let activate = vec!["fire".to_string(), "ghost".to_string()];
    let (tx, rx) = watch::channel(false);

    let registry = plane.components.registry.clone();
    let engine = plane.engine.clone();
    let (served, started) = tokio::join!(serve(&plane.components, &activate, rx), async {
        let started = support::wait::until(Duration::from_secs(3), || {
            registry.is_active("fire") && engine.exists("tf_fire")
        })
        .await;
        tx.send(true).unwrap();
        started
    });

    served.unwrap();
    assert!(started, "fire never became active");
    assert!(plane.engine.names().is_empty());
    assert!(plane.store.snapshot().is_empty());
    assert!(plane.components.registry.active_models().is_empty());
    assert!(!plane.components.registry.is_available("ghost"));
}

#[tokio::test]
async fn startup_discovery_prefers_local_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path()).with_remote().build().unwrap();
    let remote = plane.remote.clone().unwrap();
    remote.publish("fire");
    remote.publish("m1");
    domain::saved_model(plane.models_dir(), "fire").unwrap();
    let (_tx, rx) = watch::channel(true);

    serve(&plane.components, &[], rx).await.unwrap();

    let registry = &plane.components.registry;
    assert_eq!(registry.descriptor("fire").unwrap().source, SourceKind::Local);
    assert_eq!(
        registry.descriptor("m1").unwrap().source,
        SourceKind::RemoteRepo
    );
    assert!(remote.materialized().is_empty());
}

#[tokio::test]
async fn disabled_watcher_still_scans_once() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path())
        .configure(|config| config.watcher.enabled = false)
        .build()
        .unwrap();
    domain::saved_model(plane.models_dir(), "m1").unwrap();
    let (_tx, rx) = watch::channel(true);

    serve(&plane.components, &[], rx).await.unwrap();

    assert!(plane.components.registry.is_available("m1"));
}

#[tokio::test]
async fn teardown_removes_containers_left_by_a_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    engine.insert(
        domain::summary("aaa111", "churn", ContainerState::Running),
        "project",
        "ModelServerREST",
    );
    engine.insert(
        domain::summary("bbb222", "fire", ContainerState::Exited),
        "project",
        "ModelServerREST",
    );
    let plane = TestPlane::builder(dir.path()).engine(engine).build().unwrap();

    let report = teardown(&plane.components).await.unwrap();

    let mut removed = report.removed.clone();
    removed.sort();
    assert_eq!(removed, vec!["tf_churn", "tf_fire"]);
    assert!(report.failed.is_empty());
    assert!(plane.engine.names().is_empty());
}

#[tokio::test]
async fn teardown_propagates_a_failed_listing() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FakeEngine::new();
    engine.fail_listing("daemon unreachable");
    let plane = TestPlane::builder(dir.path()).engine(engine).build().unwrap();

    assert!(teardown(&plane.components).await.is_err());
}

#[tokio::test]
async fn registry_models_are_discovered_behind_repository_models() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path())
        .with_remote()
        .with_registry_source()
        .build()
        .unwrap();
    let remote = plane.remote.clone().unwrap();
    let registry_source = plane.registry_source.clone().unwrap();
    remote.publish("m1");
    registry_source.publish("m1");
    registry_source.publish("churn");
    let (_tx, rx) = watch::channel(true);

    serve(&plane.components, &[], rx).await.unwrap();

    let registry = &plane.components.registry;
    assert_eq!(
        registry.descriptor("m1").unwrap().source,
        SourceKind::RemoteRepo
    );
    assert_eq!(
        registry.descriptor("churn").unwrap().source,
        SourceKind::RegistrySource
    );
}

#[tokio::test]
async fn registry_models_are_materialized_on_activation() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path())
        .with_registry_source()
        .build()
        .unwrap();
    let registry_source = plane.registry_source.clone().unwrap();
    registry_source.publish("churn");
    let activate = vec!["churn".to_string()];
    let (_tx, rx) = watch::channel(true);

    serve(&plane.components, &activate, rx).await.unwrap();

    assert_eq!(registry_source.materialized(), vec!["churn".to_string()]);
    assert!(plane.models_dir().join("churn").exists());
}
