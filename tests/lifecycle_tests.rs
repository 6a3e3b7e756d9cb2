//! Activation, deactivation and removal through the lifecycle manager.

use std::sync::Arc;
use std::time::Duration;

use modelplane::application::lifecycle::{Activation, Deactivation};
use modelplane::domain::TeardownStep;
use modelplane::error::{Error, ModelError};
use modelplane::testkit::domain;
use modelplane::testkit::plane::TestPlane;

fn plane(dir: &std::path::Path) -> TestPlane {
    TestPlane::builder(dir).build().unwrap()
}

/// Register a local directory model named `name`.
fn discover(plane: &TestPlane, name: &str) -> std::path::PathBuf {
    let path = domain::saved_model(plane.models_dir(), name).unwrap();
    plane
        .components
        .sync
        .added(domain::local(plane.models_dir(), name));
    path
}

#[tokio::test]
async fn discovery_makes_models_available_but_not_active() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    discover(&plane, "fire");

    let registry = &plane.components.registry;
    assert!(registry.is_available("fire"));
    assert!(!registry.is_active("fire"));
    assert_eq!(plane.runtime.load_count(), 0);
}

#[tokio::test]
async fn activating_an_unknown_model_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());

    let err = plane.components.lifecycle.activate("nope").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(plane.runtime.load_count(), 0);
}

#[tokio::test]
async fn second_activation_reports_already_active() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    let path = discover(&plane, "fire");
    let lifecycle = &plane.components.lifecycle;

    let first = lifecycle.activate("fire").await.unwrap();
    assert!(first.is_new());
    assert_eq!(first.model().path, path);

    let second = lifecycle.activate("fire").await.unwrap();
    assert!(matches!(second, Activation::AlreadyActive(_)));
    assert_eq!(plane.runtime.load_count(), 1);
}

#[tokio::test]
async fn concurrent_activations_load_once() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    discover(&plane, "fire");
    plane.runtime.slow(Duration::from_millis(100));

    let lifecycle = Arc::clone(&plane.components.lifecycle);
    let (a, b) = tokio::join!(lifecycle.activate("fire"), lifecycle.activate("fire"));
    let a = a.unwrap();
    let b = b.unwrap();

    assert_ne!(a.is_new(), b.is_new(), "exactly one caller activates");
    assert_eq!(plane.runtime.load_count(), 1);
    assert_eq!(plane.components.registry.active_models().len(), 1);
}

#[tokio::test]
async fn unsupported_format_is_never_committed() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    discover(&plane, "notes");
    plane.runtime.reject("notes");

    let err = plane.components.lifecycle.activate("notes").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Model(ModelError::UnsupportedFormat { .. })
    ));
    assert!(!plane.components.registry.is_active("notes"));
    assert!(plane.components.registry.is_available("notes"));
}

#[tokio::test]
async fn load_failure_leaves_model_inactive() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    discover(&plane, "fire");
    plane.runtime.fail("fire");

    let err = plane.components.lifecycle.activate("fire").await.unwrap_err();
    assert!(err.to_string().contains("corrupt weights"));
    assert!(!plane.components.registry.is_active("fire"));
}

#[tokio::test]
async fn missing_local_artifact_fails_activation() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    plane
        .components
        .sync
        .added(domain::local(plane.models_dir(), "ghost"));

    let err = plane.components.lifecycle.activate("ghost").await.unwrap_err();
    assert!(matches!(err, Error::Model(ModelError::LoadFailed { .. })));
    assert_eq!(plane.runtime.load_count(), 0);
}

#[tokio::test]
async fn model_removed_while_loading_is_released() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    let path = discover(&plane, "fire");
    plane.runtime.slow(Duration::from_millis(300));

    let lifecycle = Arc::clone(&plane.components.lifecycle);
    let activation = tokio::spawn(async move { lifecycle.activate("fire").await });
    tokio::time::sleep(Duration::from_millis(120)).await;
    plane.components.registry.unregister("fire");

    let err = activation.await.unwrap().unwrap_err();
    assert!(err.is_not_found());
    assert!(!plane.components.registry.is_active("fire"));
    assert_eq!(plane.runtime.released(), vec![path]);
}

#[tokio::test]
async fn deactivate_releases_the_handle_once() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    let path = discover(&plane, "fire");
    let lifecycle = &plane.components.lifecycle;
    lifecycle.activate("fire").await.unwrap();

    assert_eq!(
        lifecycle.deactivate("fire").await,
        Deactivation::Deactivated { stop_error: None }
    );
    assert_eq!(lifecycle.deactivate("fire").await, Deactivation::NotActive);
    assert_eq!(plane.runtime.released(), vec![path]);
    assert!(plane.components.registry.is_available("fire"));
}

#[tokio::test]
async fn failed_container_stop_does_not_block_deactivation() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    discover(&plane, "fire");
    let lifecycle = &plane.components.lifecycle;
    lifecycle.activate("fire").await.unwrap();
    plane.engine.fail_listing("daemon unavailable");

    let outcome = lifecycle.deactivate("fire").await;
    assert!(matches!(outcome, Deactivation::Deactivated { .. }));
    assert!(!plane.components.registry.is_active("fire"));
}

#[tokio::test]
async fn remove_completely_deletes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    let path = discover(&plane, "fire");
    let lifecycle = &plane.components.lifecycle;
    lifecycle.activate("fire").await.unwrap();

    let report = lifecycle.remove_completely("fire").await;

    assert!(report.is_clean(), "{report:?}");
    let steps: Vec<_> = report.steps.iter().map(|s| s.step).collect();
    assert_eq!(
        steps,
        vec![
            TeardownStep::Deactivate,
            TeardownStep::Unregister,
            TeardownStep::DeleteArtifacts
        ]
    );
    assert!(!path.exists());
    assert!(!plane.components.registry.is_available("fire"));
}

#[tokio::test]
async fn remove_completely_of_unknown_model_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());

    let report = plane.components.lifecycle.remove_completely("nope").await;
    assert!(report.is_clean());
}

#[tokio::test]
async fn remote_models_are_materialized_on_activation() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path()).with_remote().build().unwrap();
    let remote = plane.remote.clone().unwrap();
    remote.publish("m1");
    plane.components.sync.added(domain::remote("m1"));

    let activation = plane.components.lifecycle.activate("m1").await.unwrap();

    assert_eq!(remote.materialized(), vec!["m1".to_string()]);
    assert_eq!(activation.model().path, plane.models_dir().join("m1"));
    assert!(plane.components.registry.is_active("m1"));
}

#[tokio::test]
async fn failed_download_leaves_remote_model_inactive() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path()).with_remote().build().unwrap();
    let remote = plane.remote.clone().unwrap();
    remote.publish("m1");
    remote.fail("m1");
    plane.components.sync.added(domain::remote("m1"));

    let err = plane.components.lifecycle.activate("m1").await.unwrap_err();
    assert!(matches!(err, Error::RemoteFetch(_)));
    assert!(!plane.components.registry.is_active("m1"));
    assert_eq!(plane.runtime.load_count(), 0);
}

#[tokio::test]
async fn deactivate_all_counts_active_models() {
    let dir = tempfile::tempdir().unwrap();
    let plane = plane(dir.path());
    discover(&plane, "fire");
    discover(&plane, "churn");
    discover(&plane, "idle");
    let lifecycle = &plane.components.lifecycle;
    lifecycle.activate("fire").await.unwrap();
    lifecycle.activate("churn").await.unwrap();

    assert_eq!(lifecycle.deactivate_all().await, 2);
    assert!(plane.components.registry.active_models().is_empty());
    assert_eq!(plane.components.registry.available_models().len(), 3);
}
