//! Directory polling through the wired sync handler.

mod support;

use std::time::Duration;

use modelplane::testkit::domain;
use modelplane::testkit::plane::TestPlane;

#[tokio::test]
async fn first_poll_registers_existing_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path()).build().unwrap();
    domain::saved_model(plane.models_dir(), "m1").unwrap();
    domain::artifact(plane.models_dir(), "fire.h5", b"weights").unwrap();
    domain::artifact(plane.models_dir(), ".DS_Store", b"").unwrap();

    let outcome = plane.components.watcher().poll_once().await.unwrap();

    let mut added: Vec<_> = outcome.added.iter().map(ToString::to_string).collect();
    added.sort();
    assert_eq!(added, vec!["fire", "m1"]);
    let registry = &plane.components.registry;
    assert!(registry.is_available("fire"));
    assert!(registry.active_models().is_empty());
}

#[tokio::test]
async fn unchanged_directory_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path()).build().unwrap();
    domain::saved_model(plane.models_dir(), "m1").unwrap();
    let watcher = plane.components.watcher();

    watcher.poll_once().await.unwrap();
    let second = watcher.poll_once().await.unwrap();

    assert!(second.added.is_empty());
    assert!(second.removed.is_empty());
}

#[tokio::test]
async fn vanished_active_model_is_torn_down() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path()).build().unwrap();
    let path = domain::saved_model(plane.models_dir(), "m1").unwrap();
    let watcher = plane.components.watcher();
    watcher.poll_once().await.unwrap();
    plane.components.lifecycle.activate("m1").await.unwrap();

    std::fs::remove_dir_all(&path).unwrap();
    let outcome = watcher.poll_once().await.unwrap();

    assert_eq!(outcome.removed.len(), 1);
    assert!(outcome.is_clean());
    let registry = &plane.components.registry;
    assert!(!registry.is_available("m1"));
    assert!(!registry.is_active("m1"));
    assert_eq!(plane.runtime.released(), vec![path]);
}

#[tokio::test]
async fn unreadable_directory_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path()).build().unwrap();
    let models = plane.models_dir().to_path_buf();
    domain::saved_model(&models, "m1").unwrap();
    let watcher = plane.components.watcher();
    watcher.poll_once().await.unwrap();

    let parked = dir.path().join("parked");
    std::fs::rename(&models, &parked).unwrap();
    assert!(watcher.poll_once().await.is_err());
    assert!(plane.components.registry.is_available("m1"));

    std::fs::rename(&parked, &models).unwrap();
    let outcome = watcher.poll_once().await.unwrap();
    assert!(outcome.added.is_empty());
    assert!(outcome.removed.is_empty());
}

#[tokio::test]
async fn background_loop_picks_up_new_models() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path()).build().unwrap();
    let handle = plane.components.watcher().start();

    domain::saved_model(plane.models_dir(), "late").unwrap();
    let registry = plane.components.registry.clone();
    let seen = support::wait::until(Duration::from_secs(2), || registry.is_available("late")).await;

    handle.shutdown().await;
    assert!(seen, "watcher never registered the new model");
}

#[tokio::test]
async fn shutdown_stops_polling() {
    let dir = tempfile::tempdir().unwrap();
    let plane = TestPlane::builder(dir.path()).build().unwrap();
    plane.components.watcher().start().shutdown().await;

    domain::saved_model(plane.models_dir(), "after").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!plane.components.registry.is_available("after"));
}
