//! Per-model serving container orchestration against an in-memory engine.

use std::path::Path;
use std::sync::Arc;

use modelplane::application::container::{Addressing, ContainerOrchestrator, OrchestratorConfig};
use modelplane::domain::{ContainerPhase, ContainerState};
use modelplane::error::{ContainerError, Error};
use modelplane::port::outbound::engine::MODEL_NAME_LABEL;
use modelplane::port::outbound::probe::ProbeStatus;
use modelplane::testkit::engine::FakeEngine;
use modelplane::testkit::probe::ScriptedProbe;
use modelplane::testkit::store::MemoryRecordStore;
use modelplane::testkit::{config, domain};

struct Fixture {
    orchestrator: ContainerOrchestrator,
    engine: Arc<FakeEngine>,
    probe: Arc<ScriptedProbe>,
    store: Arc<MemoryRecordStore>,
}

fn fixture_with(engine: FakeEngine, probe: ScriptedProbe, store: MemoryRecordStore) -> Fixture {
    fixture_configured(config::orchestrator(), engine, probe, store)
}

fn fixture_configured(
    config: OrchestratorConfig,
    engine: FakeEngine,
    probe: ScriptedProbe,
    store: MemoryRecordStore,
) -> Fixture {
    let engine = Arc::new(engine);
    let probe = Arc::new(probe);
    let store = Arc::new(store);
    Fixture {
        orchestrator: ContainerOrchestrator::new(
            config,
            engine.clone(),
            probe.clone(),
            store.clone(),
        ),
        engine,
        probe,
        store,
    }
}

fn fixture() -> Fixture {
    fixture_with(
        FakeEngine::new(),
        ScriptedProbe::ready(),
        MemoryRecordStore::new(),
    )
}

const MODEL_PATH: &str = "/models/fire";

#[tokio::test]
async fn ensure_starts_a_labelled_read_only_container() {
    let f = fixture();

    let record = f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();

    let specs = f.engine.specs();
    assert_eq!(specs.len(), 1);
    let spec = &specs[0];
    assert_eq!(spec.name, "tf_fire");
    assert_eq!(spec.image, "tensorflow/serving:latest");
    assert_eq!(spec.labels.get("project").map(String::as_str), Some("ModelServerREST"));
    assert_eq!(spec.labels.get(MODEL_NAME_LABEL).map(String::as_str), Some("fire"));
    assert_eq!(spec.network.as_deref(), Some("modelplane-test"));
    assert!(spec.port.is_none());
    assert_eq!(spec.mounts.len(), 1);
    assert!(spec.mounts[0].read_only);
    assert_eq!(spec.mounts[0].host_path, Path::new(MODEL_PATH));
    assert_eq!(spec.mounts[0].container_path, "/models/fire");

    assert_eq!(record.container_name, "tf_fire");
    assert!(record.serving_endpoint.contains("tf_fire"));
    assert!(record.serving_endpoint.ends_with(":predict"));
    assert_eq!(f.store.snapshot().get("fire"), Some(&record));
    assert_eq!(f.orchestrator.phase("fire"), ContainerPhase::Available);
}

#[tokio::test]
async fn ensure_waits_for_the_model_to_become_available() {
    let f = fixture_with(
        FakeEngine::new(),
        ScriptedProbe::scripted(vec![
            ProbeStatus::Unreachable("connection refused".into()),
            ProbeStatus::Pending,
        ]),
        MemoryRecordStore::new(),
    );

    f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();

    assert_eq!(f.probe.check_count(), 3);
    assert!(f.probe.endpoints().iter().all(|e| e.contains("tf_fire")));
}

#[tokio::test]
async fn ensure_reuses_a_live_container() {
    let f = fixture();

    let first = f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();
    let second = f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(f.engine.run_count(), 1);
}

#[tokio::test]
async fn concurrent_ensures_start_one_container() {
    let f = fixture();

    let (a, b) = tokio::join!(
        f.orchestrator.ensure("fire", Path::new(MODEL_PATH)),
        f.orchestrator.ensure("fire", Path::new(MODEL_PATH)),
    );

    assert_eq!(a.unwrap().container_id, b.unwrap().container_id);
    assert_eq!(f.engine.run_count(), 1);
    assert_eq!(f.engine.names(), vec!["tf_fire".to_string()]);
}

#[tokio::test]
async fn stale_record_is_replaced_by_a_fresh_container() {
    let engine = FakeEngine::new();
    engine.insert(
        domain::summary("aaa111", "fire", ContainerState::Exited),
        "project",
        "ModelServerREST",
    );
    let store = MemoryRecordStore::with_records([domain::record("fire", "aaa111")]);
    let f = fixture_with(engine, ScriptedProbe::ready(), store);

    let record = f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();

    assert_ne!(record.container_id, "aaa111");
    assert!(!f.engine.exists("aaa111"));
    assert_eq!(f.engine.run_count(), 1);
    assert_eq!(f.store.snapshot()["fire"].container_id, record.container_id);
}

#[tokio::test]
async fn unrecorded_leftover_container_is_recreated() {
    let engine = FakeEngine::new();
    engine.insert(
        domain::summary("bbb222", "fire", ContainerState::Running),
        "project",
        "ModelServerREST",
    );
    let f = fixture_with(engine, ScriptedProbe::ready(), MemoryRecordStore::new());

    let record = f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();

    assert_ne!(record.container_id, "bbb222");
    assert_eq!(f.engine.names(), vec!["tf_fire".to_string()]);
}

#[tokio::test]
async fn readiness_timeout_removes_the_container() {
    let f = fixture_with(FakeEngine::new(), ScriptedProbe::never(), MemoryRecordStore::new());

    let err = f
        .orchestrator
        .ensure("fire", Path::new(MODEL_PATH))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Container(ContainerError::ReadinessTimeout { .. })
    ));
    assert!(f.engine.names().is_empty());
    assert!(f.store.snapshot().is_empty());
    assert_eq!(f.orchestrator.phase("fire"), ContainerPhase::Absent);
}

#[tokio::test]
async fn start_failure_writes_no_record() {
    let engine = FakeEngine::new();
    engine.fail_runs("image not found");
    let f = fixture_with(engine, ScriptedProbe::ready(), MemoryRecordStore::new());

    let err = f
        .orchestrator
        .ensure("fire", Path::new(MODEL_PATH))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("image not found"));
    assert!(f.store.snapshot().is_empty());
    assert_eq!(f.probe.check_count(), 0);
}

#[tokio::test]
async fn stop_removes_container_and_record() {
    let f = fixture();
    f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();

    assert!(f.orchestrator.stop("fire").await.unwrap());
    assert!(f.engine.names().is_empty());
    assert!(f.store.snapshot().is_empty());
    assert_eq!(f.orchestrator.phase("fire"), ContainerPhase::Absent);

    assert!(!f.orchestrator.stop("fire").await.unwrap());
}

#[tokio::test]
async fn persistence_failure_does_not_fail_ensure() {
    let store = MemoryRecordStore::new();
    store.fail_saves(true);
    let f = fixture_with(FakeEngine::new(), ScriptedProbe::ready(), store);

    let record = f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();

    assert_eq!(record.container_name, "tf_fire");
    assert!(f.store.save_count() >= 1);
    assert!(f.store.snapshot().is_empty());
}

#[tokio::test]
async fn unreadable_records_degrade_to_empty() {
    let store = MemoryRecordStore::with_records([domain::record("fire", "aaa111")]);
    store.fail_loads(true);
    let f = fixture_with(FakeEngine::new(), ScriptedProbe::ready(), store);

    assert!(f.orchestrator.records().await.is_empty());
    f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();
    assert_eq!(f.engine.run_count(), 1);
}

#[tokio::test]
async fn sweep_removes_every_owned_container() {
    let engine = FakeEngine::new();
    engine.insert(
        domain::summary("ccc333", "churn", ContainerState::Exited),
        "project",
        "ModelServerREST",
    );
    engine.insert(
        domain::summary("ddd444", "postgres", ContainerState::Running),
        "project",
        "SomethingElse",
    );
    let f = fixture_with(engine, ScriptedProbe::ready(), MemoryRecordStore::new());
    f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();

    let report = f.orchestrator.sweep_owned().await.unwrap();

    let mut removed = report.removed.clone();
    removed.sort();
    assert_eq!(removed, vec!["tf_churn".to_string(), "tf_fire".to_string()]);
    assert!(report.is_clean());
    assert_eq!(f.engine.names(), vec!["tf_postgres".to_string()]);
    assert!(f.store.snapshot().is_empty());
}

#[tokio::test]
async fn sweep_reports_containers_it_could_not_remove() {
    let f = fixture();
    f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();
    f.orchestrator.ensure("churn", Path::new("/models/churn")).await.unwrap();
    f.engine.fail_removal("tf_churn");

    let report = f.orchestrator.sweep_owned().await.unwrap();

    assert_eq!(report.removed, vec!["tf_fire".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "tf_churn");
    assert!(f.store.snapshot().contains_key("churn"));
    assert!(!f.store.snapshot().contains_key("fire"));
}

#[tokio::test]
async fn models_whose_names_sanitize_alike_get_their_own_containers() {
    let f = fixture();

    let spaced = f
        .orchestrator
        .ensure("my model", Path::new("/models/my model"))
        .await
        .unwrap();
    let dashed = f
        .orchestrator
        .ensure("my-model", Path::new("/models/my-model"))
        .await
        .unwrap();

    assert_ne!(spaced.container_name, dashed.container_name);
    assert_ne!(spaced.serving_endpoint, dashed.serving_endpoint);
    assert_eq!(dashed.container_name, "tf_my-model");
    assert_eq!(f.engine.names().len(), 2);

    let again = f
        .orchestrator
        .ensure("my model", Path::new("/models/my model"))
        .await
        .unwrap();
    assert_eq!(again.container_id, spaced.container_id);
    assert_eq!(f.engine.run_count(), 2);
}

#[tokio::test]
async fn record_pointing_at_another_models_container_is_not_reused() {
    let engine = FakeEngine::new();
    engine.insert(
        domain::summary("aaa111", "churn", ContainerState::Running),
        "project",
        "ModelServerREST",
    );
    let mut stale = domain::record("fire", "aaa111");
    stale.container_name = "tf_churn".into();
    let store = MemoryRecordStore::with_records([stale]);
    let f = fixture_with(engine, ScriptedProbe::ready(), store);

    let record = f.orchestrator.ensure("fire", Path::new(MODEL_PATH)).await.unwrap();

    assert_ne!(record.container_id, "aaa111");
    assert_eq!(record.container_name, "tf_fire");
    assert!(f.engine.exists("aaa111"));
    assert_eq!(f.engine.run_count(), 1);
}

#[tokio::test]
async fn concurrent_starts_publish_distinct_host_ports() {
    let config = OrchestratorConfig {
        addressing: Addressing::HostPort {
            start: 18501,
            end: 18510,
        },
        ..config::orchestrator()
    };
    let f = fixture_configured(
        config,
        FakeEngine::new(),
        ScriptedProbe::scripted(vec![ProbeStatus::Pending, ProbeStatus::Pending]),
        MemoryRecordStore::new(),
    );

    let (a, b) = tokio::join!(
        f.orchestrator.ensure("a", Path::new("/models/a")),
        f.orchestrator.ensure("b", Path::new("/models/b")),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let ports: Vec<_> = f
        .engine
        .specs()
        .iter()
        .map(|spec| spec.port.as_ref().map(|binding| binding.host_port))
        .collect();
    assert_eq!(ports.len(), 2);
    assert!(ports.iter().all(Option::is_some));
    assert_ne!(ports[0], ports[1]);
    assert_ne!(a.host_port, b.host_port);
}

#[tokio::test]
async fn failed_start_releases_its_host_port() {
    let config = OrchestratorConfig {
        addressing: Addressing::HostPort {
            start: 18521,
            end: 18521,
        },
        ..config::orchestrator()
    };
    let f = fixture_configured(
        config,
        FakeEngine::new(),
        ScriptedProbe::never(),
        MemoryRecordStore::new(),
    );

    assert!(f.orchestrator.ensure("a", Path::new("/models/a")).await.is_err());
    assert!(f.orchestrator.ensure("b", Path::new("/models/b")).await.is_err());

    let ports: Vec<_> = f
        .engine
        .specs()
        .iter()
        .map(|spec| spec.port.as_ref().map(|binding| binding.host_port))
        .collect();
    assert_eq!(ports, vec![Some(18521), Some(18521)]);
}
