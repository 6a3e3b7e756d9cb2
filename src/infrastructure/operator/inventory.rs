//! Inventory operator implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::adapter::outbound::local::LocalDirectorySource;
use crate::domain::{ContainerRecord, ContainerSummary, ModelDescriptor, ModelName};
use crate::error::Result;
use crate::infrastructure::bootstrap::{
    build_orchestrator, build_registry_source, build_remote_source, production_engine,
};
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::inventory::{
    ContainerEntry, InventoryOperator, ModelEntry, SweepSummary,
};
use crate::port::outbound::source::ModelSource;

use super::entry::Operator;

#[async_trait]
impl InventoryOperator for Operator {
    async fn list_models(&self, config_toml: &str) -> Result<Vec<ModelEntry>> {
        let config = Config::parse_toml(config_toml)?;
        let local = LocalDirectorySource::new(config.models_dir.clone())
            .list()
            .await?;
        // Repository entries shadow registry entries of the same name.
        let mut remote = BTreeMap::new();
        if let Some(source) = build_registry_source(&config, production_engine(&config))? {
            remote.extend(source.list().await?);
        }
        if let Some(source) = build_remote_source(&config)? {
            remote.extend(source.list().await?);
        }
        Ok(merge_models(local, remote))
    }

    async fn list_containers(&self, config_toml: &str) -> Result<Vec<ContainerEntry>> {
        let config = Config::parse_toml(config_toml)?;
        let orchestrator = build_orchestrator(&config);
        let live = orchestrator.list_owned().await?;
        let records = orchestrator.records().await;
        Ok(merge_containers(live, records))
    }

    async fn sweep_containers(&self, config_toml: &str) -> Result<SweepSummary> {
        let config = Config::parse_toml(config_toml)?;
        let report = build_orchestrator(&config).sweep_owned().await?;
        Ok(SweepSummary {
            removed: report.removed,
            failed: report.failed,
        })
    }
}

/// Local entries shadow remote entries of the same name.
fn merge_models(
    local: BTreeMap<ModelName, ModelDescriptor>,
    remote: BTreeMap<ModelName, ModelDescriptor>,
) -> Vec<ModelEntry> {
    let mut merged = remote;
    merged.extend(local);
    merged
        .into_values()
        .map(|descriptor| ModelEntry {
            name: descriptor.name.to_string(),
            source: descriptor.source.to_string(),
            location: descriptor.location,
        })
        .collect()
}

/// Live owned containers annotated with their records, then records whose
/// container is gone.
fn merge_containers(
    live: Vec<ContainerSummary>,
    records: BTreeMap<String, ContainerRecord>,
) -> Vec<ContainerEntry> {
    let mut unmatched: Vec<ContainerRecord> = records.into_values().collect();
    let mut entries = Vec::with_capacity(live.len() + unmatched.len());

    for summary in live {
        let position = unmatched.iter().position(|record| {
            summary.matches(&record.container_id) || summary.matches(&record.container_name)
        });
        let record = position.map(|index| unmatched.remove(index));
        entries.push(ContainerEntry {
            name: summary.name.trim_start_matches('/').to_string(),
            id: Some(summary.id),
            model: summary
                .model_name
                .or_else(|| record.as_ref().map(|r| r.model_name.clone())),
            state: Some(summary.state.to_string()),
            serving_endpoint: record.as_ref().map(|r| r.serving_endpoint.clone()),
            persisted: record.is_some(),
        });
    }

    entries.extend(unmatched.into_iter().map(|record| ContainerEntry {
        name: record.container_name,
        id: Some(record.container_id),
        model: Some(record.model_name),
        state: None,
        serving_endpoint: Some(record.serving_endpoint),
        persisted: true,
    }));
    entries
}
