//! Handler for the `containers` command.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::inventory::ContainerEntry;

const NAME_WIDTH: usize = 24;
const MODEL_WIDTH: usize = 20;
const ENDPOINT_WIDTH: usize = 28;

/// List owned serving containers together with persisted records.
pub async fn execute(config: Option<&Path>) -> Result<()> {
    let config_toml = operator::read_config_toml(config)?;
    let containers = operator::operator()?.list_containers(&config_toml).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "containers",
            "containers": containers.iter().map(container_json).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    output::section("Containers");
    if containers.is_empty() {
        output::note("No owned containers");
        return Ok(());
    }

    output::table_header(&[
        ("NAME", NAME_WIDTH),
        ("MODEL", MODEL_WIDTH),
        ("ENDPOINT", ENDPOINT_WIDTH),
        ("STATE", 0),
    ]);
    output::table_separator(&[NAME_WIDTH, MODEL_WIDTH, ENDPOINT_WIDTH, 10]);
    for container in &containers {
        output::table_row(
            &[
                container.name.clone(),
                container.model.clone().unwrap_or_else(|| "-".into()),
                container
                    .serving_endpoint
                    .clone()
                    .unwrap_or_else(|| "-".into()),
                state_label(container),
            ],
            &[NAME_WIDTH, MODEL_WIDTH, ENDPOINT_WIDTH, 0],
        );
    }

    let stale = containers.iter().filter(|c| c.state.is_none()).count();
    if stale > 0 {
        output::hint(&format!(
            "{stale} persisted record(s) have no container; `modelplane sweep` clears them"
        ));
    }
    Ok(())
}

fn state_label(container: &ContainerEntry) -> String {
    match container.state.as_deref() {
        Some("running") => output::positive("running"),
        Some(state) => output::negative(state),
        None => output::muted("gone"),
    }
}

fn container_json(container: &ContainerEntry) -> serde_json::Value {
    json!({
        "name": container.name,
        "id": container.id,
        "model": container.model,
        "state": container.state,
        "serving_endpoint": container.serving_endpoint,
        "persisted": container.persisted,
    })
}
