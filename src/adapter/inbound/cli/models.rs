//! Handler for the `models` command.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::inventory::ModelEntry;

const NAME_WIDTH: usize = 28;
const SOURCE_WIDTH: usize = 12;

/// List models discoverable from every configured source.
pub async fn execute(config: Option<&Path>) -> Result<()> {
    let config_toml = operator::read_config_toml(config)?;
    let models = operator::operator()?.list_models(&config_toml).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "models",
            "models": models.iter().map(model_json).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    output::section("Models");
    if models.is_empty() {
        output::note("No models found");
        return Ok(());
    }

    output::table_header(&[("NAME", NAME_WIDTH), ("SOURCE", SOURCE_WIDTH), ("LOCATION", 0)]);
    output::table_separator(&[NAME_WIDTH, SOURCE_WIDTH, 24]);
    for model in &models {
        output::table_row(
            &[
                model.name.clone(),
                model.source.clone(),
                model.location.clone(),
            ],
            &[NAME_WIDTH, SOURCE_WIDTH, 0],
        );
    }
    Ok(())
}

fn model_json(model: &ModelEntry) -> serde_json::Value {
    json!({
        "name": model.name,
        "source": model.source,
        "location": model.location,
    })
}
