//! Handler for the `run` command.

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::runtime::{RunRequest, RunStartupSnapshot};

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config_toml = operator::read_config_toml(args.config.as_deref())?;
    let machine_output = output::is_json();
    let request = build_run_request(args, config_toml, machine_output);
    let service = operator::operator()?;

    if !output::is_quiet() || machine_output {
        let startup = service.prepare_run(&request)?;
        print_startup_config(&startup);
    }

    service.execute_run(request).await
}

fn build_run_request(args: &RunArgs, config_toml: String, force_json_logs: bool) -> RunRequest {
    let activate = args
        .activate
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    RunRequest {
        config_toml,
        activate,
        models_dir: args
            .models_dir
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
        log_level: args.log_level.clone(),
        json_logs: args.json_logs || force_json_logs,
        no_watch: args.no_watch,
    }
}

fn print_startup_config(snapshot: &RunStartupSnapshot) {
    if output::is_json() {
        output::json_output(serde_json::json!({
            "command": "run",
            "models_dir": snapshot.models_dir,
            "profile": snapshot.profile,
            "addressing": snapshot.addressing,
            "image": snapshot.serving_image,
            "remote_repo": snapshot.remote_repo,
            "watcher": snapshot.watcher_enabled,
            "activate": snapshot.activate,
        }));
        return;
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Models", &snapshot.models_dir);
    output::field("Profile", &snapshot.profile);
    if output::verbosity() > 0 {
        output::field("Addressing", &snapshot.addressing);
        output::field("Image", &snapshot.serving_image);
    }
    output::field(
        "Remote",
        snapshot.remote_repo.as_deref().unwrap_or("disabled"),
    );
    output::field(
        "Watcher",
        if snapshot.watcher_enabled {
            output::positive("polling")
        } else {
            output::muted("off")
        },
    );
    if !snapshot.activate.is_empty() {
        output::field("Activate", snapshot.activate.join(", "));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            activate: Vec::new(),
            models_dir: None,
            log_level: None,
            json_logs: false,
            no_watch: false,
        }
    }

    #[test]
    fn blank_activation_names_are_dropped() {
        let mut run = args();
        run.activate = vec!["fire".into(), " ".into(), " m1 ".into()];

        let request = build_run_request(&run, String::new(), false);
        assert_eq!(request.activate, vec!["fire", "m1"]);
    }

    #[test]
    fn json_output_forces_json_logs() {
        let request = build_run_request(&args(), String::new(), true);
        assert!(request.json_logs);

        let request = build_run_request(&args(), String::new(), false);
        assert!(!request.json_logs);
    }

    #[test]
    fn overrides_are_carried_into_the_request() {
        let mut run = args();
        run.models_dir = Some(PathBuf::from("/srv/models"));
        run.log_level = Some("debug".into());
        run.no_watch = true;

        let request = build_run_request(&run, "models_dir = \"/x\"".into(), false);
        assert_eq!(request.models_dir.as_deref(), Some("/srv/models"));
        assert_eq!(request.log_level.as_deref(), Some("debug"));
        assert!(request.no_watch);
        assert_eq!(request.config_toml, "models_dir = \"/x\"");
    }
}
