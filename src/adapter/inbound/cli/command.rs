//! Command-line interface definitions.
//!
//! Defines the CLI structure for the modelplane application using `clap`.
//! Subcommands run the control plane in the foreground, inspect discoverable
//! models and owned containers, sweep containers, and perform diagnostic
//! checks.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Control plane for per-model inference servers
#[derive(Parser, Debug)]
#[command(name = "modelplane")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the modelplane CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control plane (foreground)
    Run(RunArgs),

    /// List models discoverable from every configured source
    Models(ConfigPathArg),

    /// List owned serving containers and persisted records
    Containers(ConfigPathArg),

    /// Force-remove every owned serving container
    Sweep(ConfigPathArg),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `modelplane check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigPathArg),
    /// Run local readiness checks (directories, ports, remote source).
    Health(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
///
/// Without `--config`, `~/.modelplane/config.toml` is used when it exists and
/// built-in defaults otherwise.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `run` subcommand.
///
/// Optional fields override the corresponding configuration file values.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Comma-separated models to activate after startup discovery.
    #[arg(long, value_delimiter = ',')]
    pub activate: Vec<String>,

    /// Override the models directory.
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Override log level (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,

    /// Scan the models directory once at startup but do not keep watching.
    #[arg(long)]
    pub no_watch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from(["modelplane", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run(_)));
        assert!(!cli.json);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["modelplane", "models", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Models(_)));
    }

    #[test]
    fn test_parse_color_never() {
        let cli = Cli::try_parse_from(["modelplane", "--color", "never", "sweep"]).unwrap();
        assert!(matches!(cli.color, ColorChoice::Never));
        assert!(matches!(cli.command, Commands::Sweep(_)));
    }

    #[test]
    fn test_run_args_defaults() {
        let cli = Cli::try_parse_from(["modelplane", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.config.is_none());
        assert!(args.activate.is_empty());
        assert!(!args.json_logs);
        assert!(!args.no_watch);
    }

    #[test]
    fn test_run_activate_list() {
        let cli = Cli::try_parse_from([
            "modelplane",
            "run",
            "--config",
            "/etc/modelplane.toml",
            "--activate",
            "fire,m1",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.activate, vec!["fire", "m1"]);
        assert_eq!(args.config, Some(PathBuf::from("/etc/modelplane.toml")));
    }

    #[test]
    fn test_check_subcommands() {
        let cli = Cli::try_parse_from(["modelplane", "check", "health", "-c", "x.toml"]).unwrap();
        let Commands::Check(CheckCommand::Health(arg)) = cli.command else {
            panic!("expected check health");
        };
        assert_eq!(arg.config, Some(PathBuf::from("x.toml")));

        assert!(Cli::try_parse_from(["modelplane", "check", "live"]).is_err());
    }
}
