use clap::Parser;

use modelplane::adapter::inbound::cli::command::{CheckCommand, Cli, ColorChoice, Commands};
use modelplane::adapter::inbound::cli::output::{self, OutputConfig};
use modelplane::adapter::inbound::cli::{check, containers, models, operator, run, sweep};
use modelplane::error::Result;
use modelplane::infrastructure::operator::entry::Operator;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));
    output::set_color_override(match cli.color {
        ColorChoice::Always => Some(true),
        ColorChoice::Never => Some(false),
        ColorChoice::Auto => None,
    });

    if operator::install(Box::new(Operator::new())).is_err() {
        output::error("operator already installed");
        std::process::exit(1);
    }

    if let Err(e) = dispatch(cli.command).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Models(args) => models::execute(args.config.as_deref()).await,
        Commands::Containers(args) => containers::execute(args.config.as_deref()).await,
        Commands::Sweep(args) => sweep::execute(args.config.as_deref()).await,
        Commands::Check(CheckCommand::Config(args)) => {
            check::config::execute_config(args.config.as_deref())
        }
        Commands::Check(CheckCommand::Health(args)) => {
            check::health::execute_health(args.config.as_deref())
        }
    }
}
