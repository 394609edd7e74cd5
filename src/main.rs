use clap::Parser;
use route_pricer::app::commands;
use route_pricer::utils::{logger, validation::Validate};
use route_pricer::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("starting route-pricer");
    if cli.verbose {
        tracing::debug!("cli options: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("configuration validation failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }

    if let Err(e) = commands::run(cli).await {
        tracing::error!("command failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}
