mod cli;
mod config;
mod http;
mod serve;

use clap::Parser;
use cli::{Cli, Commands};
use config::PlannerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let Cli { config: config_path, command } = Cli::parse();

    match command {
        Commands::Serve(args) => {
            let mut config = PlannerConfig::resolve(&config_path)?;
            if let Some(port) = args.port {
                config.server.port = port;
            }
            serve::run(config).await
        }
        Commands::Layout(args) => {
            let config = PlannerConfig::resolve(&config_path)?;
            cli::layout::run(args, &config).await
        }
        Commands::Cache(cmd) => {
            let config = PlannerConfig::resolve(&config_path)?;
            cli::cache::run(cmd, &config)
        }
        Commands::Config(cmd) => cli::config_cmd::run(cmd, &config_path),
    }
}
