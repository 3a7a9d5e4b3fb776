pub mod cache;
pub mod config_cmd;
pub mod layout;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "weather-planner")]
#[command(version, about = "Cached weather API proxy and AI dashboard layouts")]
pub struct Cli {
    /// Path to planner.toml
    #[arg(
        long,
        global = true,
        env = "PLANNER_CONFIG",
        default_value = "planner.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Ask the model for a card layout and print it
    Layout(LayoutArgs),
    /// Inspect or maintain the weather cache file
    #[command(subcommand)]
    Cache(CacheCommands),
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen port (overrides config and PORT)
    #[arg(long, short)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Natural-language request, e.g. "should I bike to work tomorrow"
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Also fetch each card's weather data through the cache
    #[arg(long)]
    pub fetch: bool,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Entry counts and location
    Stats,
    /// Remove expired entries
    Prune,
    /// Remove every entry
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Check planner.toml for errors
    Validate,
    /// Print the effective configuration with secrets masked
    Show,
}
