use crate::cli::ConfigCommands;
use crate::config::PlannerConfig;
use anyhow::Result;
use std::path::Path;

pub fn run(cmd: ConfigCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => validate(config_path),
        ConfigCommands::Show => show(config_path),
    }
}

fn validate(config_path: &Path) -> Result<()> {
    let mut config = if config_path.exists() {
        match PlannerConfig::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("ℹ️  {} not found, checking defaults.", config_path.display());
        PlannerConfig::default()
    };
    config.apply_env();

    let errors = config.validate();
    if !errors.is_empty() {
        println!("❌ Validation errors in {}:", config_path.display());
        for e in &errors {
            println!("  - {}", e);
        }
        std::process::exit(1);
    }

    println!("✅ {} is valid.", config_path.display());
    for name in config.missing_secrets() {
        println!("⚠️  {} is not set", name);
    }
    Ok(())
}

fn show(config_path: &Path) -> Result<()> {
    let mut config = PlannerConfig::load_or_default(config_path);
    config.apply_env();
    match toml::to_string_pretty(&config.redacted()) {
        Ok(s) => println!("{}", s),
        Err(e) => anyhow::bail!("Failed to serialize config: {}", e),
    }
    Ok(())
}
