use crate::cli::LayoutArgs;
use crate::config::PlannerConfig;
use crate::serve;
use anyhow::{Context, Result};

pub async fn run(args: LayoutArgs, config: &PlannerConfig) -> Result<()> {
    let query = args.query.join(" ");
    let layout = serve::layout_generator(config)
        .generate(&query)
        .await
        .context("Failed to generate layout")?;

    println!("{}", serde_json::to_string_pretty(&layout)?);

    if !args.fetch {
        return Ok(());
    }

    let proxy = serve::weather_proxy(config, serve::open_cache(config));
    println!();
    println!("Card data");
    println!("{}", "─".repeat(50));
    for card in &layout.cards {
        match proxy.call(card.card_type, &card.query_params()).await {
            Ok(response) => println!(
                "✅ {:16} {:>4}  {} bytes",
                card.card_type.name(),
                response.source.as_str(),
                response.data.to_string().len()
            ),
            Err(e) => println!("❌ {:16} {}", card.card_type.name(), e),
        }
    }
    println!("{}", "─".repeat(50));
    Ok(())
}
