//! Validate configuration command.

use anyhow::Result;
use perpbot_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Paper mode: {}", config.exchange.paper);
            println!(
                "Cycle: every {}s on {} candles, {} bars of history",
                config.engine.interval_secs, config.engine.timeframe, config.engine.history_limit
            );
            println!("Cooldown: {}s", config.engine.cooldown_secs);
            println!("Sentiment enabled: {}", config.sentiment.enabled);
            println!("Symbols:");
            for (symbol, settings) in &config.symbols {
                println!(
                    "  {} qty {} lev {}x {:?} ({} dp)",
                    symbol,
                    settings.quantity,
                    settings.leverage,
                    settings.margin_mode,
                    settings.price_decimals
                );
            }
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
