//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, EngineSettings, ExchangeConfig, LoggingConfig, SentimentSettings,
    SymbolSettings,
};

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use std::path::Path;

/// Load configuration from file and environment, then validate it.
///
/// Environment variables use the `PERPBOT` prefix with `__` as the section
/// separator, e.g. `PERPBOT__ENGINE__INTERVAL_SECS=30`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("PERPBOT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    validate(&app_config)?;
    Ok(app_config)
}

/// Reject configurations that would misbehave at runtime. Startup is the
/// only safe place to fail on these.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.symbols.is_empty() {
        return Err(ConfigError::Message(
            "at least one symbol must be configured".to_string(),
        ));
    }
    for (symbol, settings) in &config.symbols {
        if settings.quantity <= Decimal::ZERO {
            return Err(ConfigError::Message(format!(
                "symbol {symbol}: quantity must be positive"
            )));
        }
        if settings.leverage == 0 {
            return Err(ConfigError::Message(format!(
                "symbol {symbol}: leverage must be at least 1"
            )));
        }
    }
    if config.engine.interval_secs == 0 {
        return Err(ConfigError::Message(
            "engine.interval_secs must be positive".to_string(),
        ));
    }
    if config.engine.cooldown_secs < 0 {
        return Err(ConfigError::Message(
            "engine.cooldown_secs must not be negative".to_string(),
        ));
    }
    if config.engine.history_limit < config.strategy.min_history {
        return Err(ConfigError::Message(format!(
            "engine.history_limit ({}) is below strategy.min_history ({})",
            config.engine.history_limit, config.strategy.min_history
        )));
    }
    config
        .strategy
        .validate()
        .map_err(|err| ConfigError::Message(format!("strategy: {err}")))?;
    config
        .sizing
        .validate()
        .map_err(|err| ConfigError::Message(format!("sizing: {err}")))?;
    Ok(())
}
