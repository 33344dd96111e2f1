//! Configuration structures.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use perpbot_core::types::{MarginMode, Timeframe};
use perpbot_planner::SizingMode;
use perpbot_signals::StrategyProfile;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub engine: EngineSettings,
    /// Instruments to trade, keyed by exchange symbol (e.g. "ETH/USDT:USDT").
    #[serde(default)]
    pub symbols: BTreeMap<String, SymbolSettings>,
    #[serde(default)]
    pub strategy: StrategyProfile,
    #[serde(default)]
    pub sizing: SizingMode,
    #[serde(default)]
    pub sentiment: SentimentSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "perpbot".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Derivatives venue connection settings. Credentials stay out of the
/// config file; only the environment variable names are configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub api_key_env: String,
    pub api_secret_env: String,
    pub base_url: String,
    /// Use the in-process paper exchange instead of a live venue.
    pub paper: bool,
    /// Open long and short sides independently (hedge mode).
    pub hedge_mode: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_key_env: "PERPBOT_API_KEY".to_string(),
            api_secret_env: "PERPBOT_API_SECRET".to_string(),
            base_url: "https://open-api.bingx.com".to_string(),
            paper: true,
            hedge_mode: true,
        }
    }
}

/// Cycle cadence and data depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Seconds between evaluation cycles.
    pub interval_secs: u64,
    pub timeframe: Timeframe,
    /// Bars of history fetched per symbol each cycle.
    pub history_limit: usize,
    /// Minimum seconds between entries on the same symbol.
    pub cooldown_secs: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            timeframe: Timeframe::Minute15,
            history_limit: 100,
            cooldown_secs: 1800,
        }
    }
}

/// Per-instrument trading parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSettings {
    /// Contract quantity per entry. Required; there is no safe default.
    pub quantity: Decimal,
    #[serde(default = "default_leverage")]
    pub leverage: u32,
    #[serde(default)]
    pub margin_mode: MarginMode,
    /// Decimal places for trigger price rounding.
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
}

fn default_leverage() -> u32 {
    15
}

fn default_price_decimals() -> u32 {
    2
}

/// News sentiment side-channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSettings {
    pub enabled: bool,
    /// Cached verdict lifetime in seconds.
    pub ttl_secs: u64,
    /// Seconds between news scans.
    pub refresh_secs: u64,
    pub news_api_key_env: String,
    pub classifier_api_key_env: String,
    pub keywords: Vec<String>,
    pub model: String,
    pub telegram_token_env: String,
    pub telegram_chat_id: String,
    /// Throttle for the opposite-news position warning, in seconds.
    pub opposite_warning_secs: i64,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: 21_600,
            refresh_secs: 21_600,
            news_api_key_env: "PERPBOT_NEWS_API_KEY".to_string(),
            classifier_api_key_env: "PERPBOT_CLASSIFIER_API_KEY".to_string(),
            keywords: vec![
                "fomc".to_string(),
                "crypto".to_string(),
                "bitcoin".to_string(),
                "ethereum".to_string(),
            ],
            model: "deepseek-chat".to_string(),
            telegram_token_env: "PERPBOT_TELEGRAM_TOKEN".to_string(),
            telegram_chat_id: String::new(),
            opposite_warning_secs: 300,
        }
    }
}
