use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub supplier: SupplierConfig,
    pub watchdog: WatchdogSettings,
    pub composition: CompositionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SupplierConfig {
    /// Base URL of the external provider endpoints.
    pub base_url: String,
    /// Per-call timeout for inventory and event requests.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchdogSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompositionSettings {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_cities")]
    pub max_cities: usize,
    #[serde(default = "default_per_city")]
    pub per_city: usize,
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: usize,
    #[serde(default = "default_candidate_cities")]
    pub candidate_cities: usize,
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_poll_interval() -> u64 {
    15
}

fn default_max_results() -> usize {
    5
}

fn default_max_cities() -> usize {
    5
}

fn default_per_city() -> usize {
    2
}

fn default_max_alternatives() -> usize {
    5
}

fn default_candidate_cities() -> usize {
    3
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file; optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables with a VOYARA prefix, e.g.
            // VOYARA_DATABASE__URL
            .add_source(config::Environment::with_prefix("VOYARA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
