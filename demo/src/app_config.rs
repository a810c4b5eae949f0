use carebid_order::EngineConfig;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Checked-in defaults; every field also has a code default
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/development
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables: CAREBID__ENGINE__TIMING__MIN_DELAY_MS=250
            .add_source(config::Environment::with_prefix("CAREBID").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
