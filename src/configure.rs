use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::payout::worker::WorkerConfig;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub log_level: String,
    pub log_to_file: bool,
    pub log_file: String,
    pub scan_interval_ms: u64,
    pub stale_after_ms: i64,
    pub queue_capacity: usize,
    pub enqueue_delay_ms: i64,
}

impl AppConfig {
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            scan_interval_ms: self.scan_interval_ms,
            stale_after_ms: self.stale_after_ms,
            queue_capacity: self.queue_capacity,
        }
    }
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let s = Config::builder()
        // Set defaults
        .set_default("log_level", "info")?
        .set_default("log_to_file", false)?
        .set_default("log_file", "log/payout_worker.log")?
        .set_default("scan_interval_ms", 5000)?
        .set_default("stale_after_ms", 300_000)?
        .set_default("queue_capacity", 10_000)?
        .set_default("enqueue_delay_ms", 3000)?
        // Add configuration from a file
        .add_source(File::with_name("config/config.yaml").required(false))
        // Add configuration from environment variables
        .add_source(config::Environment::with_prefix("APP"))
        .build()?;

    s.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = load_config().unwrap();
        assert_eq!(config.stale_after_ms, 300_000);
        assert_eq!(config.enqueue_delay_ms, 3000);
        assert_eq!(config.log_level, "info");
    }
}
