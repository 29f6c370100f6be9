use crate::connection::{ConfigError, StoreConfig};
use crate::web::StatusPolicy;
use clap::Parser;
use std::time::Duration;

/// Employee records HTTP service
#[derive(Debug, Clone, Parser)]
#[command(name = "hrms", version, about)]
pub struct AppConfig {
    /// Address to listen on
    #[arg(long, env = "HRMS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "HRMS_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Document store connection string: `mongodb://…` or `memdb:///<database>`
    #[arg(
        long,
        env = "HRMS_DATABASE_URL",
        default_value = "mongodb://localhost:27017/fiber-hrms"
    )]
    pub database_url: String,

    /// Seconds to wait for the store to answer the initial ping
    #[arg(long, env = "HRMS_CONNECT_TIMEOUT_SECS", default_value_t = 30)]
    pub connect_timeout_secs: u64,

    /// Status codes for malformed create bodies and unknown update targets
    #[arg(long, env = "HRMS_STATUS_POLICY", value_enum, default_value_t = StatusPolicy::Legacy)]
    pub status_policy: StatusPolicy,
}

impl AppConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_config(&self) -> Result<StoreConfig, ConfigError> {
        let config = StoreConfig::from_url(&self.database_url)?
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs));
        config.validate()?;
        Ok(config)
    }
}
