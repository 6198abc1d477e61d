//! Runtime configuration: defaults overridable via `CB_*` environment
//! variables (optionally loaded from a `.env` file by the binary).

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let cfg = config::Config::builder()
            .set_default("bind_addr", "127.0.0.1:8080")?
            .set_default("database_url", "sqlite:campus_board.db?mode=rwc")?
            .add_source(config::Environment::with_prefix("CB"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}
