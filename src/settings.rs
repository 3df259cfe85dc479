use crate::cache::DEFAULT_SORTED_DATES_TTL_SECS;
use crate::storage::resolve_data_path;
use chrono::Duration;
use std::{env, path::PathBuf};
use tracing::warn;

/// Start-up configuration read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub data_path: PathBuf,
    pub cache_ttl: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, std::io::Error> {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let ttl_secs = match env::var("APP_CACHE_TTL_SECS") {
            Ok(value) => value.parse::<i64>().unwrap_or_else(|_| {
                warn!(%value, "invalid APP_CACHE_TTL_SECS, using default");
                DEFAULT_SORTED_DATES_TTL_SECS
            }),
            Err(_) => DEFAULT_SORTED_DATES_TTL_SECS,
        };

        Ok(Self {
            port,
            data_path: resolve_data_path()?,
            cache_ttl: Duration::seconds(ttl_secs.max(0)),
        })
    }
}
