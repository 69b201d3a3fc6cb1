use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::notify::DEFAULT_NOTIFICATION_TTL;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    /// Root directory of the per-device profile records.
    pub profile_dir: PathBuf,
    /// Catalog JSON to load instead of the bundled dataset.
    pub catalog_path: Option<PathBuf>,
    pub notification_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "calcraftr".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "calcraftr-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let profile_dir = std::env::var("PROFILE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./profiles"));
        let catalog_path = std::env::var("CATALOG_PATH").ok().map(PathBuf::from);
        let notification_ttl = std::env::var("NOTIFICATION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_NOTIFICATION_TTL);
        Ok(Self {
            jwt,
            profile_dir,
            catalog_path,
            notification_ttl,
        })
    }
}
