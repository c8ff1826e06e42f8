use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub snapshot_secs: u64,
    pub token_ttl_days: i64,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = var("AGORA_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("AGORA_JWT_SECRET is unset or still a placeholder; set it in .env and restart");
        }

        let port = match var("AGORA_PORT") {
            Some(raw) => raw.parse().with_context(|| format!("AGORA_PORT={raw}"))?,
            None => 3000,
        };
        let snapshot_secs = match var("AGORA_SNAPSHOT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("AGORA_SNAPSHOT_SECS={raw}"))?,
            None => 60,
        };
        if snapshot_secs == 0 {
            bail!("AGORA_SNAPSHOT_SECS must be positive");
        }
        let token_ttl_days = match var("AGORA_TOKEN_TTL_DAYS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("AGORA_TOKEN_TTL_DAYS={raw}"))?,
            None => 30,
        };

        Ok(Self {
            jwt_secret,
            host: var("AGORA_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            data_path: var("AGORA_DATA_PATH")
                .unwrap_or_else(|| "agora-data.json".into())
                .into(),
            snapshot_secs,
            token_ttl_days,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}
