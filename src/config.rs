use std::collections::HashMap;
use std::fs::File;

use anyhow::{bail, Context, Result};

/// Runtime configuration, read from the environment and an optional `.env`
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL payment links are built from (`{domain}/{payment_id}`)
    pub payment_link_domain: String,
}

impl AppConfig {
    /// Process environment first, then `.env` (searched from the working
    /// directory upwards). A missing `.env` is fine.
    pub fn from_env() -> Result<Self> {
        let dotenv = read_dotenv(dotenvy::dotenv_iter())?;
        Self::from_layers(|key| std::env::var(key).ok(), dotenv)
    }

    fn from_layers(
        env: impl Fn(&str) -> Option<String>,
        dotenv: HashMap<String, String>,
    ) -> Result<Self> {
        Self::from_lookup(|key| env(key).or_else(|| dotenv.get(key).cloned()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("APP_PORT must be a port number, got {:?}", raw))?,
            None => 3000,
        };

        let payment_link_domain = lookup("PAYMENT_LINK_DOMAIN").unwrap_or_default();
        if payment_link_domain.trim().is_empty() {
            bail!("PAYMENT_LINK_DOMAIN must be set");
        }

        Ok(Self {
            host,
            port,
            payment_link_domain,
        })
    }
}

fn read_dotenv(
    iter: std::result::Result<dotenvy::Iter<File>, dotenvy::Error>,
) -> Result<HashMap<String, String>> {
    match iter {
        Ok(iter) => iter
            .collect::<std::result::Result<HashMap<_, _>, _>>()
            .context("Failed to parse .env file"),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(e).context("Failed to read .env file"),
    }
}
