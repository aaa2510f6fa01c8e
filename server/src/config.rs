use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};

/// How error payloads are mapped onto HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// 200 OK with an error body, which is what existing clients expect.
    #[default]
    Compat,
    /// 400 for an invalid url, 404 for an invalid id.
    Strict,
}

impl FromStr for StatusPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compat" => Ok(Self::Compat),
            "strict" => Ok(Self::Strict),
            other => anyhow::bail!("unknown status policy '{other}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Directory served under `/public`
    pub public_dir: PathBuf,

    /// HTML file served at `/`
    pub index_page: PathBuf,

    /// Upper bound on a single hostname lookup
    pub lookup_timeout: Duration,

    pub status_policy: StatusPolicy,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys fall back to defaults.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = get("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1-65535)")?;

        let timeout_ms = get("LOOKUP_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".into())
            .parse::<u64>()
            .context("LOOKUP_TIMEOUT_MS must be a whole number of milliseconds")?;

        if timeout_ms == 0 {
            anyhow::bail!("LOOKUP_TIMEOUT_MS must be greater than zero");
        }

        let status_policy = match get("ERROR_STATUS") {
            Some(raw) => raw
                .parse::<StatusPolicy>()
                .context("ERROR_STATUS must be either 'compat' or 'strict'")?,
            None => StatusPolicy::default(),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            public_dir: get("PUBLIC_DIR")
                .unwrap_or_else(|| "public".into())
                .into(),
            index_page: get("INDEX_PAGE")
                .unwrap_or_else(|| "views/index.html".into())
                .into(),
            lookup_timeout: Duration::from_millis(timeout_ms),
            status_policy,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
