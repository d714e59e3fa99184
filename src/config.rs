use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

pub const APP_ID: &str = "com.parley.Parley";
pub const APP_NAME: &str = "Parley";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Delay between two revealed characters of a reply.
pub const REVEAL_TICK: Duration = Duration::from_millis(50);

const BACKEND_URL_VAR: &str = "PARLEY_BACKEND_URL";
const INFERENCE_URL_VAR: &str = "PARLEY_INFERENCE_URL";
pub const AUTH_TOKEN_VAR: &str = "PARLEY_AUTH_TOKEN";

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_INFERENCE_URL: &str = "http://localhost:8000";

/// Base URLs of the two services the chat view talks to.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub backend: Url,
    pub inference: Url,
}

impl Endpoints {
    pub fn from_env() -> Result<Self> {
        let backend = std::env::var(BACKEND_URL_VAR).ok();
        let inference = std::env::var(INFERENCE_URL_VAR).ok();
        Self::parse(
            backend.as_deref().unwrap_or(DEFAULT_BACKEND_URL),
            inference.as_deref().unwrap_or(DEFAULT_INFERENCE_URL),
        )
    }

    pub fn parse(backend: &str, inference: &str) -> Result<Self> {
        Ok(Self {
            backend: base_url(backend)
                .with_context(|| format!("Invalid backend URL: {}", backend))?,
            inference: base_url(inference)
                .with_context(|| format!("Invalid inference URL: {}", inference))?,
        })
    }
}

/// Parse a base URL so that `Url::join` appends to its path instead of
/// replacing the last segment.
fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(&format!("{}/", trimmed))
}
