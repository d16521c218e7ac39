use std::net::SocketAddr;

use anyhow::Context;
use axum::http::HeaderValue;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_LOG_FILTER: &str = "carelink=info,tower_http=info";

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    /// `None` means permissive CORS.
    pub cors_origin: Option<HeaderValue>,
}

impl Config {
    /// Reads `CARELINK_ADDR` and `CARELINK_CORS_ORIGIN`, honouring `.env`.
    pub fn from_env() -> anyhow::Result<Config> {
        Self::from_vars(
            dotenv::var("CARELINK_ADDR").ok(),
            dotenv::var("CARELINK_CORS_ORIGIN").ok(),
        )
    }

    pub fn from_vars(addr: Option<String>, cors_origin: Option<String>) -> anyhow::Result<Config> {
        let addr = addr.as_deref().unwrap_or(DEFAULT_ADDR);
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("CARELINK_ADDR {addr:?} is not a socket address"))?;

        let cors_origin = match cors_origin.filter(|origin| !origin.is_empty()) {
            Some(origin) => Some(
                HeaderValue::from_str(&origin)
                    .with_context(|| format!("CARELINK_CORS_ORIGIN {origin:?} is not a valid header value"))?,
            ),
            None => None,
        };

        Ok(Config { addr, cors_origin })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_origin: None,
        }
    }
}
