//! Server configuration loaded from environment variables

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_SESSION_COOKIE: &str = "planningpoker_session";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory served for paths that match no API route
    pub static_dir: PathBuf,
    /// Name of the cookie carrying the session token
    pub session_cookie: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = match env_var("PLANNINGPOKER_HOST") {
            Some(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(%value, "Invalid PLANNINGPOKER_HOST, using {}", defaults.host);
                defaults.host
            }),
            None => defaults.host,
        };

        let port = match env_var("PLANNINGPOKER_PORT") {
            Some(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(%value, "Invalid PLANNINGPOKER_PORT, using {}", defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };

        let static_dir = env_var("PLANNINGPOKER_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let session_cookie =
            env_var("PLANNINGPOKER_SESSION_COOKIE").unwrap_or(defaults.session_cookie);

        Self {
            host,
            port,
            static_dir,
            session_cookie,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read a trimmed, non-empty environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
