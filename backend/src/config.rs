//! Runtime configuration.
//!
//! Values come from CLI flags, with environment fallbacks (a `.env` file is
//! loaded by the binary before parsing):
//!
//! | Variable                | Meaning                              |
//! |-------------------------|--------------------------------------|
//! | `SALESBOARD_SOURCE`     | Spreadsheet, CSV, JSON or batch dir  |
//! | `SALESBOARD_PORT`       | HTTP port (default 3000)             |
//! | `SALESBOARD_STATIC_DIR` | Directory served under `/static`     |
//! | `RUST_LOG`              | Log filter (default `info`)          |

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=warn";

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Optional directory of static assets (logo, stylesheets).
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`]. Calling this twice is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.addr().port(), 3000);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
