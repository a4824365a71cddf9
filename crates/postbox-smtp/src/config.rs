//! Server settings

use serde::{Deserialize, Serialize};

/// Submission port used by STARTTLS relays
pub const DEFAULT_PORT: u16 = 587;

/// SMTP server address, loadable from the caller's own configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ServerConfig {
    /// Create settings for `host` on `port`
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}
