//! Listener configuration for `serve`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Longest drain the server accepts on shutdown, in seconds.
const MAX_SHUTDOWN_TIMEOUT: u64 = 300;

/// Lowest port that can be bound without elevated privileges.
const MIN_UNPRIVILEGED_PORT: u16 = 1024;

/// Why a [`ServerConfig`] was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerConfigError {
    #[error("port {0} is privileged, use a port between 1024 and 65535")]
    PrivilegedPort(u16),
    #[error("shutdown timeout of {0}s is out of range, use 1 to 300 seconds")]
    ShutdownTimeout(u64),
}

/// Where the HTTP API listens and how long it drains on shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Address to bind; `0.0.0.0` listens on every interface.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to bind, 1024 or above.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds open connections may take to finish after SIGINT/SIGTERM.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// Rejects privileged ports and out-of-range drain timeouts.
    pub fn validate(&self) -> Result<(), ServerConfigError> {
        if self.port < MIN_UNPRIVILEGED_PORT {
            return Err(ServerConfigError::PrivilegedPort(self.port));
        }

        if !(1..=MAX_SHUTDOWN_TIMEOUT).contains(&self.shutdown_timeout) {
            return Err(ServerConfigError::ShutdownTimeout(self.shutdown_timeout));
        }

        Ok(())
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Returns whether the host is the unspecified address.
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "Server configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            shutdown_timeout: 30,
        }
    }
}
