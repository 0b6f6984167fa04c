use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Gateway configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: IpAddr,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// How long shutdown waits for open connections and queued engine calls.
    pub shutdown_drain: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: parsed_var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parsed_var("PORT").unwrap_or(defaults.port),
            shutdown_drain: parsed_var("SHUTDOWN_DRAIN_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_drain),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3842,
            shutdown_drain: Duration::from_secs(10),
        }
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(%name, %value, "ignoring unparsable env var");
            None
        }
    }
}
