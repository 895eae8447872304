use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Where the http server listens. Read from `HOST` and `PORT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
        }
    }
}

impl WebConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset variables fall back to their defaults, unparsable ones are
    /// reported and fall back as well.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: parse_or(&lookup, "HOST", defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
        }
    }

    pub fn socket_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> WebConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WebConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_port_3000_on_all_interfaces() {
        let config = config(&[]);
        assert_eq!(config.socket_address().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn reads_host_and_port() {
        let config = config(&[("HOST", "127.0.0.1"), ("PORT", "8080")]);
        assert_eq!(config.socket_address().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn invalid_port_falls_back() {
        let config = config(&[("PORT", "eighty")]);
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
