//! Environment configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::suggest::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_PORT: u16 = 8083;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} is not a valid {expected}: {value:?}")]
    Invalid { name: &'static str, expected: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub nats_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub gemini_api_key: Option<String>,
    pub ai_model: String,
    pub ai_base_url: String,
    pub seed_demo_data: bool,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid { name: "PORT", expected: "port number", value: v })?,
            None => DEFAULT_PORT,
        };
        let bind_addr = match var("BIND_ADDR") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid { name: "BIND_ADDR", expected: "IP address", value: v })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let seed_demo_data = match var("SEED_DEMO_DATA") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid { name: "SEED_DEMO_DATA", expected: "boolean", value: v })?,
            None => true,
        };

        Ok(Self {
            bind_addr,
            port,
            nats_url: var("NATS_URL"),
            session_file: var("SESSION_FILE").map(PathBuf::from),
            gemini_api_key: var("GEMINI_API_KEY"),
            ai_model: var("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ai_base_url: var("AI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            seed_demo_data,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.listen_addr().to_string(), "0.0.0.0:8083");
        assert_eq!(c.ai_model, "gemini-2.0-flash");
        assert!(c.seed_demo_data);
        assert!(c.nats_url.is_none() && c.gemini_api_key.is_none() && c.session_file.is_none());
    }

    #[test]
    fn overrides() {
        let c = config(&[("PORT", "9000"), ("BIND_ADDR", "127.0.0.1"), ("SEED_DEMO_DATA", "no"), ("GEMINI_API_KEY", "k"), ("SESSION_FILE", "/tmp/s.json")]).unwrap();
        assert_eq!(c.listen_addr().to_string(), "127.0.0.1:9000");
        assert!(!c.seed_demo_data);
        assert_eq!(c.gemini_api_key.as_deref(), Some("k"));
        assert_eq!(c.session_file, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn blank_values_fall_back() {
        let c = config(&[("PORT", "  "), ("NATS_URL", "")]).unwrap();
        assert_eq!(c.port, DEFAULT_PORT);
        assert!(c.nats_url.is_none());
    }

    #[test]
    fn malformed_values_rejected() {
        assert!(matches!(config(&[("PORT", "eighty")]), Err(ConfigError::Invalid { name: "PORT", .. })));
        assert!(matches!(config(&[("SEED_DEMO_DATA", "maybe")]), Err(ConfigError::Invalid { name: "SEED_DEMO_DATA", .. })));
    }
}
