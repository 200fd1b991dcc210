use std::{env, net::IpAddr, path::PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "saved_model/model.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON manifest of the fitted artifact
    pub model_path: PathBuf,

    pub bind_addr: IpAddr,

    pub port: u16,
}

impl Config {
    /// Read `MODEL_PATH`, `BIND_ADDR` and `PORT`; unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            model_path: get("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),

            bind_addr: get("BIND_ADDR")
                .and_then(|s| s.parse().ok())
                .unwrap_or(IpAddr::from([0, 0, 0, 0])),

            port: get("PORT").and_then(|s| s.parse().ok()).unwrap_or(8080),
        }
    }
}
