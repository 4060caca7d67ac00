//! CLI-level network configuration, loaded from a TOML file.
//!
//! The core crate stays config-free beyond fee/dust policy
//! (`obscura_core::config::Config`); miner-API connection details are a CLI
//! concern and load separately here.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let cfg: NetworkConfig = toml::from_str(
            r#"
            base_url = "https://merchantapi.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.timeout_ms, 10_000);
        assert!(cfg.auth_token.is_none());
    }
}
