use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Allow binding to a non-loopback address (default: false)
    #[serde(default)]
    pub allow_public_bind: bool,
    /// Per-request timeout; generation can take a while
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            allow_public_bind: false,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_config() {
        let config = GatewayConfig::default();

        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "127.0.0.1");
        assert!(!config.allow_public_bind);
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    fn gateway_config_toml_round_trip() {
        let original = GatewayConfig {
            port: 4001,
            host: "0.0.0.0".into(),
            allow_public_bind: true,
            request_timeout_secs: 30,
        };

        let toml = toml::to_string(&original).unwrap();
        let decoded: GatewayConfig = toml::from_str(&toml).unwrap();

        assert_eq!(decoded.port, original.port);
        assert_eq!(decoded.host, original.host);
        assert_eq!(decoded.allow_public_bind, original.allow_public_bind);
        assert_eq!(decoded.request_timeout_secs, original.request_timeout_secs);
    }
}
