use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 3000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Bearer tokens accepted on `/api/*`. Empty disables the check.
    #[serde(default)]
    pub bearer_tokens: Vec<String>,
    /// Allow binding to non-localhost addresses (default: false)
    #[serde(default)]
    pub allow_public_bind: bool,
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            bearer_tokens: Vec::new(),
            allow_public_bind: false,
        }
    }
}

impl GatewayConfig {
    pub fn requires_auth(&self) -> bool {
        !self.bearer_tokens.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.bearer_tokens.iter().any(|t| t.trim().is_empty()) {
            bail!("gateway.bearer_tokens must not contain empty tokens");
        }
        if is_public_bind(&self.host) && !self.allow_public_bind {
            bail!(
                "gateway.host {} is not a loopback address; set \
                 [gateway] allow_public_bind = true to expose it",
                self.host
            );
        }
        Ok(())
    }
}

pub fn is_public_bind(host: &str) -> bool {
    !matches!(host, "127.0.0.1" | "localhost" | "::1" | "[::1]")
}
