use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("mentalcare/", env!("CARGO_PKG_VERSION"));

/// Pooled client shared by every call of one provider.
pub fn build_provider_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!(%error, "falling back to default HTTP client");
            Client::new()
        })
}
