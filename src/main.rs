//! sqlmgmt-gateway entry point.
//!
//! Loads configuration from the environment, fetches the subscription
//! metadata for `SQLMGMT_SUBSCRIPTION_ID` and prints it as JSON.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sqlmgmt_gateway::operations::GetSubscriptionMetadata;
use sqlmgmt_gateway::{Gateway, GatewayConfig};

/// Environment variable naming the subscription to inspect.
const SUBSCRIPTION_VAR: &str = "SQLMGMT_SUBSCRIPTION_ID";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env().context("loading configuration")?;
    let subscription_id = std::env::var(SUBSCRIPTION_VAR)
        .with_context(|| format!("{SUBSCRIPTION_VAR} must be set"))?;
    tracing::info!(
        thumbprint = %config.thumbprint,
        store = %config.cert_store_dir.display(),
        management = %config.management_url,
        "starting sqlmgmt-gateway"
    );

    let gateway = Gateway::new(&config);
    let metadata = gateway
        .send(&GetSubscriptionMetadata { subscription_id })
        .await
        .context("fetching subscription metadata")?;

    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
