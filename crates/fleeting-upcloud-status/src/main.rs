//! Initialize an UpCloud instance group from local configuration and report
//! the state of every instance in it.

mod config;

use std::process::ExitCode;

use fleeting_upcloud::InstanceGroup;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "status check failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BoxError> {
    let config = AppConfig::from_env()?;

    let (group, info) = InstanceGroup::init(config.group, config.settings).await?;
    tracing::info!(
        id = %info.id,
        max_size = info.max_size,
        version = %info.version,
        build = %info.build_info,
        "instance group ready"
    );

    let mut instances = 0;
    group
        .update(|id, state| {
            instances += 1;
            tracing::info!(instance = id, %state, "instance");
        })
        .await?;

    tracing::info!(instances, max_size = info.max_size, "status check complete");

    group.shutdown().await;
    Ok(())
}
