use dfgate_core::GateConfig;
use dfgate_runner::Gate;
use std::path::Path;

use super::announce_job;

pub async fn build(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = GateConfig::from_env(config_path)?;
    announce_job(&config);

    Gate::new(&config).build().await?;

    println!("Build test passed: {}", config.context_dir().display());
    Ok(())
}
