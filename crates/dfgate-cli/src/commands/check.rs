use dfgate_core::GateConfig;
use dfgate_runner::Gate;
use std::path::Path;

use super::announce_job;

pub async fn check(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = GateConfig::from_env(config_path)?;
    announce_job(&config);

    Gate::new(&config).check().await?;

    println!("Generated Dockerfiles match committed files");
    Ok(())
}
