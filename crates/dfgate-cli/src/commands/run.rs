use dfgate_core::GateConfig;
use dfgate_runner::Gate;
use std::path::Path;

use super::announce_job;

/// Execute the full gate for the current CI job.
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    // Fails before any side effect if the CI environment is incomplete
    let config = GateConfig::from_env(config_path)?;

    announce_job(&config);
    println!("Dockerfile gate: {} run", config.ci.mode());
    let report = Gate::new(&config).run().await?;

    tracing::info!(build_ran = report.build_ran, "Dockerfile gate passed");
    println!();
    if report.build_ran {
        println!("Build test passed: {}", report.context_dir.display());
    } else {
        println!(
            "No build needed: {} unchanged",
            config.coordinates.path_of_interest()
        );
    }

    Ok(())
}
