mod build;
mod check;
mod plan;
mod run;

pub use build::build;
pub use check::check;
pub use plan::plan;
pub use run::run;

use dfgate_core::config::{
    ENV_BRANCH, ENV_OS_CODE_NAME, ENV_OS_NAME, ENV_PULL_REQUEST_BRANCH, ENV_REPO, ENV_TAG,
};
use dfgate_core::{CiMode, GateConfig};

/// Echo the resolved job variables so the CI log shows what was tested.
fn announce_job(config: &GateConfig) {
    let coords = &config.coordinates;
    let mode = config.ci.mode();
    tracing::info!(
        %mode,
        repo = %coords.repo,
        tag = %coords.tag,
        os_name = %coords.os_name,
        os_code_name = %coords.os_code_name,
        branch = %config.ci.branch,
        "resolved CI job"
    );

    println!("{ENV_REPO}: {}", coords.repo);
    println!("{ENV_TAG}: {}", coords.tag);
    println!("{ENV_OS_NAME}: {}", coords.os_name);
    println!("{ENV_OS_CODE_NAME}: {}", coords.os_code_name);
    println!("{ENV_BRANCH}: {}", config.ci.branch);
    println!("{ENV_PULL_REQUEST_BRANCH}: {}", config.ci.pull_request_branch);
    if mode == CiMode::Scheduled {
        println!("Testing CronJob for Branch: {}", config.ci.branch);
    }
}
