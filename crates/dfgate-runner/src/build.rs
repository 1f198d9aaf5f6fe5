use std::path::Path;

use dfgate_core::BuildToolConfig;

use crate::executor::{CommandExecutor, Invocation, RealExecutor};
use crate::process::ProcessError;

/// Runs the build command (`make build` by default) in a Docker build context.
pub struct BuildRunner<E: CommandExecutor = RealExecutor> {
    executor: E,
    program: String,
    args: Vec<String>,
}

impl BuildRunner<RealExecutor> {
    pub fn new(config: &BuildToolConfig) -> Self {
        Self::with_executor(RealExecutor, config)
    }
}

impl<E: CommandExecutor> BuildRunner<E> {
    pub fn with_executor(executor: E, config: &BuildToolConfig) -> Self {
        Self {
            executor,
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    /// Build `context_dir`, streaming the build's stdout as it runs.
    pub async fn build(&self, context_dir: &Path) -> Result<(), BuildError> {
        let invocation = Invocation::new(&self.program, self.args.iter().cloned(), context_dir);
        tracing::info!(dir = %context_dir.display(), "running {invocation}");

        match self.executor.exec_streaming(&invocation).await {
            Ok(()) => Ok(()),
            Err(ProcessError::CommandFailed {
                program,
                args,
                code,
                ..
            }) => Err(BuildError::Failed {
                program,
                args,
                code,
            }),
            Err(e) => Err(BuildError::Process { source: e }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(
        "build failed: {program} {args:?} exited with {}",
        code.map_or_else(|| "a signal".to_owned(), |c| format!("code {c}"))
    )]
    Failed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
    },

    #[error("could not run build command")]
    Process { source: ProcessError },
}
