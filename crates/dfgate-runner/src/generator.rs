use std::path::{Path, PathBuf};

use dfgate_core::GateConfig;

use crate::executor::{CommandExecutor, Invocation, RealExecutor};
use crate::process::ProcessError;

/// How the generation routine should lay out its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Regenerate every Dockerfile under a directory.
    Dir,
}

impl GenerationMode {
    pub fn as_arg(self) -> &'static str {
        match self {
            GenerationMode::Dir => "dir",
        }
    }
}

/// Contract for the routine that regenerates Dockerfiles from templates.
///
/// Implementations must leave the complete, final Dockerfile tree for
/// `target_dir` on disk when they return `Ok`. The gate relies on nothing
/// else they do.
#[allow(async_fn_in_trait)]
pub trait DockerfileGenerator: Send + Sync {
    async fn generate(&self, mode: GenerationMode, target_dir: &Path) -> Result<(), GenerateError>;
}

/// Runs the repository's generation script as a subprocess:
/// `<interpreter> <script> dir -d<target_dir>`.
pub struct ScriptGenerator<E: CommandExecutor = RealExecutor> {
    executor: E,
    interpreter: String,
    script: PathBuf,
}

impl ScriptGenerator<RealExecutor> {
    pub fn from_config(config: &GateConfig) -> Self {
        Self::with_executor(
            RealExecutor,
            &config.tools.generator.interpreter,
            config.generator_script(),
        )
    }
}

impl<E: CommandExecutor> ScriptGenerator<E> {
    pub fn with_executor(executor: E, interpreter: &str, script: PathBuf) -> Self {
        Self {
            executor,
            interpreter: interpreter.to_owned(),
            script,
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

impl<E: CommandExecutor> DockerfileGenerator for ScriptGenerator<E> {
    async fn generate(&self, mode: GenerationMode, target_dir: &Path) -> Result<(), GenerateError> {
        if !self.script.is_file() {
            return Err(GenerateError::ScriptMissing {
                path: self.script.clone(),
            });
        }

        // Scripts resolve their templates relative to their own directory.
        // arch-lint: allow(no-silent-result-drop) reason="a script path always has a parent; fall back to the current directory"
        let cwd = self.script.parent().unwrap_or_else(|| Path::new("."));
        let invocation = Invocation::new(
            &self.interpreter,
            [
                self.script.display().to_string(),
                mode.as_arg().to_owned(),
                format!("-d{}", target_dir.display()),
            ],
            cwd,
        );
        tracing::info!(dir = %target_dir.display(), "generating Dockerfiles");

        self.executor
            .exec_streaming(&invocation)
            .await
            .map_err(|e| GenerateError::Process {
                script: self.script.clone(),
                source: e,
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation script not found at {path}")]
    ScriptMissing { path: PathBuf },

    #[error("generation script {script} failed")]
    Process {
        script: PathBuf,
        source: ProcessError,
    },
}
