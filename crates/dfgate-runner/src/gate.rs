use std::io::Write;
use std::path::PathBuf;

use dfgate_core::{CiMode, GateConfig};

use crate::build::{BuildError, BuildRunner};
use crate::executor::{CommandExecutor, RealExecutor};
use crate::generator::{DockerfileGenerator, GenerateError, GenerationMode, ScriptGenerator};
use crate::git::{GitClient, GitError, Patch};

/// What a successful gate run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    pub mode: CiMode,
    pub context_dir: PathBuf,
    pub build_ran: bool,
}

/// Regenerates Dockerfiles, rejects drift against the committed tree, and
/// runs the build test when the build context is affected.
///
/// Patch text for a failed diff check is written to `out` (stdout in
/// production) before the error is returned.
pub struct Gate<'a, G, E = RealExecutor, W = std::io::Stdout>
where
    G: DockerfileGenerator,
    E: CommandExecutor,
    W: Write,
{
    config: &'a GateConfig,
    generator: G,
    executor: E,
    out: W,
}

impl<'a> Gate<'a, ScriptGenerator<RealExecutor>> {
    pub fn new(config: &'a GateConfig) -> Self {
        Self::with_parts(
            config,
            ScriptGenerator::from_config(config),
            RealExecutor,
            std::io::stdout(),
        )
    }
}

impl<'a, G, E, W> Gate<'a, G, E, W>
where
    G: DockerfileGenerator,
    E: CommandExecutor,
    W: Write,
{
    pub fn with_parts(config: &'a GateConfig, generator: G, executor: E, out: W) -> Self {
        Self {
            config,
            generator,
            executor,
            out,
        }
    }

    /// Consume the gate and hand back its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    fn git(&self) -> GitClient<&E> {
        GitClient::with_executor(&self.executor, &self.config.tools.git.program)
    }

    /// Full gate: generate, enforce a clean tree, then build when needed.
    pub async fn run(&mut self) -> Result<GateReport, GateError> {
        let mode = self.config.ci.mode();
        let context_dir = self.config.context_dir();
        tracing::info!(%mode, context = %context_dir.display(), "starting Dockerfile gate");

        self.generate().await?;

        let build_ran = match &mode {
            CiMode::PullRequest { head_branch } => {
                self.enforce_clean_tree().await?;

                let path = self.config.coordinates.path_of_interest();
                let changed = self
                    .git()
                    .path_changed(&self.config.ci.build_dir, &self.config.ci.branch, &path)
                    .await
                    .map_err(|e| GateError::Git { source: e })?;

                if changed {
                    println!("{path} changed between {} and {head_branch}", self.config.ci.branch);
                    self.build().await?;
                    true
                } else {
                    println!("{path} unchanged; skipping build test");
                    false
                }
            }
            CiMode::Scheduled => {
                if let Err(e) = self.enforce_clean_tree().await {
                    // TODO: open a pull request with the regenerated files instead of failing.
                    tracing::error!(error = %e, "scheduled run found drift in generated Dockerfiles");
                    return Err(e);
                }
                self.build().await?;
                true
            }
        };

        Ok(GateReport {
            mode,
            context_dir,
            build_ran,
        })
    }

    /// Generation and diff check only.
    pub async fn check(&mut self) -> Result<(), GateError> {
        self.generate().await?;
        self.enforce_clean_tree().await
    }

    /// Build test only, against the configured context directory.
    pub async fn build(&self) -> Result<(), GateError> {
        let context_dir = self.config.context_dir();
        println!("Building {}...", context_dir.display());

        BuildRunner::with_executor(&self.executor, &self.config.tools.build)
            .build(&context_dir)
            .await
            .map_err(GateError::from_build)
    }

    async fn generate(&self) -> Result<(), GateError> {
        println!("Regenerating Dockerfiles...");
        self.generator
            .generate(GenerationMode::Dir, &self.config.context_dir())
            .await
            .map_err(|e| GateError::Generate { source: e })
    }

    /// Any uncommitted change after generation is fatal. Every patch is
    /// written out before the error is returned.
    async fn enforce_clean_tree(&mut self) -> Result<(), GateError> {
        let patches = self
            .git()
            .working_tree_diff(&self.config.ci.build_dir)
            .await
            .map_err(|e| GateError::Git { source: e })?;

        if patches.is_empty() {
            tracing::info!("generated files match committed files");
            return Ok(());
        }

        self.write_patches(&patches)
            .map_err(|e| GateError::Output { source: e })?;

        Err(GateError::StaleGeneratedFiles {
            paths: patches.into_iter().map(|p| p.path).collect(),
        })
    }

    fn write_patches(&mut self, patches: &[Patch]) -> std::io::Result<()> {
        for patch in patches {
            self.out.write_all(&patch.bytes)?;
            if !patch.bytes.ends_with(b"\n") {
                self.out.write_all(b"\n")?;
            }
        }
        self.out.flush()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Dockerfile generation failed")]
    Generate { source: GenerateError },

    #[error(
        "generated files differ from committed files: {}\n\
         Run the generator locally and commit the result.",
        paths.join(", ")
    )]
    StaleGeneratedFiles { paths: Vec<String> },

    #[error("git failed")]
    Git { source: GitError },

    #[error(
        "build test failed: {program} {args:?} exited with {}",
        code.map_or_else(|| "a signal".to_owned(), |c| format!("code {c}"))
    )]
    BuildFailed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
    },

    #[error("could not run build test")]
    Build { source: BuildError },

    #[error("failed to write diff output")]
    Output { source: std::io::Error },
}

impl GateError {
    fn from_build(e: BuildError) -> Self {
        match e {
            BuildError::Failed {
                program,
                args,
                code,
            } => GateError::BuildFailed {
                program,
                args,
                code,
            },
            other => GateError::Build { source: other },
        }
    }

    /// Process exit status for this error: the build's own exit code for a
    /// failed build test, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            GateError::BuildFailed {
                code: Some(c @ 1..=255),
                ..
            } => *c as u8,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_failed(code: Option<i32>) -> GateError {
        GateError::BuildFailed {
            program: "make".to_owned(),
            args: vec!["build".to_owned()],
            code,
        }
    }

    #[test]
    fn build_failure_propagates_exit_code() {
        assert_eq!(build_failed(Some(2)).exit_code(), 2);
        assert_eq!(build_failed(Some(255)).exit_code(), 255);
    }

    #[test]
    fn signal_or_out_of_range_code_exits_one() {
        assert_eq!(build_failed(None).exit_code(), 1);
        assert_eq!(build_failed(Some(300)).exit_code(), 1);
    }

    #[test]
    fn other_errors_exit_one() {
        let e = GateError::StaleGeneratedFiles {
            paths: vec!["ros/Dockerfile".to_owned()],
        };
        assert_eq!(e.exit_code(), 1);
        assert!(e.to_string().contains("ros/Dockerfile"));
    }

    #[test]
    fn build_failed_message_names_command_and_code() {
        let msg = build_failed(Some(2)).to_string();
        assert!(msg.contains("make"));
        assert!(msg.contains("build"));
        assert!(msg.contains("code 2"));
    }
}
