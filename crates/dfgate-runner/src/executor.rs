use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::process::ProcessError;

/// One subprocess to run: program, arguments, and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I, cwd: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.to_path_buf(),
        }
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> ProcessError {
        ProcessError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Abstraction over subprocess execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run a command and capture stdout as UTF-8 text.
    async fn exec(&self, invocation: &Invocation) -> Result<String, ProcessError>;

    /// Run a command and capture stdout byte for byte.
    async fn exec_bytes(&self, invocation: &Invocation) -> Result<Vec<u8>, ProcessError>;

    /// Run a command, forwarding stdout line by line as it is produced.
    /// Output bytes are passed through unchanged; only the exit status matters.
    async fn exec_streaming(&self, invocation: &Invocation) -> Result<(), ProcessError>;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
    async fn exec(&self, invocation: &Invocation) -> Result<String, ProcessError> {
        (**self).exec(invocation).await
    }

    async fn exec_bytes(&self, invocation: &Invocation) -> Result<Vec<u8>, ProcessError> {
        (**self).exec_bytes(invocation).await
    }

    async fn exec_streaming(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        (**self).exec_streaming(invocation).await
    }
}

/// Real subprocess executor backed by `tokio::process`.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn exec(&self, invocation: &Invocation) -> Result<String, ProcessError> {
        let stdout = self.exec_bytes(invocation).await?;
        String::from_utf8(stdout).map_err(|e| ProcessError::InvalidUtf8 {
            program: invocation.program.clone(),
            source: e,
        })
    }

    async fn exec_bytes(&self, invocation: &Invocation) -> Result<Vec<u8>, ProcessError> {
        tracing::debug!(cwd = %invocation.cwd.display(), "exec: {invocation}");

        let output = invocation
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| invocation.spawn_error(e))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(ProcessError::CommandFailed {
                program: invocation.program.clone(),
                args: invocation.args.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
            })
        }
    }

    async fn exec_streaming(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        tracing::debug!(cwd = %invocation.cwd.display(), "exec (streaming): {invocation}");

        let mut child = invocation
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| invocation.spawn_error(e))?;

        let stream_error = |source| ProcessError::Stream {
            program: invocation.program.clone(),
            source,
        };

        let forwarded = match child.stdout.take() {
            Some(stdout) => forward_lines(stdout).await,
            None => Ok(()),
        };
        if let Err(source) = forwarded {
            // The child must not outlive a broken pipe; kill() also reaps it.
            child.kill().await.map_err(stream_error)?;
            return Err(stream_error(source));
        }

        let status = child.wait().await.map_err(stream_error)?;

        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::CommandFailed {
                program: invocation.program.clone(),
                args: invocation.args.clone(),
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}

/// Copy `reader` to stdout one raw line at a time, flushing after each.
async fn forward_lines<R>(reader: R) -> std::io::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    let mut reader = BufReader::new(reader);
    let mut out = tokio::io::stdout();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(());
        }
        out.write_all(&line).await?;
        out.flush().await?;
    }
}
