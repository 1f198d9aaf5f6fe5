use std::borrow::Cow;
use std::path::Path;

use crate::executor::{CommandExecutor, Invocation, RealExecutor};
use crate::process::ProcessError;

const DIFF_HEADER: &[u8] = b"diff --git ";

/// One file's block of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Post-image path from the `diff --git` header.
    pub path: String,
    /// Full block, header included, exactly as git printed it.
    pub bytes: Vec<u8>,
}

impl Patch {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Git operations needed by the gate, parameterized over the executor for testability.
pub struct GitClient<E: CommandExecutor = RealExecutor> {
    executor: E,
    program: String,
}

impl GitClient<RealExecutor> {
    pub fn new() -> Self {
        Self::with_executor(RealExecutor, "git")
    }
}

impl Default for GitClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> GitClient<E> {
    pub fn with_executor(executor: E, program: &str) -> Self {
        Self {
            executor,
            program: program.to_owned(),
        }
    }

    /// Uncommitted changes in the working tree relative to the index.
    pub async fn working_tree_diff(&self, repo_dir: &Path) -> Result<Vec<Patch>, GitError> {
        // Fixed prefixes keep the header parseable whatever diff.noprefix says.
        let invocation = Invocation::new(
            &self.program,
            [
                "diff",
                "--no-color",
                "--no-ext-diff",
                "--src-prefix=a/",
                "--dst-prefix=b/",
            ],
            repo_dir,
        );
        let out = self
            .executor
            .exec_bytes(&invocation)
            .await
            .map_err(|e| GitError::WorkingTreeDiff { source: e })?;
        Ok(split_patches(&out))
    }

    /// Whether anything under `path` differs between `base_ref` and `HEAD`.
    pub async fn path_changed(
        &self,
        repo_dir: &Path,
        base_ref: &str,
        path: &str,
    ) -> Result<bool, GitError> {
        let invocation = Invocation::new(
            &self.program,
            ["diff", "--name-only", base_ref, "HEAD", "--", path],
            repo_dir,
        );
        let out = self
            .executor
            .exec(&invocation)
            .await
            .map_err(|e| GitError::CommitDiff {
                base_ref: base_ref.to_owned(),
                source: e,
            })?;
        Ok(out.lines().any(|line| !line.trim().is_empty()))
    }
}

/// Split `git diff` output into one [`Patch`] per file.
///
/// Anything before the first `diff --git` header is dropped. Content bytes
/// are kept verbatim, so files in any encoding survive the split.
pub fn split_patches(diff: &[u8]) -> Vec<Patch> {
    let mut patches = Vec::new();
    let mut current: Option<Patch> = None;

    for line in diff.split_inclusive(|b| *b == b'\n') {
        if let Some(header) = line.strip_prefix(DIFF_HEADER) {
            if let Some(done) = current.take() {
                patches.push(done);
            }
            current = Some(Patch {
                path: header_path(String::from_utf8_lossy(header).trim_end()),
                bytes: Vec::new(),
            });
        }
        if let Some(patch) = current.as_mut() {
            patch.bytes.extend_from_slice(line);
        }
    }

    patches.extend(current);
    patches
}

/// `a/old b/new` → `new`
fn header_path(header: &str) -> String {
    match header.rsplit_once(" b/") {
        Some((_, path)) => path.to_owned(),
        None => header.to_owned(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to diff working tree against index")]
    WorkingTreeDiff { source: ProcessError },

    #[error("failed to diff {base_ref} against HEAD")]
    CommitDiff {
        base_ref: String,
        source: ProcessError,
    },
}
