use std::path::{Path, PathBuf};

use serde::Serialize;

/// Identifies one Docker build context inside the build tree.
///
/// `os_name` and `os_code_name` may be empty, in which case they are left
/// out of every derived path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildCoordinates {
    pub repo: String,
    pub os_name: String,
    pub os_code_name: String,
    pub tag: String,
}

impl BuildCoordinates {
    fn segments(&self) -> impl Iterator<Item = &str> {
        [
            self.repo.as_str(),
            self.os_name.as_str(),
            self.os_code_name.as_str(),
            self.tag.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
    }

    /// `repo/os_name/os_code_name/tag`, relative to the build directory.
    /// Used as a git pathspec.
    pub fn path_of_interest(&self) -> String {
        self.segments().collect::<Vec<_>>().join("/")
    }

    /// Absolute Docker build context directory.
    pub fn context_dir(&self, build_dir: &Path) -> PathBuf {
        self.segments()
            .fold(build_dir.to_path_buf(), |acc, seg| acc.join(seg))
    }

    /// Directory holding the repository's generation script.
    pub fn repo_dir(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(&self.repo)
    }
}

/// Where and why the CI run is happening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CiContext {
    /// Branch being built, or the PR target branch.
    pub branch: String,
    /// PR source branch; empty for scheduled runs.
    pub pull_request_branch: String,
    /// Checked-out repository root.
    pub build_dir: PathBuf,
}

impl CiContext {
    pub fn mode(&self) -> CiMode {
        if self.pull_request_branch.is_empty() {
            CiMode::Scheduled
        } else {
            CiMode::PullRequest {
                head_branch: self.pull_request_branch.clone(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CiMode {
    PullRequest { head_branch: String },
    Scheduled,
}

impl std::fmt::Display for CiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CiMode::PullRequest { head_branch } => write!(f, "pull request ({head_branch})"),
            CiMode::Scheduled => f.write_str("scheduled"),
        }
    }
}
