//! Regeneration check and build test for Dockerfile trees.
//!
//! # Gate pipeline
//!
//! ```text
//! dfgate run
//!   1. Generate    ── <interpreter> create_dockerfiles.py dir -d<context_dir>
//!   2. Diff policy ── git diff (working tree vs index) must be empty
//!   3. PR run      ── git diff --name-only <TRAVIS_BRANCH> HEAD -- <path of interest>
//!                     non-empty → make build in <context_dir>
//!      Cron run    ── make build in <context_dir>, always
//! ```
//!
//! Every subprocess goes through [`CommandExecutor`], so the whole pipeline
//! can be driven by a mock in tests.

pub mod build;
pub mod executor;
pub mod gate;
pub mod generator;
pub mod git;
pub mod process;

pub use build::{BuildError, BuildRunner};
pub use executor::{CommandExecutor, Invocation, RealExecutor};
pub use gate::{Gate, GateError, GateReport};
pub use generator::{DockerfileGenerator, GenerateError, GenerationMode, ScriptGenerator};
pub use git::{GitClient, GitError, Patch};
pub use process::ProcessError;
