use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::{BuildCoordinates, CiContext};

/// Name of the optional tool configuration file at the build directory root.
pub const CONFIG_FILE_NAME: &str = "dfgate.toml";

pub const ENV_REPO: &str = "REPO";
pub const ENV_TAG: &str = "TAG";
pub const ENV_OS_NAME: &str = "OS_NAME";
pub const ENV_OS_CODE_NAME: &str = "OS_CODE_NAME";
pub const ENV_BRANCH: &str = "TRAVIS_BRANCH";
pub const ENV_PULL_REQUEST_BRANCH: &str = "TRAVIS_PULL_REQUEST_BRANCH";
pub const ENV_BUILD_DIR: &str = "TRAVIS_BUILD_DIR";

/// Everything the gate needs, resolved once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct GateConfig {
    pub coordinates: BuildCoordinates,
    pub ci: CiContext,
    pub tools: ToolsConfig,
}

/// dfgate.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub build: BuildToolConfig,
    #[serde(default)]
    pub git: GitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Generation script, relative to `<build_dir>/<repo>`
    #[serde(default = "default_generator_script")]
    pub script: PathBuf,
    /// Program used to run the script
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildToolConfig {
    #[serde(default = "default_build_program")]
    pub program: String,
    #[serde(default = "default_build_args")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_git_program")]
    pub program: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            script: default_generator_script(),
            interpreter: default_interpreter(),
        }
    }
}

impl Default for BuildToolConfig {
    fn default() -> Self {
        Self {
            program: default_build_program(),
            args: default_build_args(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: default_git_program(),
        }
    }
}

impl ToolsConfig {
    /// Load from dfgate.toml in the given directory, or return defaults if not found.
    pub fn load(build_dir: &Path) -> crate::Result<Self> {
        let config_path = build_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load_file(&config_path)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_file(config_path: &Path) -> crate::Result<Self> {
        let content =
            std::fs::read_to_string(config_path).map_err(|e| crate::Error::ConfigLoad {
                path: config_path.to_path_buf(),
                source: e,
            })?;
        toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
            path: config_path.to_path_buf(),
            source: e,
        })
    }
}

impl GateConfig {
    /// Resolve configuration from the process environment.
    ///
    /// `config_path` overrides the default `<TRAVIS_BUILD_DIR>/dfgate.toml`.
    pub fn from_env(config_path: Option<&Path>) -> crate::Result<Self> {
        Self::from_lookup(
            |key| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned()),
            config_path,
        )
    }

    /// Resolve configuration through an arbitrary variable lookup.
    ///
    /// Every required variable is checked before anything else is read, and
    /// all absent names are reported together. Set-but-empty counts as set.
    pub fn from_lookup<F>(lookup: F, config_path: Option<&Path>) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = [
            ENV_REPO,
            ENV_TAG,
            ENV_BRANCH,
            ENV_PULL_REQUEST_BRANCH,
            ENV_BUILD_DIR,
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .copied()
            .filter(|key| lookup(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(crate::Error::MissingEnv { names: missing });
        }

        // arch-lint: allow(no-silent-result-drop) reason="optional OS_NAME/OS_CODE_NAME default to empty per spec"
        let var = |key: &str| lookup(key).unwrap_or_default();

        let coordinates = BuildCoordinates {
            repo: var(ENV_REPO),
            os_name: var(ENV_OS_NAME),
            os_code_name: var(ENV_OS_CODE_NAME),
            tag: var(ENV_TAG),
        };
        let ci = CiContext {
            branch: var(ENV_BRANCH),
            pull_request_branch: var(ENV_PULL_REQUEST_BRANCH),
            build_dir: PathBuf::from(var(ENV_BUILD_DIR)),
        };

        let tools = match config_path {
            Some(path) => ToolsConfig::load_file(path)?,
            None => ToolsConfig::load(&ci.build_dir)?,
        };

        Ok(Self {
            coordinates,
            ci,
            tools,
        })
    }

    pub fn context_dir(&self) -> PathBuf {
        self.coordinates.context_dir(&self.ci.build_dir)
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.coordinates.repo_dir(&self.ci.build_dir)
    }

    /// Absolute path of the generation script.
    pub fn generator_script(&self) -> PathBuf {
        self.repo_dir().join(&self.tools.generator.script)
    }
}

fn default_generator_script() -> PathBuf {
    PathBuf::from("create_dockerfiles.py")
}

fn default_interpreter() -> String {
    "python3".to_owned()
}

fn default_build_program() -> String {
    "make".to_owned()
}

fn default_build_args() -> Vec<String> {
    vec!["build".to_owned()]
}

fn default_git_program() -> String {
    "git".to_owned()
}
