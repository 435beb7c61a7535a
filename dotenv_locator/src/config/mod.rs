//! Search configuration consumed by the resolver.
//!
//! A [`ResolverConfig`] names the dotenv files to look for, the directories to
//! search and which root probes to consult. It is plain data: build one per
//! resolution, hand it to [`crate::resolve`] by reference, then drop it.

use std::path::PathBuf;
use std::time::Duration;

use figment::Figment;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::list_env::ListEnv;
use crate::root::{CargoRootLocator, GoModRootLocator, RootLocator};

mod builder;

pub use builder::ResolverConfigBuilder;

/// Basename searched for when no filenames are configured.
pub const DEFAULT_FILENAME: &str = ".env";

/// Directory searched when no search directories are configured.
pub const DEFAULT_SEARCH_DIR: &str = "./";

/// Prefix used by [`ResolverConfig::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "DOTENV_";

/// Build tool asked for the project-manifest root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ProjectTool {
    /// `go env GOMOD`; the root is the directory holding `go.mod`.
    #[default]
    Go,
    /// `cargo locate-project`; the root is the directory holding the nearest
    /// `Cargo.toml`.
    Cargo,
}

impl ProjectTool {
    /// Returns the locator that asks this tool, bounded by `timeout`.
    #[must_use]
    pub fn locator(self, timeout: Option<Duration>) -> Box<dyn RootLocator> {
        match self {
            Self::Go => Box::new(GoModRootLocator::new().timeout(timeout)),
            Self::Cargo => Box::new(CargoRootLocator::new().timeout(timeout)),
        }
    }
}

/// Where and what to search for.
///
/// `disable_filename_expansion` and `disable_dir_expansion` are accepted so
/// configuration written for an expanding resolver (one that also tries
/// variants such as `.env.${ENVIRONMENT}`) still loads, but no expansion is
/// performed and the flags have no effect.
///
/// # Examples
///
/// ```rust
/// use dotenv_locator::ResolverConfig;
///
/// let config = ResolverConfig::default();
/// assert_eq!(config.filenames_or_default(), vec![".env".to_owned()]);
/// assert_eq!(config.search_dirs_or_default(), vec![std::path::PathBuf::from("./")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Dotenv basenames, or absolute paths, in search order.
    pub filenames: Vec<String>,
    /// Directories searched in order for each filename.
    pub search_dirs: Vec<PathBuf>,
    /// Also search the top-level directory of the enclosing git working tree.
    pub consult_vcs_root: bool,
    /// Also search the directory holding the project manifest.
    pub consult_project_root: bool,
    /// Build tool asked for the project manifest.
    pub project_tool: ProjectTool,
    /// Reserved; currently has no effect.
    pub disable_filename_expansion: bool,
    /// Reserved; currently has no effect.
    pub disable_dir_expansion: bool,
    /// Log the candidate filenames and resolved paths.
    pub debug: bool,
    /// Upper bound on how long a root probe may run. `None` waits for the
    /// tool indefinitely.
    #[serde(rename = "probe_timeout_ms", deserialize_with = "millis")]
    pub probe_timeout: Option<Duration>,
}

fn millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            filenames: Vec::new(),
            search_dirs: vec![PathBuf::from(DEFAULT_SEARCH_DIR)],
            consult_vcs_root: false,
            consult_project_root: false,
            project_tool: ProjectTool::default(),
            disable_filename_expansion: false,
            disable_dir_expansion: false,
            debug: false,
            probe_timeout: None,
        }
    }
}

impl ResolverConfig {
    /// Creates the default configuration: `.env` in the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder starting from the default configuration.
    #[must_use]
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::new()
    }

    /// Returns the configured filenames, or `[".env"]` when none are set.
    #[must_use]
    pub fn filenames_or_default(&self) -> Vec<String> {
        if self.filenames.is_empty() {
            return vec![DEFAULT_FILENAME.to_owned()];
        }
        self.filenames.clone()
    }

    /// Returns the configured search directories, or `["./"]` when none are
    /// set.
    #[must_use]
    pub fn search_dirs_or_default(&self) -> Vec<PathBuf> {
        if self.search_dirs.is_empty() {
            return vec![PathBuf::from(DEFAULT_SEARCH_DIR)];
        }
        self.search_dirs.clone()
    }

    /// Reads the configuration from `DOTENV_*` environment variables.
    ///
    /// | variable | field |
    /// |---|---|
    /// | `DOTENV_FILENAMES` | comma-separated `filenames` |
    /// | `DOTENV_SEARCH_DIRS` | `search_dirs`, separated like `PATH` |
    /// | `DOTENV_CONSULT_VCS_ROOT` | `consult_vcs_root` |
    /// | `DOTENV_CONSULT_PROJECT_ROOT` | `consult_project_root` |
    /// | `DOTENV_PROJECT_TOOL` | `project_tool` (`go` or `cargo`) |
    /// | `DOTENV_DISABLE_FILENAME_EXPANSION` | `disable_filename_expansion` |
    /// | `DOTENV_DISABLE_DIR_EXPANSION` | `disable_dir_expansion` |
    /// | `DOTENV_DEBUG` | `debug` |
    /// | `DOTENV_PROBE_TIMEOUT_MS` | `probe_timeout` in milliseconds |
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Gathering`] when a variable holds a value of the
    /// wrong type, such as `DOTENV_DEBUG=maybe`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_prefixed(DEFAULT_ENV_PREFIX)
    }

    /// Like [`Self::from_env`] with a caller-chosen variable prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Gathering`] when a variable cannot be
    /// deserialised.
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, ConfigError> {
        let provider = ListEnv::prefixed(prefix)
            .comma_list("filenames")
            .path_list("search_dirs");
        Ok(Figment::from(provider).extract()?)
    }
}
