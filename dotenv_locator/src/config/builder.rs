//! Builder for [`ResolverConfig`].

use std::path::PathBuf;
use std::time::Duration;

use super::{ProjectTool, ResolverConfig};

/// Builder for [`ResolverConfig`].
///
/// Starts from the defaults. The first call to [`Self::search_dir`] replaces
/// the implicit `./` entry rather than appending after it.
///
/// # Examples
///
/// ```rust
/// use dotenv_locator::ResolverConfig;
///
/// let config = ResolverConfig::builder()
///     .filename(".env.test")
///     .search_dir("config")
///     .consult_vcs_root(true)
///     .build();
/// assert_eq!(config.filenames, vec![".env.test".to_owned()]);
/// assert_eq!(config.search_dirs, vec![std::path::PathBuf::from("config")]);
/// ```
#[derive(Debug, Clone)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
    search_dirs_customised: bool,
}

impl ResolverConfigBuilder {
    /// Creates a builder initialised with [`ResolverConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
            search_dirs_customised: false,
        }
    }

    /// Appends a filename to search for.
    #[must_use]
    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.config.filenames.push(name.into());
        self
    }

    /// Replaces the filenames searched for.
    #[must_use]
    pub fn filenames<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.filenames = names.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a search directory.
    #[must_use]
    pub fn search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        if !self.search_dirs_customised {
            self.config.search_dirs.clear();
            self.search_dirs_customised = true;
        }
        self.config.search_dirs.push(dir.into());
        self
    }

    /// Replaces the search directories.
    #[must_use]
    pub fn search_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.search_dirs = dirs.into_iter().map(Into::into).collect();
        self.search_dirs_customised = true;
        self
    }

    /// Removes every search directory, including the default `./`.
    ///
    /// An empty list still searches `./` at resolution time.
    #[must_use]
    pub fn clear_search_dirs(mut self) -> Self {
        self.config.search_dirs.clear();
        self.search_dirs_customised = true;
        self
    }

    /// Toggles searching the git working-tree root.
    #[must_use]
    pub const fn consult_vcs_root(mut self, enabled: bool) -> Self {
        self.config.consult_vcs_root = enabled;
        self
    }

    /// Toggles searching the project-manifest root.
    #[must_use]
    pub const fn consult_project_root(mut self, enabled: bool) -> Self {
        self.config.consult_project_root = enabled;
        self
    }

    /// Chooses the build tool asked for the project root.
    #[must_use]
    pub const fn project_tool(mut self, tool: ProjectTool) -> Self {
        self.config.project_tool = tool;
        self
    }

    /// Sets the reserved filename-expansion flag.
    #[must_use]
    pub const fn disable_filename_expansion(mut self, disabled: bool) -> Self {
        self.config.disable_filename_expansion = disabled;
        self
    }

    /// Sets the reserved directory-expansion flag.
    #[must_use]
    pub const fn disable_dir_expansion(mut self, disabled: bool) -> Self {
        self.config.disable_dir_expansion = disabled;
        self
    }

    /// Toggles diagnostic logging.
    #[must_use]
    pub const fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Bounds how long each root probe may run.
    #[must_use]
    pub const fn probe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    /// Finalises the builder.
    #[must_use]
    pub fn build(self) -> ResolverConfig {
        self.config
    }
}

impl Default for ResolverConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
