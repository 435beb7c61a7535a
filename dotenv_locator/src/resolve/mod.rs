//! Turning a [`ResolverConfig`] into an ordered list of existing dotenv files.
//!
//! For every candidate filename the resolver tries each search directory in
//! turn, then the git working-tree root, then the project root. Every hit is
//! kept, not only the first. Absolute filenames skip the search entirely and
//! are recorded once. Only regular files (or symlinks to them) count, so a
//! filename that names a directory is never returned. Recorded paths are made
//! absolute against the current directory and de-duplicated, and a final
//! check drops anything that vanished in the meantime.

use std::cell::OnceCell;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;

use crate::config::ResolverConfig;
use crate::root::{GitRootLocator, RootLocator};

/// Resolves dotenv files, optionally with substitute root locators.
///
/// Without overrides the VCS root comes from `git` and the project root from
/// the tool named by [`ResolverConfig::project_tool`]. Each locator runs at
/// most once per [`Resolver::resolve`] call and only when its flag is set;
/// nothing is cached between calls.
///
/// # Examples
///
/// ```rust
/// use std::path::PathBuf;
/// use dotenv_locator::{Resolver, ResolverConfig};
///
/// let resolver = Resolver::new().with_vcs_locator(|| Some(PathBuf::from("/nowhere")));
/// let config = ResolverConfig::builder()
///     .filename("definitely-missing.env")
///     .consult_vcs_root(true)
///     .build();
/// assert!(resolver.resolve(&config).is_empty());
/// ```
#[derive(Default)]
pub struct Resolver {
    vcs: Option<Box<dyn RootLocator>>,
    project: Option<Box<dyn RootLocator>>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("custom_vcs_locator", &self.vcs.is_some())
            .field("custom_project_locator", &self.project.is_some())
            .finish()
    }
}

impl Resolver {
    /// Creates a resolver that uses the external tools.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the git probe.
    #[must_use]
    pub fn with_vcs_locator(mut self, locator: impl RootLocator + 'static) -> Self {
        self.vcs = Some(Box::new(locator));
        self
    }

    /// Replaces the project-manifest probe.
    #[must_use]
    pub fn with_project_locator(mut self, locator: impl RootLocator + 'static) -> Self {
        self.project = Some(Box::new(locator));
        self
    }

    fn locate_vcs_root(&self, config: &ResolverConfig) -> Option<PathBuf> {
        match &self.vcs {
            Some(locator) => locator.locate(),
            None => GitRootLocator::new()
                .timeout(config.probe_timeout)
                .locate(),
        }
    }

    fn locate_project_root(&self, config: &ResolverConfig) -> Option<PathBuf> {
        match &self.project {
            Some(locator) => locator.locate(),
            None => config
                .project_tool
                .locator(config.probe_timeout)
                .locate(),
        }
    }

    /// Returns the existing dotenv files named by `config`, as absolute paths
    /// in search order without duplicates.
    ///
    /// Never fails: a root that cannot be located contributes nothing, and an
    /// empty list simply means no file was found. A relative candidate is
    /// skipped, with a debug log, if the current directory cannot be read.
    #[must_use]
    pub fn resolve(&self, config: &ResolverConfig) -> Vec<PathBuf> {
        let files = config.filenames_or_default();
        if config.debug {
            tracing::info!(files = ?files, "[dotenv] files to parse");
        }

        let search_dirs = config.search_dirs_or_default();
        let vcs_root = OnceCell::new();
        let project_root = OnceCell::new();
        let mut found = FoundFiles::default();

        for file in &files {
            let name = Path::new(file);
            if name.is_absolute() {
                found.push(name.to_path_buf());
                continue;
            }

            for dir in &search_dirs {
                found.push_existing(dir.join(name));
            }

            if config.consult_vcs_root
                && let Some(root) = vcs_root.get_or_init(|| self.locate_vcs_root(config))
            {
                found.push_existing(root.join(name));
            }

            if config.consult_project_root
                && let Some(root) = project_root.get_or_init(|| self.locate_project_root(config))
            {
                found.push_existing(root.join(name));
            }
        }

        let paths = found.into_existing();
        if config.debug {
            tracing::info!(paths = ?paths, "[dotenv] resolved files");
        }
        paths
    }

    /// Like [`Self::resolve`] but returns [`Utf8PathBuf`] values, omitting
    /// paths that are not valid UTF-8.
    #[must_use]
    pub fn resolve_utf8(&self, config: &ResolverConfig) -> Vec<Utf8PathBuf> {
        self.resolve(config)
            .into_iter()
            .filter_map(|path| Utf8PathBuf::from_path_buf(path).ok())
            .collect()
    }
}

/// Resolves `config` with the default locators.
///
/// # Examples
///
/// ```rust,no_run
/// use dotenv_locator::{ResolverConfig, resolve};
///
/// let config = ResolverConfig::builder()
///     .filenames([".env", ".env.local"])
///     .consult_vcs_root(true)
///     .build();
/// for path in resolve(&config) {
///     println!("{}", path.display());
/// }
/// ```
#[must_use]
pub fn resolve(config: &ResolverConfig) -> Vec<PathBuf> {
    Resolver::new().resolve(config)
}

/// Accumulates absolute paths in first-seen order.
#[derive(Debug, Default)]
struct FoundFiles {
    paths: Vec<PathBuf>,
    seen: HashSet<String>,
}

impl FoundFiles {
    fn push_existing(&mut self, candidate: PathBuf) {
        if candidate.is_file() {
            self.push(candidate);
        }
    }

    fn push(&mut self, candidate: PathBuf) {
        if candidate.as_os_str().is_empty() {
            return;
        }
        let Some(absolute) = absolutise(&candidate) else {
            return;
        };
        if self.seen.insert(normalised_key(&absolute)) {
            self.paths.push(absolute);
        }
    }

    fn into_existing(self) -> Vec<PathBuf> {
        self.paths.into_iter().filter(|path| path.is_file()).collect()
    }
}

/// Anchors relative paths at the current directory and drops `.` components.
/// Symlinks and `..` are left alone.
fn absolutise(path: &Path) -> Option<PathBuf> {
    std::path::absolute(path)
        .inspect_err(|err| {
            tracing::debug!(
                path = %path.display(),
                error = %err,
                "cannot anchor relative dotenv path"
            );
        })
        .ok()
}

/// Key used to detect duplicates. Windows compares paths case-insensitively
/// and accepts either separator.
fn normalised_key(path: &Path) -> String {
    #[cfg(windows)]
    {
        path.to_string_lossy().to_lowercase().replace('/', "\\")
    }

    #[cfg(not(windows))]
    {
        path.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests;
