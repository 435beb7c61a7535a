//! Best-effort probes for the version-control root and the project root.
//!
//! Each locator shells out to a tool that may or may not be installed. A
//! missing executable, a failing command and an unusable answer all collapse
//! into `None`; the reason is only visible in `tracing` output at debug level.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ProbeError;

mod probe;

pub use probe::ProbeCommand;

/// Something that can name a directory to search, or report that it has none.
///
/// Implemented for closures so callers can substitute their own probes:
///
/// ```rust
/// use std::path::PathBuf;
/// use dotenv_locator::root::RootLocator;
///
/// let fixed = || Some(PathBuf::from("/srv/app"));
/// assert_eq!(fixed.locate(), Some(PathBuf::from("/srv/app")));
/// ```
pub trait RootLocator {
    /// Returns the located directory, or `None` when it cannot be determined.
    fn locate(&self) -> Option<PathBuf>;
}

impl<F> RootLocator for F
where
    F: Fn() -> Option<PathBuf>,
{
    fn locate(&self) -> Option<PathBuf> {
        self()
    }
}

fn log_miss(err: &ProbeError) {
    tracing::debug!(error = %err, "root probe found nothing");
}

/// Strips one trailing line terminator (`\n` or `\r\n`) and rejects empty
/// answers.
fn trimmed_answer<'a>(program: &str, stdout: &'a str) -> Result<&'a str, ProbeError> {
    let line = stdout
        .strip_suffix('\n')
        .map_or(stdout, |rest| rest.strip_suffix('\r').unwrap_or(rest));
    if line.trim().is_empty() {
        return Err(ProbeError::EmptyOutput {
            program: program.to_owned(),
        });
    }
    Ok(line)
}

/// Interprets build-tool output naming a manifest file and returns the
/// directory containing it.
fn manifest_parent(program: &str, stdout: &str) -> Result<PathBuf, ProbeError> {
    let manifest = trimmed_answer(program, stdout)?.trim();
    if is_null_device(manifest) {
        return Err(ProbeError::NoManifest {
            program: program.to_owned(),
        });
    }
    Path::new(manifest)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| ProbeError::NoManifest {
            program: program.to_owned(),
        })
}

fn is_null_device(path: &str) -> bool {
    path == "/dev/null" || path.eq_ignore_ascii_case("NUL")
}

/// Finds the top-level directory of the enclosing git working tree via
/// `git rev-parse --show-toplevel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRootLocator {
    probe: ProbeCommand,
}

impl GitRootLocator {
    /// Creates a locator that asks the `git` found on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: ProbeCommand::new("git").args(["rev-parse", "--show-toplevel"]),
        }
    }

    /// Limits how long `git` may run.
    #[must_use]
    pub fn timeout(self, timeout: Option<Duration>) -> Self {
        Self {
            probe: self.probe.timeout(timeout),
        }
    }

    /// Asks about the working tree containing `dir` rather than the current
    /// directory.
    #[must_use]
    pub fn in_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            probe: self.probe.current_dir(dir),
        }
    }

    /// Runs the probe and reports why it failed, if it did.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when `git` is unavailable, the directory is
    /// not inside a working tree, or the output is empty.
    pub fn probe(&self) -> Result<PathBuf, ProbeError> {
        let stdout = self.probe.run()?;
        trimmed_answer(self.probe.program(), &stdout).map(PathBuf::from)
    }
}

impl Default for GitRootLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl RootLocator for GitRootLocator {
    fn locate(&self) -> Option<PathBuf> {
        self.probe().inspect_err(log_miss).ok()
    }
}

/// Finds the directory containing the active Go module's `go.mod` via
/// `go env GOMOD`.
///
/// Outside a module `go` prints an empty line, or the null device when
/// modules are forced on; both mean "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModRootLocator {
    probe: ProbeCommand,
}

impl GoModRootLocator {
    /// Creates a locator that asks the `go` found on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: ProbeCommand::new("go").args(["env", "GOMOD"]),
        }
    }

    /// Limits how long `go` may run.
    #[must_use]
    pub fn timeout(self, timeout: Option<Duration>) -> Self {
        Self {
            probe: self.probe.timeout(timeout),
        }
    }

    /// Asks about the module containing `dir`.
    #[must_use]
    pub fn in_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            probe: self.probe.current_dir(dir),
        }
    }

    /// Runs the probe and reports why it failed, if it did.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when `go` is unavailable or no module applies.
    pub fn probe(&self) -> Result<PathBuf, ProbeError> {
        let stdout = self.probe.run()?;
        manifest_parent(self.probe.program(), &stdout)
    }
}

impl Default for GoModRootLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl RootLocator for GoModRootLocator {
    fn locate(&self) -> Option<PathBuf> {
        self.probe().inspect_err(log_miss).ok()
    }
}

/// Finds the directory containing the nearest `Cargo.toml` via
/// `cargo locate-project --message-format plain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoRootLocator {
    probe: ProbeCommand,
}

impl CargoRootLocator {
    /// Creates a locator that asks the `cargo` found on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: ProbeCommand::new("cargo").args([
                "locate-project",
                "--message-format",
                "plain",
            ]),
        }
    }

    /// Limits how long `cargo` may run.
    #[must_use]
    pub fn timeout(self, timeout: Option<Duration>) -> Self {
        Self {
            probe: self.probe.timeout(timeout),
        }
    }

    /// Asks about the package containing `dir`.
    #[must_use]
    pub fn in_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            probe: self.probe.current_dir(dir),
        }
    }

    /// Runs the probe and reports why it failed, if it did.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when `cargo` is unavailable or no manifest is
    /// found.
    pub fn probe(&self) -> Result<PathBuf, ProbeError> {
        let stdout = self.probe.run()?;
        manifest_parent(self.probe.program(), &stdout)
    }
}

impl Default for CargoRootLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl RootLocator for CargoRootLocator {
    fn locate(&self) -> Option<PathBuf> {
        self.probe().inspect_err(log_miss).ok()
    }
}
