//! Error types produced while probing for roots, reading configuration and
//! handing resolved files to a parser.
//!
//! None of these escape [`crate::resolve`]: probe failures are logged and
//! collapsed into an empty contribution at the locator boundary.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Failure modes of an external root probe such as `git rev-parse`.
///
/// Root locators never surface these to callers of the resolver; they exist so
/// the probe can be tested directly and so `tracing` output names the reason a
/// root was not found.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProbeError {
    /// The executable could not be started, typically because it is not on
    /// `PATH`.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error from the operating system.
        #[source]
        source: std::io::Error,
    },

    /// Waiting on or collecting output from the child failed.
    #[error("failed to collect output from `{program}`: {source}")]
    Wait {
        /// Program whose output could not be read.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The program ran but reported failure.
    #[error("`{program}` exited with {status}")]
    Exit {
        /// Program that failed.
        program: String,
        /// Exit status reported by the child.
        status: ExitStatus,
    },

    /// The program did not finish within the configured timeout and was
    /// killed.
    #[error("`{program}` did not finish within {timeout:?}")]
    TimedOut {
        /// Program that was terminated.
        program: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The program succeeded but printed nothing usable.
    #[error("`{program}` produced no output")]
    EmptyOutput {
        /// Program with empty output.
        program: String,
    },

    /// The build tool reported that no manifest applies to the working
    /// directory.
    #[error("`{program}` reported no project manifest")]
    NoManifest {
        /// Program that was asked for the manifest.
        program: String,
    },
}

/// Errors raised while extracting a [`crate::ResolverConfig`] from
/// configuration providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A provider value could not be deserialised into the configuration.
    #[error("Failed to gather resolver configuration: {0}")]
    Gathering(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Gathering(Box::new(err))
    }
}

/// Error returned by [`crate::load_with`] when the downstream parser rejects
/// a resolved file.
#[derive(Debug, Error)]
#[error("failed to load dotenv file '{}': {source}", path.display())]
pub struct LoadError<E>
where
    E: std::error::Error + 'static,
{
    /// File the parser was handling when it failed.
    pub path: PathBuf,
    /// Error reported by the parser.
    #[source]
    pub source: E,
}
