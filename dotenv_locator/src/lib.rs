//! Locates dotenv files for a process.
//!
//! A [`ResolverConfig`] lists the filenames to look for and where to look:
//! explicit search directories, the top-level directory of the enclosing git
//! working tree, and the directory holding the project manifest. [`resolve`]
//! turns it into the existing files, as absolute paths, in search order and
//! without duplicates. Reading those files is left to the caller, either
//! directly or through [`load_with`].
//!
//! ```rust,no_run
//! use dotenv_locator::{ResolverConfig, resolve};
//!
//! let config = ResolverConfig::builder()
//!     .filenames([".env", ".env.local"])
//!     .consult_vcs_root(true)
//!     .debug(true)
//!     .build();
//! let files = resolve(&config);
//! ```
//!
//! Root probes are best effort. When `git` or the build tool is missing, or
//! the process is not inside a repository or project, that location is
//! skipped; resolution itself never fails.

pub mod config;
mod error;
mod list_env;
mod load;
mod resolve;
pub mod root;

pub use config::{ProjectTool, ResolverConfig, ResolverConfigBuilder};
pub use error::{ConfigError, LoadError, ProbeError};
pub use list_env::ListEnv;
pub use load::{EnvFileParser, load_resolved, load_with};
pub use resolve::{Resolver, resolve};
pub use root::RootLocator;
