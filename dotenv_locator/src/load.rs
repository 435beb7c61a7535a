//! Handing resolved files to a dotenv parser.
//!
//! Parsing and injecting variables is left to the caller. Anything that can
//! consume a file path implements [`EnvFileParser`], including plain closures.

use std::path::{Path, PathBuf};

use crate::config::ResolverConfig;
use crate::error::LoadError;
use crate::resolve::Resolver;

/// Consumer of resolved dotenv files.
pub trait EnvFileParser {
    /// Error reported when a file cannot be parsed or applied.
    type Error: std::error::Error + 'static;

    /// Reads and applies the file at `path`.
    ///
    /// # Errors
    ///
    /// Implementations return their own error type; [`load_with`] wraps it
    /// with the offending path.
    fn parse_file(&mut self, path: &Path) -> Result<(), Self::Error>;
}

impl<F, E> EnvFileParser for F
where
    F: FnMut(&Path) -> Result<(), E>,
    E: std::error::Error + 'static,
{
    type Error = E;

    fn parse_file(&mut self, path: &Path) -> Result<(), E> {
        self(path)
    }
}

/// Resolves `config` and feeds each file to `parser` in order.
///
/// Returns the files that were handed over. An empty list is not an error;
/// callers that require at least one file should check it themselves.
///
/// # Errors
///
/// Stops at the first file the parser rejects and returns a [`LoadError`]
/// naming it.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use dotenv_locator::{ResolverConfig, load_with};
///
/// let mut seen = Vec::new();
/// let loaded = load_with(&ResolverConfig::default(), &mut |path: &Path| {
///     seen.push(std::fs::read_to_string(path)?);
///     Ok::<(), std::io::Error>(())
/// })?;
/// assert_eq!(loaded.len(), seen.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn load_with<P>(
    config: &ResolverConfig,
    parser: &mut P,
) -> Result<Vec<PathBuf>, LoadError<P::Error>>
where
    P: EnvFileParser + ?Sized,
{
    load_resolved(&Resolver::new(), config, parser)
}

/// Like [`load_with`] but resolves through `resolver`, which may carry
/// substitute root locators.
///
/// # Errors
///
/// Stops at the first file the parser rejects and returns a [`LoadError`]
/// naming it.
pub fn load_resolved<P>(
    resolver: &Resolver,
    config: &ResolverConfig,
    parser: &mut P,
) -> Result<Vec<PathBuf>, LoadError<P::Error>>
where
    P: EnvFileParser + ?Sized,
{
    let paths = resolver.resolve(config);
    for path in &paths {
        parser
            .parse_file(path)
            .map_err(|source| LoadError {
                path: path.clone(),
                source,
            })?;
    }
    Ok(paths)
}
