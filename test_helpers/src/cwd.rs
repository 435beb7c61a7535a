//! Changing the process working directory for the duration of a test.
//!
//! Relative search directories such as the default `./` resolve against the
//! working directory, so tests that exercise them must move into a scratch
//! directory. The guard holds a global mutex so only one test at a time does
//! this, and moves back when dropped.
//!
//! # Examples
//!
//! ```no_run
//! use test_helpers::cwd;
//!
//! let scratch = std::env::temp_dir();
//! let guard = cwd::set_dir(&scratch).expect("enter scratch directory");
//! // `./.env` now refers to a file in the scratch directory.
//! drop(guard);
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use parking_lot::{Mutex, MutexGuard};

static CWD_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

/// Guard that returns to the previous working directory on drop.
#[must_use = "dropping restores the prior working directory"]
pub struct CwdGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl CwdGuard {
    /// Directory that will be restored.
    #[must_use]
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        // Nothing useful can be done with a failure while unwinding.
        let _restored = std::env::set_current_dir(&self.original);
    }
}

/// Moves the process into `path` until the returned guard is dropped.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read or `path` cannot
/// be entered. The working directory is unchanged in both cases.
pub fn set_dir(path: impl AsRef<Path>) -> Result<CwdGuard> {
    let lock = CWD_MUTEX.lock();
    let original = std::env::current_dir().context("read current dir")?;
    std::env::set_current_dir(path.as_ref())
        .with_context(|| format!("enter {}", path.as_ref().display()))?;
    Ok(CwdGuard {
        original,
        _lock: lock,
    })
}
