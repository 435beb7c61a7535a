//! Writing dotenv fixtures into temporary directories.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

/// Writes `contents` to `relative` beneath `root`, creating parent
/// directories, and returns the full path.
///
/// # Errors
///
/// Returns an error if `root` is not UTF-8, `relative` escapes `root`, or any
/// filesystem operation fails.
///
/// # Examples
///
/// ```no_run
/// let dir = std::env::temp_dir();
/// let path = test_helpers::fs::write_file(&dir, "nested/.env", "KEY=value\n")
///     .expect("write fixture");
/// assert!(path.ends_with("nested/.env"));
/// ```
pub fn write_file(root: &Path, relative: &str, contents: &str) -> Result<PathBuf> {
    let root_utf8 = Utf8Path::from_path(root)
        .ok_or_else(|| anyhow!("{} is not valid UTF-8", root.display()))?;
    let dir = Dir::open_ambient_dir(root_utf8, ambient_authority())
        .with_context(|| format!("open {root_utf8}"))?;
    let relative_path = Utf8PathBuf::from(relative);
    if let Some(parent) = relative_path.parent().filter(|p| !p.as_str().is_empty()) {
        dir.create_dir_all(parent)
            .with_context(|| format!("create {parent} under {root_utf8}"))?;
    }
    let mut file = dir
        .create(&relative_path)
        .with_context(|| format!("create {relative_path} under {root_utf8}"))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write {relative_path}"))?;
    Ok(root.join(relative))
}
