//! Test helpers shared by the crates in the dotenv-locator workspace.
//!
//! Resolution depends on process-wide state: the working directory, `PATH`
//! (which decides whether `git` and `go` can be found) and the `DOTENV_*`
//! variables. The modules here mutate that state behind locks and restore it
//! when their guards drop.

pub mod cwd;
pub mod env;
pub mod figment;
pub mod fs;
