//! Unit tests for the resolution algorithm.
//!
//! Root locators are replaced with closures so the tests never depend on
//! `git` or `go` being installed.

use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::{Result, ensure};
use rstest::{fixture, rstest};
use serial_test::serial;
use tempfile::TempDir;
use test_helpers::{cwd, fs::write_file};

use super::*;

#[fixture]
fn workspace() -> TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("create temporary workspace: {err}"),
    }
}

fn missing_root() -> Option<PathBuf> {
    None
}

fn counting_locator(root: Option<PathBuf>) -> (impl RootLocator + 'static, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let locator = move || {
        counter.set(counter.get() + 1);
        root.clone()
    };
    (locator, calls)
}

#[rstest]
#[serial]
fn finds_dotenv_in_current_directory_by_default(workspace: TempDir) -> Result<()> {
    write_file(workspace.path(), ".env", "KEY=value\n")?;
    let _cwd = cwd::set_dir(workspace.path())?;
    let expected = std::env::current_dir()?.join(".env");

    let paths = resolve(&ResolverConfig::default());
    ensure!(paths == [expected.clone()], "expected [{}], got {paths:?}", expected.display());
    ensure!(
        paths.iter().all(|path| path.is_absolute()),
        "results must be absolute"
    );
    Ok(())
}

#[rstest]
#[serial]
fn missing_dotenv_yields_empty_result(workspace: TempDir) -> Result<()> {
    let _cwd = cwd::set_dir(workspace.path())?;
    let paths = resolve(&ResolverConfig::default());
    ensure!(paths.is_empty(), "expected no files, got {paths:?}");
    Ok(())
}

#[rstest]
fn empty_filenames_behave_like_default_dotenv(workspace: TempDir) -> Result<()> {
    write_file(workspace.path(), ".env", "A=1\n")?;
    write_file(workspace.path(), ".env.local", "B=2\n")?;
    let implicit = ResolverConfig::builder().search_dir(workspace.path()).build();
    let explicit = ResolverConfig::builder()
        .filename(".env")
        .search_dir(workspace.path())
        .build();

    let resolver = Resolver::new();
    let implicit_paths = resolver.resolve(&implicit);
    ensure!(
        implicit_paths == resolver.resolve(&explicit),
        "empty filenames should match [\".env\"]"
    );
    ensure!(
        implicit_paths == [workspace.path().join(".env")],
        "unexpected paths {implicit_paths:?}"
    );
    Ok(())
}

#[rstest]
#[serial]
fn empty_search_dirs_behave_like_current_directory(workspace: TempDir) -> Result<()> {
    write_file(workspace.path(), ".env", "A=1\n")?;
    let _cwd = cwd::set_dir(workspace.path())?;
    let cleared = ResolverConfig::builder().clear_search_dirs().build();
    let explicit = ResolverConfig::builder().search_dir("./").build();

    let cleared_paths = resolve(&cleared);
    ensure!(
        cleared_paths == resolve(&explicit),
        "empty search dirs should match [\"./\"]"
    );
    ensure!(cleared_paths.len() == 1, "expected one file, got {cleared_paths:?}");
    Ok(())
}

#[rstest]
fn every_matching_directory_contributes_in_order(workspace: TempDir) -> Result<()> {
    let root = workspace.path();
    let first = write_file(root, "a/.env", "A=1\n")?;
    std::fs::create_dir_all(root.join("b"))?;
    let third = write_file(root, "c/.env", "C=1\n")?;

    let config = ResolverConfig::builder()
        .search_dirs([root.join("a"), root.join("b"), root.join("c")])
        .build();
    let paths = Resolver::new().resolve(&config);
    ensure!(paths == [first, third], "unexpected paths {paths:?}");
    Ok(())
}

#[rstest]
fn filenames_are_the_outer_loop(workspace: TempDir) -> Result<()> {
    let root = workspace.path();
    let a_local = write_file(root, "a/.env.local", "")?;
    let b_local = write_file(root, "b/.env.local", "")?;
    let a_env = write_file(root, "a/.env", "")?;
    let b_env = write_file(root, "b/.env", "")?;

    let config = ResolverConfig::builder()
        .filenames([".env.local", ".env"])
        .search_dirs([root.join("a"), root.join("b")])
        .build();
    let paths = Resolver::new().resolve(&config);
    ensure!(
        paths == [a_local, b_local, a_env, b_env],
        "unexpected order {paths:?}"
    );
    Ok(())
}

#[rstest]
fn vcs_root_file_is_found(workspace: TempDir) -> Result<()> {
    let root = workspace.path().to_path_buf();
    let target = write_file(&root, ".env.test", "MODE=test\n")?;
    std::fs::create_dir_all(root.join("nested"))?;

    let config = ResolverConfig::builder()
        .filename(".env.test")
        .search_dir(root.join("nested"))
        .consult_vcs_root(true)
        .build();
    let resolver = Resolver::new().with_vcs_locator(move || Some(root.clone()));
    let paths = resolver.resolve(&config);
    ensure!(paths == [target], "unexpected paths {paths:?}");
    Ok(())
}

#[rstest]
fn search_dirs_precede_vcs_root_which_precedes_project_root(workspace: TempDir) -> Result<()> {
    let base = workspace.path();
    let in_dir = write_file(base, "dir/.env", "")?;
    let in_vcs = write_file(base, "vcs/.env", "")?;
    let in_project = write_file(base, "project/.env", "")?;

    let vcs = base.join("vcs");
    let project = base.join("project");
    let resolver = Resolver::new()
        .with_vcs_locator(move || Some(vcs.clone()))
        .with_project_locator(move || Some(project.clone()));
    let config = ResolverConfig::builder()
        .search_dir(base.join("dir"))
        .consult_vcs_root(true)
        .consult_project_root(true)
        .build();

    let paths = resolver.resolve(&config);
    ensure!(
        paths == [in_dir, in_vcs, in_project],
        "unexpected order {paths:?}"
    );
    Ok(())
}

#[rstest]
fn disabled_locators_are_never_invoked(workspace: TempDir) -> Result<()> {
    let (vcs, vcs_calls) = counting_locator(Some(workspace.path().to_path_buf()));
    let (project, project_calls) = counting_locator(Some(workspace.path().to_path_buf()));
    let resolver = Resolver::new()
        .with_vcs_locator(vcs)
        .with_project_locator(project);
    let config = ResolverConfig::builder()
        .search_dir(workspace.path())
        .build();

    let _paths = resolver.resolve(&config);
    ensure!(vcs_calls.get() == 0, "VCS locator ran while disabled");
    ensure!(project_calls.get() == 0, "project locator ran while disabled");
    Ok(())
}

#[rstest]
fn enabled_locators_run_once_per_resolution(workspace: TempDir) -> Result<()> {
    let (vcs, vcs_calls) = counting_locator(Some(workspace.path().to_path_buf()));
    let (project, project_calls) = counting_locator(None);
    let resolver = Resolver::new()
        .with_vcs_locator(vcs)
        .with_project_locator(project);
    let config = ResolverConfig::builder()
        .filenames([".env", ".env.local", ".env.test"])
        .search_dir(workspace.path())
        .consult_vcs_root(true)
        .consult_project_root(true)
        .build();

    let _first = resolver.resolve(&config);
    ensure!(vcs_calls.get() == 1, "expected one VCS probe, saw {}", vcs_calls.get());
    ensure!(
        project_calls.get() == 1,
        "expected one project probe, saw {}",
        project_calls.get()
    );

    let _second = resolver.resolve(&config);
    ensure!(vcs_calls.get() == 2, "results must not be cached across calls");
    Ok(())
}

#[rstest]
#[case(1)]
#[case(3)]
fn absolute_filename_appears_exactly_once(workspace: TempDir, #[case] dir_count: usize) -> Result<()> {
    let target = write_file(workspace.path(), "abs/.env", "A=1\n")?;
    let dirs: Vec<PathBuf> = (0..dir_count)
        .map(|idx| workspace.path().join(format!("dir{idx}")))
        .collect();
    let (vcs, vcs_calls) = counting_locator(Some(workspace.path().to_path_buf()));
    let config = ResolverConfig::builder()
        .filename(target.to_string_lossy())
        .search_dirs(dirs)
        .consult_vcs_root(true)
        .build();

    let paths = Resolver::new().with_vcs_locator(vcs).resolve(&config);
    ensure!(paths == [target], "unexpected paths {paths:?}");
    ensure!(
        vcs_calls.get() == 0,
        "absolute filenames should not trigger root probes"
    );
    Ok(())
}

#[rstest]
fn missing_absolute_filename_is_dropped(workspace: TempDir) -> Result<()> {
    let config = ResolverConfig::builder()
        .filename(workspace.path().join("absent.env").to_string_lossy())
        .build();
    let paths = Resolver::new().resolve(&config);
    ensure!(paths.is_empty(), "unexpected paths {paths:?}");
    Ok(())
}

#[rstest]
fn repeated_search_dirs_are_reported_once(workspace: TempDir) -> Result<()> {
    let target = write_file(workspace.path(), ".env", "")?;
    let root = workspace.path().to_path_buf();
    let config = ResolverConfig::builder()
        .search_dirs([root.clone(), root.join("."), root.clone()])
        .consult_vcs_root(true)
        .build();
    let resolver = Resolver::new().with_vcs_locator(move || Some(root.clone()));
    let paths = resolver.resolve(&config);
    ensure!(paths == [target], "unexpected paths {paths:?}");
    Ok(())
}

#[rstest]
#[serial]
fn relative_and_absolute_spellings_collapse(workspace: TempDir) -> Result<()> {
    write_file(workspace.path(), ".env", "")?;
    let _cwd = cwd::set_dir(workspace.path())?;
    let here = std::env::current_dir()?;
    let config = ResolverConfig::builder()
        .search_dirs([PathBuf::from("./"), PathBuf::from("."), here.clone()])
        .build();
    let paths = resolve(&config);
    ensure!(paths == [here.join(".env")], "unexpected paths {paths:?}");
    Ok(())
}

#[rstest]
fn unavailable_roots_contribute_nothing(workspace: TempDir) -> Result<()> {
    let local = write_file(workspace.path(), ".env", "")?;
    let resolver = Resolver::new()
        .with_vcs_locator(missing_root)
        .with_project_locator(missing_root);
    let enabled = ResolverConfig::builder()
        .search_dir(workspace.path())
        .consult_vcs_root(true)
        .consult_project_root(true)
        .build();
    let disabled = ResolverConfig::builder().search_dir(workspace.path()).build();

    let with_roots = resolver.resolve(&enabled);
    ensure!(with_roots == [local], "unexpected paths {with_roots:?}");
    ensure!(
        with_roots == resolver.resolve(&disabled),
        "toggling an unavailable root must not change the result"
    );
    Ok(())
}

#[rstest]
fn expansion_flags_do_not_change_results(workspace: TempDir) -> Result<()> {
    write_file(workspace.path(), ".env", "")?;
    write_file(workspace.path(), ".env.production", "")?;
    let plain = ResolverConfig::builder().search_dir(workspace.path()).build();
    let flagged = ResolverConfig::builder()
        .search_dir(workspace.path())
        .disable_filename_expansion(true)
        .disable_dir_expansion(true)
        .build();
    let resolver = Resolver::new();
    ensure!(
        resolver.resolve(&plain) == resolver.resolve(&flagged),
        "expansion flags are reserved and must be inert"
    );
    Ok(())
}

#[rstest]
fn resolve_leaves_config_untouched(workspace: TempDir) -> Result<()> {
    write_file(workspace.path(), ".env", "")?;
    let config = ResolverConfig::builder()
        .search_dir(workspace.path())
        .consult_project_root(true)
        .build();
    let before = config.clone();
    let _paths = Resolver::new()
        .with_project_locator(missing_root)
        .resolve(&config);
    ensure!(config == before, "resolution mutated its configuration");
    Ok(())
}

#[rstest]
fn final_filter_drops_files_that_vanished(workspace: TempDir) -> Result<()> {
    let kept = write_file(workspace.path(), ".env", "")?;
    let removed = write_file(workspace.path(), ".env.tmp", "")?;

    let mut found = FoundFiles::default();
    found.push_existing(kept.clone());
    found.push_existing(removed.clone());
    std::fs::remove_file(&removed)?;

    let paths = found.into_existing();
    ensure!(paths == [kept], "unexpected paths {paths:?}");
    Ok(())
}

#[rstest]
#[case("")]
#[case("config")]
fn directories_are_never_returned(workspace: TempDir, #[case] filename: &str) -> Result<()> {
    std::fs::create_dir_all(workspace.path().join("config"))?;
    let config = ResolverConfig::builder()
        .filename(filename)
        .search_dir(workspace.path())
        .consult_vcs_root(true)
        .build();
    let root = workspace.path().to_path_buf();
    let paths = Resolver::new()
        .with_vcs_locator(move || Some(root.clone()))
        .resolve(&config);
    ensure!(paths.is_empty(), "directories leaked into {paths:?}");
    Ok(())
}

#[rstest]
fn absolute_directory_filename_is_dropped(workspace: TempDir) -> Result<()> {
    let config = ResolverConfig::builder()
        .filename(workspace.path().to_string_lossy())
        .build();
    let paths = Resolver::new().resolve(&config);
    ensure!(paths.is_empty(), "directory returned as a file: {paths:?}");
    Ok(())
}

#[cfg(target_os = "linux")]
#[rstest]
#[serial]
fn relative_paths_are_skipped_when_cwd_is_gone(workspace: TempDir) -> Result<()> {
    let doomed = workspace.path().join("doomed");
    std::fs::create_dir_all(&doomed)?;
    let _cwd = cwd::set_dir(&doomed)?;
    std::fs::remove_dir(&doomed)?;

    let mut found = FoundFiles::default();
    found.push(PathBuf::from(".env"));
    found.push(workspace.path().join(".env"));
    ensure!(
        found.paths == [workspace.path().join(".env")],
        "relative path kept without an anchor: {:?}",
        found.paths
    );
    Ok(())
}

#[rstest]
fn utf8_view_matches_native_paths(workspace: TempDir) -> Result<()> {
    let target = write_file(workspace.path(), ".env", "")?;
    let config = ResolverConfig::builder().search_dir(workspace.path()).build();
    let utf8 = Resolver::new().resolve_utf8(&config);
    ensure!(
        utf8.iter().map(|p| p.as_std_path()).eq([target.as_path()]),
        "unexpected UTF-8 paths {utf8:?}"
    );
    Ok(())
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        self.0
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("capture buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn resolve_capturing_logs(config: &ResolverConfig) -> (Vec<PathBuf>, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::INFO)
        .finish();
    let paths = tracing::subscriber::with_default(subscriber, || {
        Resolver::new()
            .with_vcs_locator(missing_root)
            .resolve(config)
    });
    (paths, captured.text())
}

#[rstest]
#[case(true)]
#[case(false)]
fn debug_flag_controls_diagnostics_only(workspace: TempDir, #[case] debug: bool) -> Result<()> {
    let target = write_file(workspace.path(), ".env", "")?;
    let config = ResolverConfig::builder()
        .search_dir(workspace.path())
        .consult_vcs_root(true)
        .debug(debug)
        .build();

    let (paths, logs) = resolve_capturing_logs(&config);
    ensure!(paths == [target.clone()], "unexpected paths {paths:?}");
    let expected_lines = usize::from(debug) * 2;
    let lines = logs.lines().filter(|line| line.contains("[dotenv]")).count();
    ensure!(
        lines == expected_lines,
        "expected {expected_lines} diagnostic lines, got {lines}: {logs}"
    );
    if debug {
        ensure!(logs.contains("files to parse"), "missing candidate line: {logs}");
        ensure!(
            logs.contains(&*target.to_string_lossy()),
            "resolved line should list the found file: {logs}"
        );
    }
    Ok(())
}

#[test]
fn normalised_key_is_stable_for_identical_paths() {
    let path = Path::new("/srv/app/.env");
    assert_eq!(normalised_key(path), normalised_key(&path.to_path_buf()));
}

#[cfg(windows)]
#[test]
fn normalised_key_folds_case_and_separators() {
    assert_eq!(
        normalised_key(Path::new("C:/Config/.ENV")),
        "c:\\config\\.env"
    );
}
