//! `GamsProcess` against the stand-in tools in `tests/fake_gams/`
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Once;

use gams_session::config::SessionConfig;
use gams_session::error::{SessionError, SolveError};
use gams_session::session::Session;
use gams_session::solvers::{GamsProcess, Status};
use tempfile::TempDir;

static INSTALL: Once = Once::new();

/// Executable copies of the stand-in tools, installed once per test run so
/// that no tool is being written while another test spawns one.
fn tools_dir() -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("fake_gams");
    INSTALL.call_once(|| {
        fs::create_dir_all(&dir).unwrap();
        let sources = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fake_gams");
        for name in &["gams", "gdxdump"] {
            let target = dir.join(name);
            fs::copy(sources.join(name), &target).unwrap();
            let mut permissions = fs::metadata(&target).unwrap().permissions();
            permissions.set_mode(0o755);
            fs::set_permissions(&target, permissions).unwrap();
        }
    });
    dir
}

fn gams() -> GamsProcess {
    let dir = tools_dir();
    GamsProcess::new()
        .command_name(dir.join("gams").display().to_string())
        .gdxdump_command_name(dir.join("gdxdump").display().to_string())
}

fn session(model: &str, backend: GamsProcess) -> (TempDir, Session<GamsProcess>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.gms");
    fs::write(&path, model).unwrap();
    let mut session = Session::new(SessionConfig::new(&path), backend).unwrap();
    session.create_set("i", ["a", "b"]).unwrap();
    session
        .create_parameter("cost", ["a", "b"], [3., 4.])
        .unwrap();
    (dir, session)
}

fn run_dirs(workspace: &Path) -> Vec<PathBuf> {
    fs::read_dir(workspace)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .map_or(false, |name| name.to_string_lossy().starts_with("gams_session"))
        })
        .collect()
}

#[test]
fn variables_come_back_from_gdxdump() {
    let (dir, mut session) = session("* status 1 Optimal\n", gams());
    session.run().unwrap();
    assert_eq!(session.status(), Some(Status::Optimal));
    assert_eq!(session.variable_values("x", ["b", "a"]).unwrap(), vec![2.0, 1.5]);
    assert_eq!(session.variable_values_all("z").unwrap(), vec![7.0]);
    assert_eq!(
        session.variable_bounds("x", ["B"]).unwrap(),
        vec![(0., 10.)]
    );
    assert!(run_dirs(dir.path()).is_empty());
}

#[test]
fn gams_return_codes_are_reported() {
    let (dir, mut session) = session("* exit 3\n", gams());
    let err = session.run().unwrap_err();
    assert!(
        matches!(
            err,
            SessionError::Solve(SolveError::ReturnCode { code: 3, .. })
        ),
        "{:?}",
        err
    );
    assert!(run_dirs(dir.path()).is_empty());
}

#[test]
fn unreadable_results_are_reported() {
    let (_dir, mut session) = session("* status 1 Optimal\n* no output\n", gams());
    let err = session.run().unwrap_err();
    assert!(
        matches!(err, SessionError::Solve(SolveError::Other(_))),
        "{:?}",
        err
    );
}

#[test]
fn infeasible_listing_fails_the_run() {
    let (_dir, mut session) = session("* status 4 Infeasible\n", gams());
    assert!(matches!(
        session.run(),
        Err(SessionError::Solve(SolveError::Status(Status::Infeasible)))
    ));
}

#[test]
fn kept_run_files_survive_failures() {
    for model in &["* status 1 Optimal\n", "* exit 3\n"] {
        let (dir, mut session) = session(model, gams().keeping_files());
        let _ = session.run();
        let kept = run_dirs(dir.path());
        assert_eq!(kept.len(), 1, "{}", model);
        assert!(kept[0].join("session_data.gms").is_file());
        assert!(kept[0].join("session_data.gdx").is_file());
        assert!(kept[0].join("model.lst").is_file());
    }
}
