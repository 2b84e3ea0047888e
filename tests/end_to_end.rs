//! These tests need a licensed GAMS installation with `gams` and `gdxdump`
//! in the `PATH`. Run them with `cargo test -- --ignored`.
use std::fs;

use gams_session::config::SessionConfig;
use gams_session::error::{SessionError, SolveError};
use gams_session::session::Session;
use gams_session::solvers::{GamsProcess, Status};

const PLANTS: [&str; 2] = ["seattle", "san-diego"];
const MARKETS: [&str; 3] = ["new-york", "chicago", "topeka"];

fn transport_session(dir: &tempfile::TempDir) -> Session<GamsProcess> {
    let _ = env_logger::builder().is_test(true).try_init();
    let model = dir.path().join("transport.gms");
    fs::copy("tests/models/transport.gms", &model).unwrap();
    let mut session = Session::new(SessionConfig::new(&model), GamsProcess::default()).unwrap();
    session.create_set("i", PLANTS).unwrap();
    session.create_set("j", MARKETS).unwrap();
    session.create_parameter("a", PLANTS, [350., 600.]).unwrap();
    let distances = vec![
        (["seattle", "new-york"], 2.5),
        (["seattle", "chicago"], 1.7),
        (["seattle", "topeka"], 1.8),
        (["san-diego", "new-york"], 2.5),
        (["san-diego", "chicago"], 1.8),
        (["san-diego", "topeka"], 1.4),
    ];
    session
        .create_parameter(
            "d",
            distances.iter().map(|(k, _)| *k),
            distances.iter().map(|(_, v)| *v),
        )
        .unwrap();
    session
}

#[test]
#[ignore]
fn solve_transport_with_gams() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = transport_session(&dir);
    session.create_parameter("b", MARKETS, [325., 300., 275.]).unwrap();
    session.run().expect("Failed to run gams");
    assert_eq!(session.status(), Some(Status::Optimal));
    let z = session.variable_values_all("z").unwrap();
    assert_eq!(z.len(), 1);
    assert!((z[0] - 153.675).abs() < 1e-6);
    let shipped = session
        .variable_values("x", vec![["seattle", "chicago"], ["san-diego", "topeka"]])
        .unwrap();
    assert_eq!(shipped, vec![300., 275.]);
    let bounds = session.variable_bounds("x", vec![["seattle", "chicago"]]).unwrap();
    assert_eq!(bounds, vec![(0., f64::INFINITY)]);
}

#[test]
#[ignore]
fn infeasible_transport_with_gams() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = transport_session(&dir);
    // more demand than capacity
    session.create_parameter("b", MARKETS, [1000., 1000., 1000.]).unwrap();
    match session.run() {
        Err(SessionError::Solve(SolveError::Status(status))) => assert!(status.is_failure()),
        other => panic!("expected an infeasible model, got {:?}", other),
    }
}
