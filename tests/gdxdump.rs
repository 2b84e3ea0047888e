use std::fs;

use gams_session::dataset::Dataset;
use gams_session::key::Key;
use gams_session::solvers::gdxdump::{parse_model_status, parse_symbol_list, read_variable_csv};
use gams_session::solvers::Status;

#[test]
fn transport_symbols() {
    let text = fs::read_to_string("tests/output_files/transport_symbols.txt").unwrap();
    let symbols = parse_symbol_list(&text);
    assert_eq!(symbols.len(), 12);
    let variables: Vec<_> = symbols
        .iter()
        .filter(|s| s.is_variable())
        .map(|s| (s.name.as_str(), s.dim))
        .collect();
    assert_eq!(variables, vec![("x", 2), ("z", 0)]);
}

#[test]
fn transport_variables() {
    let mut output = Dataset::new("out");
    let x = fs::File::open("tests/output_files/transport_x.csv").unwrap();
    read_variable_csv(&mut output, "x", 2, x).unwrap();
    let z = fs::File::open("tests/output_files/transport_z.csv").unwrap();
    read_variable_csv(&mut output, "z", 0, z).unwrap();

    let x = output.variable("x").unwrap();
    assert_eq!(x.len(), 6);
    let topeka = x.get(&Key::from(["seattle", "topeka"])).unwrap();
    assert_eq!(topeka.level, 0.);
    assert_eq!(topeka.marginal, 0.036);
    assert_eq!((topeka.lower, topeka.upper), (0., f64::INFINITY));
    let levels: Vec<f64> = x.iter().map(|(_, r)| r.level).collect();
    assert_eq!(levels, vec![50., 300., 0., 275., 0., 275.]);

    let z: Vec<f64> = output.variable("z").unwrap().iter().map(|(_, r)| r.level).collect();
    assert_eq!(z, vec![153.675]);
}

#[test]
fn transport_listings() {
    let optimal = fs::read_to_string("tests/output_files/transport_optimal.lst").unwrap();
    assert_eq!(parse_model_status(&optimal), Some(Status::Optimal));
    let infeasible = fs::read_to_string("tests/output_files/transport_infeasible.lst").unwrap();
    let status = parse_model_status(&infeasible).unwrap();
    assert_eq!(status, Status::Infeasible);
    assert!(status.is_failure());
}
