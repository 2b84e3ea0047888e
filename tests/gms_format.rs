use gams_session::dataset::{Dataset, SymbolKind, VariableRecord};
use gams_session::gms_format::WriteToGmsFormat;
use gams_session::key::Key;

#[test]
fn sets_parameters_and_variables() {
    let mut ds = Dataset::new("data");
    let i = ds.declare("i", SymbolKind::Set, 1).unwrap();
    i.add_element("a".into()).unwrap();
    i.add_element("b".into()).unwrap();
    let ij = ds.declare("ij", SymbolKind::Set, 2).unwrap();
    ij.add_element(["a", "x"].into()).unwrap();
    ij.add_element(["b", "y"].into()).unwrap();
    let cost = ds.declare("cost", SymbolKind::Parameter, 1).unwrap();
    cost.add_value("a".into(), 1.).unwrap();
    cost.add_value("b".into(), 2.5).unwrap();
    let x = ds.declare("x", SymbolKind::Variable, 1).unwrap();
    x.add_variable_record("a".into(), VariableRecord::new(0., f64::INFINITY, 1.))
        .unwrap();
    x.add_variable_record("o'hare".into(), VariableRecord::fixed(3.))
        .unwrap();
    let expected_str = "* data
$offListing

Set i(*) /
  'a'
  'b'
/;

Set ij(*,*) /
  'a'.'x'
  'b'.'y'
/;

Parameter cost(*) /
  'a' 1
  'b' 2.5
/;

Variable x(*) /
  'a'.lo 0
  'a'.up inf
  'a'.l 1
  \"o'hare\".lo 3
  \"o'hare\".up 3
  \"o'hare\".l 3
/;
";
    assert_eq!(ds.display_gms().to_string(), expected_str);
}

#[test]
fn empty_and_scalar_symbols() {
    let mut ds = Dataset::new("data");
    ds.declare("p", SymbolKind::Parameter, 2).unwrap();
    let s = ds.declare("s", SymbolKind::Parameter, 0).unwrap();
    s.add_value(Key::scalar(), 5.).unwrap();
    let z = ds.declare("z", SymbolKind::Variable, 0).unwrap();
    z.add_variable_record(
        Key::scalar(),
        VariableRecord::new(f64::NEG_INFINITY, 100., 0.),
    )
    .unwrap();
    let expected_str = "* data
$offListing

Parameter p(*,*);

Parameter s /
  5
/;

Variable z /
  lo -inf
  up 100
  l 0
/;
";
    assert_eq!(ds.display_gms().to_string(), expected_str);
}

#[test]
fn written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut ds = Dataset::new("data");
    let i = ds.declare("i", SymbolKind::Set, 1).unwrap();
    i.add_element("a".into()).unwrap();
    let file = ds.to_tmp_file(dir.path()).unwrap();
    let written = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(written, ds.display_gms().to_string());
    assert!(file.path().extension().map_or(false, |e| e == "gms"));
}
