use std::fs;

use tempfile::tempdir;
use vasp_io::errors::VaspIoError;
use vasp_io::incar::{incar_to_string, parse_incar, write_incar, Incar, IncarValue};

fn nscf_params() -> Incar {
    let mut incar = Incar::new();
    incar.set("gga", "PE");
    incar.set("gga_compat", false);
    incar.set("icharg", 11i64);
    incar.set("ismear", 0i64);
    incar.set("lorbit", 11i64);
    incar.set("lsorbit", true);
    incar.set("sigma", 0.05);
    incar
}

#[test]
fn test_written_file_matches_reference() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("INCAR");
    write_incar(&nscf_params(), &file_path).unwrap();

    let reference = "\
GGA = PE
GGA_COMPAT = .FALSE.
ICHARG = 11
ISMEAR = 0
LORBIT = 11
LSORBIT = .TRUE.
SIGMA = 0.05
";
    assert_eq!(fs::read_to_string(&file_path).unwrap(), reference);
}

#[test]
fn test_file_roundtrip() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("INCAR");

    let mut incar = nscf_params();
    incar.set(
        "magmom",
        IncarValue::List(vec![
            IncarValue::Real(1.5),
            IncarValue::Real(1.5),
            IncarValue::Real(0.0),
        ]),
    );
    write_incar(&incar, &file_path).unwrap();
    let reparsed = parse_incar(&file_path).unwrap();
    assert_eq!(reparsed, incar);
}

#[test]
fn test_parse_handwritten_file() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("INCAR");
    fs::write(
        &file_path,
        "SYSTEM = InAs nscf  ! job name\nENCUT = 450\nISMEAR = 0; SIGMA = 0.05\nMAGMOM = 4*0.6\n",
    )
    .unwrap();

    let incar = parse_incar(&file_path).unwrap();
    assert_eq!(
        incar.get("system"),
        Some(&IncarValue::List(vec![
            IncarValue::Str("InAs".to_string()),
            IncarValue::Str("nscf".to_string()),
        ]))
    );
    assert_eq!(incar.get("encut"), Some(&IncarValue::Int(450)));
    assert_eq!(incar.get("sigma"), Some(&IncarValue::Real(0.05)));
    match incar.get("magmom") {
        Some(IncarValue::List(items)) => assert_eq!(items.len(), 4),
        other => panic!("unexpected magmom {:?}", other),
    }
}

#[test]
fn test_malformed_line_reports_position() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("INCAR");
    fs::write(&file_path, "ENCUT = 450\nbogus line\n").unwrap();

    match parse_incar(&file_path) {
        Err(VaspIoError::Format { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected format error, got {:?}", other),
    }
}

#[test]
fn test_serialized_text_is_stable() {
    // Same parameters always produce the same bytes, whatever insertion order
    let mut a = Incar::new();
    a.set("sigma", 0.05);
    a.set("encut", 450i64);
    let mut b = Incar::new();
    b.set("encut", 450i64);
    b.set("sigma", 0.05);
    assert_eq!(incar_to_string(&a), incar_to_string(&b));
}
