use std::fs;

use approx::assert_relative_eq;
use tempfile::tempdir;
use vasp_io::errors::VaspIoError;
use vasp_io::poscar::{parse_poscar, write_poscar};
use vasp_io::structure::{Lattice, Site, Structure};

fn inas() -> Structure {
    Structure::new(
        "InAs zincblende",
        Lattice::new([
            [6.0583, 0.0, 0.0],
            [0.0, 6.0583, 0.0],
            [0.0, 0.0, 6.0583],
        ])
        .unwrap(),
        vec![
            Site::new("In", [0.0, 0.0, 0.0]),
            Site::new("In", [0.5, 0.5, 0.0]),
            Site::new("As", [0.25, 0.25, 0.25]),
            Site::new("As", [0.75, 0.75, 0.25]),
        ],
    )
    .unwrap()
}

#[test]
fn test_file_roundtrip_preserves_cell_and_formula() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("POSCAR");

    let structure = inas();
    write_poscar(&structure, &file_path).unwrap();
    let reparsed = parse_poscar(&file_path).unwrap();

    for i in 0..3 {
        for j in 0..3 {
            assert_relative_eq!(
                reparsed.lattice.matrix[i][j],
                structure.lattice.matrix[i][j],
                epsilon = 1e-10
            );
        }
    }
    assert_eq!(reparsed.symbol_counts(), vec![("In", 2), ("As", 2)]);
    assert_eq!(reparsed.comment, "InAs zincblende");
}

#[test]
fn test_parse_cartesian_mode() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("POSCAR");
    fs::write(
        &file_path,
        "Si surface\n1.0\n3.84 0.0 0.0\n0.0 3.84 0.0\n0.0 0.0 20.0\nSi\n2\nCartesian\n0.0 0.0 0.0\n1.92 1.92 1.36\n",
    )
    .unwrap();

    let structure = parse_poscar(&file_path).unwrap();
    assert!(structure.cartesian);
    assert_relative_eq!(structure.sites[1].position[2], 1.36, epsilon = 1e-10);
}

#[test]
fn test_bad_lattice_row_reports_line() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("POSCAR");
    fs::write(
        &file_path,
        "bad\n1.0\n5.43 0.0 0.0\n0.0 5.43\n0.0 0.0 5.43\nSi\n2\nDirect\n0 0 0\n0.25 0.25 0.25\n",
    )
    .unwrap();

    match parse_poscar(&file_path) {
        Err(VaspIoError::Format { line, .. }) => assert_eq!(line, 4),
        other => panic!("expected format error, got {:?}", other),
    }
}
