use std::fs;

use tempfile::tempdir;
use vasp_io::calc::InputSet;
use vasp_io::incar::parse_incar;
use vasp_io::kpoints::{parse_kpoints, KpointsSpec, MeshStyle};
use vasp_io::potcar::PotcarSpecies;
use vasp_io::structure::{Lattice, Site, Structure};

fn fake_potcar_block(symbol: &str, zval: f64) -> String {
    format!(
        "PAW_PBE {sym} 06Sep2000\n  {zval:.10}\n parameters from PSCTR are:\n   \
         TITEL  = PAW_PBE {sym} 06Sep2000\n   POMASS =  114.818; ZVAL   =   {zval:.3}    \
         mass and valenz\n End of Dataset\n",
        sym = symbol,
        zval = zval
    )
}

/// An InAs set with potentials registered, matching the common NSCF deck
fn inas_input_set() -> InputSet {
    let structure = Structure::new(
        "InAs",
        Lattice::new([
            [6.0583, 0.0, 0.0],
            [0.0, 6.0583, 0.0],
            [0.0, 0.0, 6.0583],
        ])
        .unwrap(),
        vec![
            Site::new("In", [0.0, 0.0, 0.0]),
            Site::new("As", [0.25, 0.25, 0.25]),
        ],
    )
    .unwrap();
    let kpoints = KpointsSpec::mesh([4, 4, 4], [0.0; 3], MeshStyle::MonkhorstPack).unwrap();

    let mut input = InputSet::new(structure, kpoints);
    input.set_potential(PotcarSpecies::parse_str(&fake_potcar_block("In_d", 13.0)).unwrap());
    input.set_potential(PotcarSpecies::parse_str(&fake_potcar_block("As", 5.0)).unwrap());
    input.rewrite_parameter("ismear", 0i64);
    input.rewrite_parameter("sigma", 0.05);
    input
}

#[test]
fn test_prepare_writes_full_deck_with_restart_files() {
    let dir = tempdir().unwrap();
    let chgcar = dir.path().join("CHGCAR.ref");
    let wavecar = dir.path().join("WAVECAR.ref");
    fs::write(&chgcar, "charge density\n").unwrap();
    fs::write(&wavecar, "wavefunctions\n").unwrap();

    let run_dir = dir.path().join("run");
    fs::create_dir(&run_dir).unwrap();

    let mut input = inas_input_set();
    input.set_charge_density(&chgcar);
    input.set_wavefunctions(&wavecar);
    input.set_icharg(11).unwrap();

    let mut written = input.write_all(&run_dir).unwrap();
    written.sort();
    assert_eq!(
        written,
        vec!["CHGCAR", "INCAR", "KPOINTS", "POSCAR", "POTCAR", "WAVECAR"]
    );
    assert_eq!(
        fs::read_to_string(run_dir.join("CHGCAR")).unwrap(),
        "charge density\n"
    );

    // The deck parses back
    let incar = parse_incar(run_dir.join("INCAR")).unwrap();
    assert!(incar.contains("icharg"));
    let kpoints = parse_kpoints(run_dir.join("KPOINTS")).unwrap();
    assert_eq!(kpoints.get_kpoints_mesh().unwrap().0, [4, 4, 4]);
    let potcar = fs::read_to_string(run_dir.join("POTCAR")).unwrap();
    assert!(potcar.contains("In_d"));
    assert_eq!(potcar.matches("End of Dataset").count(), 2);
}

#[test]
fn test_prepare_skips_chgcar_when_icharg_ignores_it() {
    let dir = tempdir().unwrap();
    let chgcar = dir.path().join("CHGCAR.ref");
    let wavecar = dir.path().join("WAVECAR.ref");
    fs::write(&chgcar, "charge density\n").unwrap();
    fs::write(&wavecar, "wavefunctions\n").unwrap();

    let run_dir = dir.path().join("run");
    fs::create_dir(&run_dir).unwrap();

    let mut input = inas_input_set();
    input.set_charge_density(&chgcar);
    input.set_wavefunctions(&wavecar);
    input.set_icharg(2).unwrap();

    let mut written = input.write_all(&run_dir).unwrap();
    written.sort();
    assert_eq!(
        written,
        vec!["INCAR", "KPOINTS", "POSCAR", "POTCAR", "WAVECAR"]
    );
    assert!(!run_dir.join("CHGCAR").exists());
}

#[test]
fn test_n_elec_sums_valences_over_sites() {
    let input = inas_input_set();
    assert!((input.n_elec().unwrap() - 18.0).abs() < 1e-12);
    assert_eq!(input.num_ions(), 2);
    assert_eq!(input.elements(), vec!["In", "As"]);
}

#[test]
fn test_magmom_must_match_before_writing() {
    let dir = tempdir().unwrap();
    let mut input = inas_input_set();
    input.rewrite_parameter(
        "magmom",
        vasp_io::incar::IncarValue::List(vec![
            vasp_io::incar::IncarValue::Real(1.0),
            vasp_io::incar::IncarValue::Real(1.0),
            vasp_io::incar::IncarValue::Real(1.0),
        ]),
    );
    assert!(input.write_all(dir.path()).is_err());
    assert!(!dir.path().join("INCAR").exists());
}
