/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! Input-set builder
//!
//! [`InputSet`] collects everything a VASP run directory needs: INCAR
//! parameters, a structure, a k-point spec, per-element pseudopotentials
//! and optional restart files. It writes the full deck in one call.
//! Submission, scheduling and retrieval of results belong to the caller's
//! workflow engine; this type only prepares files and names the outputs
//! worth retrieving.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::errors::{Result, VaspIoError};
use crate::incar::{incar_to_string, write_incar, Incar, IncarValue};
use crate::kpoints::{write_kpoints, KpointsSpec};
use crate::poscar::write_poscar;
use crate::potcar::{write_potcar, PotcarSpecies};
use crate::structure::Structure;

/// ICHARG values accepted by VASP 5.
const ALLOWED_ICHARG: [i64; 7] = [0, 1, 2, 4, 10, 11, 12];

/// ICHARG values that read an initial charge density from CHGCAR.
const CHGCAR_ICHARG: [i64; 2] = [1, 11];

/// A complete, writable VASP input deck.
#[derive(Debug, Clone)]
pub struct InputSet {
    /// Free-form label, not written to any file
    pub label: String,
    parameters: Incar,
    structure: Structure,
    kpoints: KpointsSpec,
    potentials: HashMap<String, PotcarSpecies>,
    charge_density: Option<PathBuf>,
    wavefunctions: Option<PathBuf>,
}

impl InputSet {
    /// Create an input set. The structure's cell is attached to the
    /// k-point spec so downstream consumers can interpret fractional
    /// coordinates.
    pub fn new(structure: Structure, kpoints: KpointsSpec) -> Self {
        let kpoints = kpoints.with_cell(structure.lattice.matrix);
        Self {
            label: "unlabeled".to_string(),
            parameters: Incar::new(),
            structure,
            kpoints,
            potentials: HashMap::new(),
            charge_density: None,
            wavefunctions: None,
        }
    }

    pub fn parameters(&self) -> &Incar {
        &self.parameters
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn kpoints(&self) -> &KpointsSpec {
        &self.kpoints
    }

    /// Set a parameter only when absent, e.g. when layering recipe
    /// defaults under user-provided values. Returns whether it was set.
    pub fn add_parameter(&mut self, tag: &str, value: impl Into<IncarValue>) -> bool {
        self.parameters.set_if_absent(tag, value)
    }

    /// Set a parameter unconditionally.
    pub fn rewrite_parameter(&mut self, tag: &str, value: impl Into<IncarValue>) {
        self.parameters.set(tag, value);
    }

    /// Replace the whole parameter set.
    pub fn set_parameters(&mut self, parameters: Incar) {
        self.parameters = parameters;
    }

    /// Register the pseudopotential for one element.
    pub fn set_potential(&mut self, species: PotcarSpecies) {
        self.potentials.insert(species.element.clone(), species);
    }

    /// Use an existing CHGCAR as the initial charge density.
    pub fn set_charge_density<P: Into<PathBuf>>(&mut self, path: P) {
        self.charge_density = Some(path.into());
    }

    /// Use an existing WAVECAR as the initial wavefunctions.
    pub fn set_wavefunctions<P: Into<PathBuf>>(&mut self, path: P) {
        self.wavefunctions = Some(path.into());
    }

    /// Set ICHARG, rejecting values VASP 5 does not accept.
    pub fn set_icharg(&mut self, value: i64) -> Result<()> {
        if !ALLOWED_ICHARG.contains(&value) {
            return Err(VaspIoError::Validation(format!(
                "invalid ICHARG value {}, allowed: {:?}",
                value, ALLOWED_ICHARG
            )));
        }
        self.parameters.set("icharg", value);
        Ok(())
    }

    /// Element symbols in first-appearance order.
    pub fn elements(&self) -> Vec<&str> {
        self.structure.unique_symbols()
    }

    /// Number of ions in the structure.
    pub fn num_ions(&self) -> usize {
        self.structure.num_sites()
    }

    /// Total valence electron count, summed over sites from the
    /// registered pseudopotentials.
    pub fn n_elec(&self) -> Result<f64> {
        let mut total = 0.0;
        for site in &self.structure.sites {
            let species = self.potentials.get(&site.symbol).ok_or_else(|| {
                VaspIoError::Validation(format!(
                    "no pseudopotential provided for {}",
                    site.symbol
                ))
            })?;
            total += species.valence;
        }
        Ok(total)
    }

    /// True when spin-orbit coupling or noncollinear magnetism is on.
    pub fn noncollinear(&self) -> bool {
        self.parameters.get_bool("lsorbit") || self.parameters.get_bool("lnoncollinear")
    }

    /// Number of MAGMOM entries the current spin mode requires.
    fn expected_magmom_len(&self) -> usize {
        let per_ion = if self.noncollinear() { 3 } else { 1 };
        self.num_ions() * per_ion
    }

    /// Set a uniform initial moment: one entry per ion, three per ion in
    /// noncollinear mode.
    pub fn set_uniform_magmom(&mut self, moment: f64) {
        let magmom = vec![IncarValue::Real(moment); self.expected_magmom_len()];
        self.parameters.set("magmom", IncarValue::List(magmom));
    }

    /// Check that MAGMOM, when present, matches the ion count and spin
    /// mode. Absent MAGMOM is fine.
    pub fn verify_magmom(&self) -> Result<()> {
        let magmom = match self.parameters.get("magmom") {
            None => return Ok(()),
            Some(IncarValue::List(items)) => items.len(),
            // A scalar MAGMOM is a length-1 list
            Some(_) => 1,
        };
        let expected = self.expected_magmom_len();
        if magmom != expected {
            return Err(VaspIoError::Validation(format!(
                "MAGMOM has {} entries but {} ions in {} mode require {}",
                magmom,
                self.num_ions(),
                if self.noncollinear() {
                    "noncollinear"
                } else {
                    "collinear"
                },
                expected
            )));
        }
        Ok(())
    }

    fn icharg(&self) -> Option<i64> {
        match self.parameters.get("icharg") {
            Some(IncarValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Write the full input deck into `dir` and return the file names
    /// written. CHGCAR is copied only when a source is registered and
    /// ICHARG actually reads one; WAVECAR is copied whenever a source is
    /// registered.
    pub fn write_all<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<String>> {
        let dir = dir.as_ref();
        self.verify_magmom()?;

        info!("preparing input deck for '{}' in {}", self.label, dir.display());

        let mut written = Vec::new();

        write_incar(&self.parameters, dir.join("INCAR"))?;
        written.push("INCAR".to_string());

        write_kpoints(&self.kpoints, dir.join("KPOINTS"))?;
        written.push("KPOINTS".to_string());

        write_poscar(&self.structure, dir.join("POSCAR"))?;
        written.push("POSCAR".to_string());

        write_potcar(&self.structure, &self.potentials, dir.join("POTCAR"))?;
        written.push("POTCAR".to_string());

        if let Some(chgcar) = &self.charge_density {
            let wants_chgcar = self
                .icharg()
                .map(|v| CHGCAR_ICHARG.contains(&v))
                .unwrap_or(false);
            if wants_chgcar {
                fs::copy(chgcar, dir.join("CHGCAR"))?;
                written.push("CHGCAR".to_string());
            } else {
                debug!("ICHARG does not read CHGCAR, skipping copy");
            }
        }

        if let Some(wavecar) = &self.wavefunctions {
            fs::copy(wavecar, dir.join("WAVECAR"))?;
            written.push("WAVECAR".to_string());
        }

        debug!("INCAR contents:\n{}", incar_to_string(&self.parameters));
        Ok(written)
    }

    /// Output files a caller's workflow engine should retrieve after the
    /// run, including the wannier90 glob.
    pub fn retrieve_list(&self) -> Vec<String> {
        [
            "OUTCAR",
            "CONTCAR",
            "OSZICAR",
            "EIGENVAL",
            "DOSCAR",
            "vasprun.xml",
            "wannier90*",
        ]
        .into_iter()
        .map(str::to_string)
        .collect()
    }
}
