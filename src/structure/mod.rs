/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! Crystal structure value types consumed by the file codecs
//!
//! These types carry only the shape of data the writers need: a 3x3 cell,
//! ordered atomic sites with element symbols, and the per-species grouping
//! the POSCAR format requires. Symmetry analysis and coordinate
//! transformations belong to the caller's toolkit, not this crate.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaspIoError};

/// A 3x3 lattice, row-major: `matrix[i]` is the i-th lattice vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// Lattice vectors in Angstrom
    pub matrix: [[f64; 3]; 3],
    /// Universal scaling factor applied on write (POSCAR line 2)
    pub scale: f64,
}

impl Lattice {
    /// Create a lattice from row vectors with unit scaling.
    pub fn new(matrix: [[f64; 3]; 3]) -> Result<Self> {
        Self::with_scale(matrix, 1.0)
    }

    /// Create a lattice with an explicit scaling factor.
    pub fn with_scale(matrix: [[f64; 3]; 3], scale: f64) -> Result<Self> {
        let lattice = Self { matrix, scale };
        lattice.validate()?;
        Ok(lattice)
    }

    fn validate(&self) -> Result<()> {
        for row in &self.matrix {
            for v in row {
                if !v.is_finite() {
                    return Err(VaspIoError::Validation(
                        "lattice vectors must be finite".to_string(),
                    ));
                }
            }
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(VaspIoError::Validation(format!(
                "lattice scale must be positive, got {}",
                self.scale
            )));
        }
        if self.determinant().abs() < 1e-12 {
            return Err(VaspIoError::Validation(
                "lattice vectors are linearly dependent".to_string(),
            ));
        }
        Ok(())
    }

    /// Determinant of the lattice matrix (signed cell volume before scaling).
    pub fn determinant(&self) -> f64 {
        let m = &self.matrix;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }
}

/// A single atomic site: element symbol plus position.
///
/// Positions are fractional (Direct) unless the containing [`Structure`]
/// says otherwise; the codecs never convert between the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Element symbol, e.g. "In" or "As"
    pub symbol: String,
    /// Position, interpretation per `Structure::cartesian`
    pub position: [f64; 3],
}

impl Site {
    pub fn new(symbol: impl Into<String>, position: [f64; 3]) -> Self {
        Self {
            symbol: symbol.into(),
            position,
        }
    }
}

/// An ordered collection of sites on a lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Comment/name carried into the POSCAR title line
    pub comment: String,
    pub lattice: Lattice,
    pub sites: Vec<Site>,
    /// True when site positions are Cartesian rather than fractional
    pub cartesian: bool,
}

impl Structure {
    /// Create a structure with fractional (Direct) coordinates.
    pub fn new(comment: impl Into<String>, lattice: Lattice, sites: Vec<Site>) -> Result<Self> {
        let structure = Self {
            comment: comment.into(),
            lattice,
            sites,
            cartesian: false,
        };
        structure.validate()?;
        Ok(structure)
    }

    fn validate(&self) -> Result<()> {
        if self.sites.is_empty() {
            return Err(VaspIoError::Validation(
                "structure must contain at least one site".to_string(),
            ));
        }
        for site in &self.sites {
            if site.symbol.is_empty() {
                return Err(VaspIoError::Validation(
                    "site symbol must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Number of atomic sites.
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// Element symbols in first-appearance order, without duplicates.
    ///
    /// This is the species order POTCAR blocks must be concatenated in.
    pub fn unique_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = Vec::new();
        for site in &self.sites {
            if !symbols.contains(&site.symbol.as_str()) {
                symbols.push(&site.symbol);
            }
        }
        symbols
    }

    /// Consecutive (symbol, count) runs as required by the POSCAR
    /// symbol/count lines. Sites of the same element that are not adjacent
    /// form separate runs; callers that need one run per element should
    /// sort their sites first.
    pub fn symbol_counts(&self) -> Vec<(&str, usize)> {
        let mut runs: Vec<(&str, usize)> = Vec::new();
        for site in &self.sites {
            match runs.last_mut() {
                Some((symbol, count)) if *symbol == site.symbol => *count += 1,
                _ => runs.push((&site.symbol, 1)),
            }
        }
        runs
    }
}
