/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! POSCAR codec
//!
//! Reads and writes the VASP 5 POSCAR format: comment, universal scaling
//! factor, three lattice-vector lines, element-symbol line, per-element
//! count line, optional `Selective dynamics` marker, `Direct`/`Cartesian`
//! mode line, then one position line per atom. Selective-dynamics flags
//! are tolerated on parse and not round-tripped; VASP 4 files without a
//! symbol line are rejected rather than guessed at.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::Path;

use log::debug;

use crate::errors::{Result, VaspIoError};
use crate::structure::{Lattice, Site, Structure};

/// Parse a POSCAR file from disk.
pub fn parse_poscar<P: AsRef<Path>>(path: P) -> Result<Structure> {
    let content = fs::read_to_string(path)?;
    parse_poscar_str(&content)
}

/// Parse POSCAR-format text.
pub fn parse_poscar_str(content: &str) -> Result<Structure> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 8 {
        return Err(VaspIoError::format(
            lines.len() + 1,
            "",
            "POSCAR requires at least 8 lines",
        ));
    }

    let comment = lines[0].trim().to_string();

    let scale: f64 = lines[1].trim().parse().map_err(|_| {
        VaspIoError::format(2, lines[1], "invalid scaling factor")
    })?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(VaspIoError::format(
            2,
            lines[1],
            "volume-mode (non-positive) scaling is not supported",
        ));
    }

    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        *row = parse_reals(lines[2 + i], 3 + i, "lattice vector")?;
    }
    let lattice = Lattice::with_scale(matrix, scale)?;

    // VASP 5 symbol line; an all-integer line here means a VASP 4 file.
    let symbols: Vec<&str> = lines[5].split_whitespace().collect();
    if symbols.is_empty() {
        return Err(VaspIoError::format(6, lines[5], "missing element symbols"));
    }
    if symbols.iter().all(|s| s.parse::<usize>().is_ok()) {
        return Err(VaspIoError::format(
            6,
            lines[5],
            "VASP 4 POSCAR without an element-symbol line is not supported",
        ));
    }

    let count_tokens: Vec<&str> = lines[6].split_whitespace().collect();
    if count_tokens.len() != symbols.len() {
        return Err(VaspIoError::format(
            7,
            lines[6],
            format!(
                "expected {} atom counts, found {}",
                symbols.len(),
                count_tokens.len()
            ),
        ));
    }
    let mut counts = Vec::with_capacity(count_tokens.len());
    for tok in &count_tokens {
        let count: usize = tok.parse().map_err(|_| {
            VaspIoError::format(7, lines[6], format!("invalid atom count {:?}", tok))
        })?;
        if count == 0 {
            return Err(VaspIoError::format(7, lines[6], "atom count must be positive"));
        }
        counts.push(count);
    }

    // Optional selective-dynamics marker before the coordinate mode line.
    let mut cursor = 7;
    let mode_char = |line: &str| {
        line.trim()
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or(' ')
    };
    if mode_char(lines[cursor]) == 's' {
        cursor += 1;
        if cursor >= lines.len() {
            return Err(VaspIoError::format(
                cursor + 1,
                "",
                "missing coordinate mode line",
            ));
        }
    }
    let cartesian = match mode_char(lines[cursor]) {
        'd' => false,
        'c' | 'k' => true,
        _ => {
            return Err(VaspIoError::format(
                cursor + 1,
                lines[cursor],
                "expected Direct or Cartesian coordinate mode",
            ))
        }
    };
    cursor += 1;

    // Declared counts are untrusted until the position lines are actually
    // there: sum without overflow and cap the pre-allocation by the lines
    // we have.
    let total = counts
        .iter()
        .fold(0usize, |acc, &count| acc.saturating_add(count));
    let mut sites = Vec::with_capacity(total.min(lines.len()));
    let mut line_index = cursor;
    for (symbol, count) in symbols.iter().zip(&counts) {
        for _ in 0..*count {
            let line = lines.get(line_index).ok_or_else(|| {
                VaspIoError::format(
                    line_index + 1,
                    "",
                    format!("file declares {} atoms but ends after {}", total, sites.len()),
                )
            })?;
            let position = parse_reals(line, line_index + 1, "atom position")?;
            sites.push(Site::new(*symbol, position));
            line_index += 1;
        }
    }

    debug!("parsed POSCAR: {} atoms, {} species", total, symbols.len());

    let mut structure = Structure::new(comment, lattice, sites)?;
    structure.cartesian = cartesian;
    Ok(structure)
}

fn parse_reals(line: &str, line_no: usize, role: &str) -> Result<[f64; 3]> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(VaspIoError::format(
            line_no,
            line,
            format!("expected 3 values for {}, found {}", role, tokens.len()),
        ));
    }
    let mut out = [0.0; 3];
    for (k, tok) in tokens[..3].iter().enumerate() {
        out[k] = tok.parse().map_err(|_| {
            VaspIoError::format(line_no, line, format!("invalid value {:?} in {}", tok, role))
        })?;
    }
    Ok(out)
}

/// Serialize a structure to POSCAR text.
pub fn poscar_to_string(structure: &Structure) -> String {
    let mut out = String::new();
    writeln!(out, "{}", structure.comment).unwrap();
    writeln!(out, "{}", structure.lattice.scale).unwrap();
    for row in &structure.lattice.matrix {
        writeln!(out, "{:22.16} {:22.16} {:22.16}", row[0], row[1], row[2]).unwrap();
    }
    let runs = structure.symbol_counts();
    let symbols: Vec<&str> = runs.iter().map(|(s, _)| *s).collect();
    let counts: Vec<String> = runs.iter().map(|(_, c)| c.to_string()).collect();
    writeln!(out, "{}", symbols.join(" ")).unwrap();
    writeln!(out, "{}", counts.join(" ")).unwrap();
    writeln!(
        out,
        "{}",
        if structure.cartesian { "Cartesian" } else { "Direct" }
    )
    .unwrap();
    for site in &structure.sites {
        writeln!(
            out,
            "{:18.10} {:18.10} {:18.10}",
            site.position[0], site.position[1], site.position[2]
        )
        .unwrap();
    }
    out
}

/// Write a structure to a POSCAR file, truncating any existing file.
pub fn write_poscar<P: AsRef<Path>>(structure: &Structure, path: P) -> Result<()> {
    debug!("writing POSCAR to {}", path.as_ref().display());
    let mut file = File::create(path)?;
    file.write_all(poscar_to_string(structure).as_bytes())?;
    Ok(())
}
