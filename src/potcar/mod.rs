/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! POTCAR handling
//!
//! A POTCAR is a concatenation of per-species pseudopotential blocks, each
//! opened by a header line like `PAW_PBE In_d 06Sep2000` and closed by an
//! `End of Dataset` line. This module parses the header metadata the input
//! builder needs (species symbol, ZVAL valence) while keeping the block
//! text verbatim, and concatenates blocks in the structure's species order.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::Path;

use log::debug;

use crate::errors::{Result, VaspIoError};
use crate::structure::Structure;

const END_OF_DATASET: &str = "End of Dataset";

/// One pseudopotential block with its header metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PotcarSpecies {
    /// Functional token from the header line, e.g. "PAW_PBE"
    pub functional: String,
    /// Full species symbol, e.g. "In_d"
    pub symbol: String,
    /// Bare element symbol, the part of `symbol` before any underscore
    pub element: String,
    /// Valence electron count (ZVAL)
    pub valence: f64,
    content: String,
}

impl PotcarSpecies {
    /// Parse a single species block from disk.
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parse a single species block.
    pub fn parse_str(content: &str) -> Result<Self> {
        let mut blocks = parse_potcar_str(content)?;
        if blocks.len() != 1 {
            return Err(VaspIoError::Validation(format!(
                "expected a single species block, found {}",
                blocks.len()
            )));
        }
        Ok(blocks.pop().unwrap())
    }

    /// The verbatim block text, terminated by its `End of Dataset` line.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Parse a (possibly multi-species) POTCAR into its blocks.
pub fn parse_potcar<P: AsRef<Path>>(path: P) -> Result<Vec<PotcarSpecies>> {
    let content = fs::read_to_string(path)?;
    parse_potcar_str(&content)
}

/// Parse POTCAR-format text into its species blocks.
pub fn parse_potcar_str(content: &str) -> Result<Vec<PotcarSpecies>> {
    let mut blocks = Vec::new();
    let mut block_lines: Vec<&str> = Vec::new();
    let mut block_start = 1;

    for (i, line) in content.lines().enumerate() {
        block_lines.push(line);
        if line.trim() == END_OF_DATASET {
            blocks.push(parse_block(&block_lines, block_start)?);
            block_lines.clear();
            block_start = i + 2;
        }
    }

    if block_lines.iter().any(|line| !line.trim().is_empty()) {
        return Err(VaspIoError::format(
            block_start,
            block_lines[0],
            "species block is not terminated by an End of Dataset line",
        ));
    }
    if blocks.is_empty() {
        return Err(VaspIoError::format(1, "", "no species blocks found"));
    }
    Ok(blocks)
}

fn parse_block(lines: &[&str], start_line: usize) -> Result<PotcarSpecies> {
    let header = lines
        .iter()
        .find(|line| !line.trim().is_empty())
        .copied()
        .ok_or_else(|| VaspIoError::format(start_line, "", "empty species block"))?;

    let mut tokens = header.split_whitespace();
    let functional = tokens.next().unwrap_or("").to_string();
    let symbol = tokens
        .next()
        .ok_or_else(|| {
            VaspIoError::format(start_line, header, "header line is missing the species symbol")
        })?
        .to_string();
    let element = symbol.split('_').next().unwrap_or(&symbol).to_string();

    let valence = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| {
            let pos = line.find("ZVAL")?;
            let rest = line[pos..].split('=').nth(1)?;
            let tok = rest.split_whitespace().next()?;
            Some((i, line, tok.parse::<f64>()))
        })
        .map(|(i, line, parsed)| {
            parsed.map_err(|_| {
                VaspIoError::format(start_line + i, line, "invalid ZVAL value")
            })
        })
        .transpose()?
        .ok_or_else(|| {
            VaspIoError::format(start_line, header, "species block has no ZVAL line")
        })?;

    let mut content = lines.join("\n");
    content.push('\n');

    Ok(PotcarSpecies {
        functional,
        symbol,
        element,
        valence,
        content,
    })
}

/// Concatenate species blocks in the structure's first-appearance order.
pub fn potcar_to_string(
    structure: &Structure,
    species: &HashMap<String, PotcarSpecies>,
) -> Result<String> {
    let mut out = String::new();
    for element in structure.unique_symbols() {
        let block = species.get(element).ok_or_else(|| {
            VaspIoError::Validation(format!("no pseudopotential provided for {}", element))
        })?;
        out.push_str(block.content());
    }
    Ok(out)
}

/// Write the concatenated POTCAR, truncating any existing file.
pub fn write_potcar<P: AsRef<Path>>(
    structure: &Structure,
    species: &HashMap<String, PotcarSpecies>,
    path: P,
) -> Result<()> {
    debug!("writing POTCAR to {}", path.as_ref().display());
    let mut file = File::create(path)?;
    file.write_all(potcar_to_string(structure, species)?.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{Lattice, Site};

    fn fake_block(functional: &str, symbol: &str, zval: f64) -> String {
        format!(
            "{func} {sym} 06Sep2000\n  {zval:.10}\n parameters from PSCTR are:\n   \
             TITEL  = {func} {sym} 06Sep2000\n   POMASS =  114.818; ZVAL   =   {zval:.3}    \
             mass and valenz\n End of Dataset\n",
            func = functional,
            sym = symbol,
            zval = zval
        )
    }

    fn inas_structure() -> Structure {
        Structure::new(
            "InAs",
            Lattice::new([[6.0, 0.0, 0.0], [0.0, 6.0, 0.0], [0.0, 0.0, 6.0]]).unwrap(),
            vec![
                Site::new("In", [0.0, 0.0, 0.0]),
                Site::new("As", [0.25, 0.25, 0.25]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_single_block() {
        let species = PotcarSpecies::parse_str(&fake_block("PAW_PBE", "In_d", 13.0)).unwrap();
        assert_eq!(species.functional, "PAW_PBE");
        assert_eq!(species.symbol, "In_d");
        assert_eq!(species.element, "In");
        assert!((species.valence - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_unterminated_block_rejected() {
        let content = "PAW_PBE In_d 06Sep2000\n  ZVAL = 13.0\n";
        assert!(matches!(
            PotcarSpecies::parse_str(content),
            Err(VaspIoError::Format { .. })
        ));
    }

    #[test]
    fn test_missing_zval_rejected() {
        let content = "PAW_PBE In_d 06Sep2000\n some line\n End of Dataset\n";
        assert!(matches!(
            PotcarSpecies::parse_str(content),
            Err(VaspIoError::Format { .. })
        ));
    }

    #[test]
    fn test_concatenation_order_and_terminators() {
        let mut species = HashMap::new();
        species.insert(
            "In".to_string(),
            PotcarSpecies::parse_str(&fake_block("PAW_PBE", "In_d", 13.0)).unwrap(),
        );
        species.insert(
            "As".to_string(),
            PotcarSpecies::parse_str(&fake_block("PAW_PBE", "As", 5.0)).unwrap(),
        );
        let text = potcar_to_string(&inas_structure(), &species).unwrap();
        assert!(text.contains("In_d"));
        assert!(text.contains("As"));
        assert_eq!(text.matches("End of Dataset").count(), 2);
        // In comes before As, matching the structure's site order
        assert!(text.find("In_d").unwrap() < text.find("PAW_PBE As").unwrap());
    }

    #[test]
    fn test_missing_species_rejected() {
        let mut species = HashMap::new();
        species.insert(
            "In".to_string(),
            PotcarSpecies::parse_str(&fake_block("PAW_PBE", "In_d", 13.0)).unwrap(),
        );
        assert!(matches!(
            potcar_to_string(&inas_structure(), &species),
            Err(VaspIoError::Validation(_))
        ));
    }

    #[test]
    fn test_multi_block_split() {
        let content = format!(
            "{}{}",
            fake_block("PAW_PBE", "In_d", 13.0),
            fake_block("PAW_PBE", "As", 5.0)
        );
        let blocks = parse_potcar_str(&content).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].element, "As");
    }
}
