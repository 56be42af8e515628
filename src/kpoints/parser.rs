/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! Parser for the KPOINTS file format
//!
//! Line roles, in order: title, number-of-points (0 selects mesh mode),
//! mode keyword (matched on its first character, case-insensitively), then
//! the mode-dependent payload. Mesh mode reads a dimensions line and an
//! optional shift line; list mode reads exactly N point lines with an
//! optional trailing weight and label per point.

use std::fs;
use std::path::Path;

use log::debug;

use super::model::{CoordSystem, KpointsSpec, MeshStyle, Sampling};
use crate::errors::{Result, VaspIoError};

/// Parse a KPOINTS file from disk.
pub fn parse_kpoints<P: AsRef<Path>>(path: P) -> Result<KpointsSpec> {
    let content = fs::read_to_string(path)?;
    parse_kpoints_str(&content)
}

/// Parse KPOINTS-format text.
pub fn parse_kpoints_str(content: &str) -> Result<KpointsSpec> {
    let lines: Vec<&str> = content.lines().collect();

    let comment = required_line(&lines, 0, "title line")?.trim().to_string();

    let count_line = required_line(&lines, 1, "number-of-points line")?;
    let num_points: usize = first_token(count_line, 2, "number of k-points")?
        .parse()
        .map_err(|_| {
            VaspIoError::format(
                2,
                count_line,
                "number of k-points must be a non-negative integer",
            )
        })?;

    let mode_line = required_line(&lines, 2, "mode line")?;
    let mode_char = first_token(mode_line, 3, "mode keyword")?
        .chars()
        .next()
        .unwrap_or(' ')
        .to_ascii_lowercase();

    let sampling = if num_points == 0 {
        debug!("parsing automatic mesh, mode '{}'", mode_char);
        parse_mesh(&lines, mode_char)?
    } else {
        debug!("parsing {} explicit k-points, mode '{}'", num_points, mode_char);
        parse_list(&lines, mode_char, num_points)?
    };

    KpointsSpec::from_sampling(comment, sampling)
}

fn parse_mesh(lines: &[&str], mode_char: char) -> Result<Sampling> {
    let style = match mode_char {
        'g' => MeshStyle::Gamma,
        'm' => MeshStyle::MonkhorstPack,
        _ => {
            return Err(VaspIoError::format(
                3,
                lines[2],
                "expected Gamma or Monkhorst-Pack mesh keyword",
            ))
        }
    };

    let dims_line = required_line(lines, 3, "mesh dimensions line")?;
    let dims = parse_three::<u32>(dims_line, 4, "mesh dimensions")?;

    // Absent or blank shift line defaults to zero; a present but
    // malformed one is a hard error (corrupt input must not be patched).
    let shift = match lines.get(4) {
        None => [0.0; 3],
        Some(line) if line.trim().is_empty() => [0.0; 3],
        Some(line) => parse_three::<f64>(line, 5, "mesh shift")?,
    };

    Ok(Sampling::Mesh { dims, shift, style })
}

fn parse_list(lines: &[&str], mode_char: char, num_points: usize) -> Result<Sampling> {
    let coords = match mode_char {
        'c' | 'k' => CoordSystem::Cartesian,
        'r' | 'd' => CoordSystem::Reciprocal,
        _ => {
            return Err(VaspIoError::format(
                3,
                lines[2],
                "expected Cartesian or Reciprocal coordinate keyword",
            ))
        }
    };

    // The declared count is untrusted until the point lines are actually
    // there, so cap the pre-allocation by the lines we have.
    let capacity = num_points.min(lines.len());
    let mut points = Vec::with_capacity(capacity);
    let mut weights = Vec::with_capacity(capacity);
    let mut tags: Vec<String> = Vec::with_capacity(capacity);
    let mut any_tag = false;

    for i in 0..num_points {
        let line_no = 4 + i;
        let line = lines.get(3 + i).ok_or_else(|| {
            VaspIoError::format(
                line_no,
                "",
                format!(
                    "file declares {} k-points but ends after {}",
                    num_points, i
                ),
            )
        })?;

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(VaspIoError::format(
                line_no,
                line,
                format!("expected 3 coordinates, found {} tokens", tokens.len()),
            ));
        }

        let mut point = [0.0; 3];
        for (k, tok) in tokens[..3].iter().enumerate() {
            point[k] = tok.parse().map_err(|_| {
                VaspIoError::format(line_no, line, format!("invalid coordinate {:?}", tok))
            })?;
        }
        points.push(point);

        // 4th token is a weight when numeric, otherwise a label; a label
        // may also follow the weight as a 5th token.
        let mut tag = String::new();
        match tokens.get(3) {
            Some(tok) => match tok.parse::<f64>() {
                Ok(weight) => {
                    weights.push(weight);
                    if let Some(label) = tokens.get(4) {
                        if label.parse::<f64>().is_err() {
                            tag = (*label).to_string();
                        }
                    }
                }
                Err(_) => {
                    weights.push(1.0);
                    tag = (*tok).to_string();
                }
            },
            None => weights.push(1.0),
        }
        if !tag.is_empty() {
            any_tag = true;
        }
        tags.push(tag);
    }

    Ok(Sampling::List {
        coords,
        points,
        weights,
        tags: any_tag.then_some(tags),
    })
}

fn required_line<'a>(lines: &[&'a str], index: usize, role: &str) -> Result<&'a str> {
    lines.get(index).copied().ok_or_else(|| {
        VaspIoError::format(index + 1, "", format!("missing {}", role))
    })
}

fn first_token<'a>(line: &'a str, line_no: usize, role: &str) -> Result<&'a str> {
    line.split_whitespace()
        .next()
        .ok_or_else(|| VaspIoError::format(line_no, line, format!("missing {}", role)))
}

fn parse_three<T: std::str::FromStr>(line: &str, line_no: usize, role: &str) -> Result<[T; 3]>
where
    T: Copy + Default,
{
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(VaspIoError::format(
            line_no,
            line,
            format!("expected 3 values for {}, found {}", role, tokens.len()),
        ));
    }
    let mut out = [T::default(); 3];
    for (k, tok) in tokens[..3].iter().enumerate() {
        out[k] = tok.parse().map_err(|_| {
            VaspIoError::format(line_no, line, format!("invalid value {:?} in {}", tok, role))
        })?;
    }
    Ok(out)
}
