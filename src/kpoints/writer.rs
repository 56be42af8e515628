/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! Writer for the KPOINTS file format

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::debug;

use super::model::{CoordSystem, KpointsSpec, MeshStyle, Sampling};
use crate::errors::Result;

/// Serialize a spec to KPOINTS-format text.
///
/// Mesh mode always emits the shift line, as explicit zeros when the shift
/// is zero, so the output stays parseable by readers that treat a missing
/// shift line as zero.
pub fn kpoints_to_string(spec: &KpointsSpec) -> String {
    let mut out = String::new();
    writeln!(out, "{}", spec.comment).unwrap();

    match spec.sampling() {
        Sampling::Mesh { dims, shift, style } => {
            writeln!(out, "0").unwrap();
            let keyword = match style {
                MeshStyle::Gamma => "Gamma",
                MeshStyle::MonkhorstPack => "Monkhorst-Pack",
            };
            writeln!(out, "{}", keyword).unwrap();
            writeln!(out, "{} {} {}", dims[0], dims[1], dims[2]).unwrap();
            writeln!(
                out,
                "{:.10} {:.10} {:.10}",
                shift[0], shift[1], shift[2]
            )
            .unwrap();
        }
        Sampling::List {
            coords,
            points,
            weights,
            tags,
        } => {
            writeln!(out, "{}", points.len()).unwrap();
            let keyword = match coords {
                CoordSystem::Reciprocal => "Reciprocal",
                CoordSystem::Cartesian => "Cartesian",
            };
            writeln!(out, "{}", keyword).unwrap();
            for (i, point) in points.iter().enumerate() {
                write!(
                    out,
                    "{:16.10} {:16.10} {:16.10} {:16.10}",
                    point[0], point[1], point[2], weights[i]
                )
                .unwrap();
                if let Some(tags) = tags {
                    if !tags[i].is_empty() {
                        write!(out, " {}", tags[i]).unwrap();
                    }
                }
                writeln!(out).unwrap();
            }
        }
    }

    out
}

/// Write a spec to a KPOINTS file, truncating any existing file.
pub fn write_kpoints<P: AsRef<Path>>(spec: &KpointsSpec, path: P) -> Result<()> {
    debug!("writing KPOINTS to {}", path.as_ref().display());
    let mut file = File::create(path)?;
    file.write_all(kpoints_to_string(spec).as_bytes())?;
    Ok(())
}
