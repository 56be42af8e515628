/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! KPOINTS codec
//!
//! Bidirectional conversion between [`KpointsSpec`] and the KPOINTS text
//! format: either an automatic mesh (Gamma-centered or Monkhorst-Pack,
//! with an optional origin shift) or an explicit list of k-points with
//! weights and optional labels. Parsing and serialization round-trip: a
//! serialized spec parses back to an equal spec, and a parsed file
//! serializes to the same semantic content.

mod model;
mod parser;
mod writer;

pub use model::{CoordSystem, KpointsBuilder, KpointsSpec, MeshStyle, Sampling};
pub use parser::{parse_kpoints, parse_kpoints_str};
pub use writer::{kpoints_to_string, write_kpoints};
