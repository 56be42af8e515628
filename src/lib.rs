/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! # vasp-io
//!
//! Readers and writers for VASP 5 input decks.
//!
//! The core is a set of text-format codecs: [`kpoints`] converts between
//! a structured k-point specification and the KPOINTS file (automatic
//! mesh or explicit list), with [`incar`], [`poscar`] and [`potcar`]
//! covering the sibling formats. [`calc::InputSet`] assembles a full run
//! directory from those pieces. Job submission, scheduling and provenance
//! tracking are deliberately out of scope; this crate only produces and
//! consumes the files.

pub mod calc;
pub mod cli;
pub mod errors;
pub mod incar;
pub mod kpoints;
pub mod poscar;
pub mod potcar;
pub mod structure;

pub use errors::{Result, VaspIoError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
