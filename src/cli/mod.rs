/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! Command-line interface
//!
//! Three small tools over the codecs: `inspect` parses one file and prints
//! a summary, `roundtrip` re-serializes a KPOINTS file, and `check`
//! validates every recognized input file in a run directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::warn;

use crate::incar::{self, Incar};
use crate::kpoints::{self, Sampling};
use crate::poscar;
use crate::potcar;

#[derive(Parser)]
#[command(name = "vasp-io", version, about = "Read, write and check VASP input decks")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a VASP input file (format detected from its name) and print
    /// a summary
    Inspect {
        /// KPOINTS, INCAR, POSCAR/CONTCAR or POTCAR file
        file: PathBuf,
    },
    /// Parse a KPOINTS file and serialize it back out
    Roundtrip {
        file: PathBuf,
        /// Destination path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Parse every recognized input file in a run directory
    Check {
        dir: PathBuf,
        /// Optional JSON object of INCAR parameters to validate
        #[arg(long)]
        parameters: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect { file } => inspect(&file),
        Command::Roundtrip { file, output } => {
            let spec = kpoints::parse_kpoints(&file)
                .with_context(|| format!("failed to parse {}", file.display()))?;
            kpoints::write_kpoints(&spec, &output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("{} -> {}", file.display(), output.display());
            Ok(())
        }
        Command::Check { dir, parameters } => check(&dir, parameters.as_deref()),
    }
}

fn inspect(file: &Path) -> anyhow::Result<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_uppercase();

    if name.contains("KPOINTS") {
        let spec = kpoints::parse_kpoints(file)?;
        println!("KPOINTS: {}", spec.comment);
        match spec.sampling() {
            Sampling::Mesh { dims, shift, style } => {
                println!(
                    "  {:?} mesh {}x{}x{}, shift {:?}",
                    style, dims[0], dims[1], dims[2], shift
                );
            }
            Sampling::List { points, .. } => {
                println!("  explicit list of {} k-points", points.len());
            }
        }
    } else if name.contains("INCAR") {
        let params = incar::parse_incar(file)?;
        println!("INCAR: {} tags", params.len());
        for (tag, value) in params.iter() {
            println!("  {} = {}", tag.to_uppercase(), value);
        }
        params.unknown_tags();
    } else if name.contains("POSCAR") || name.contains("CONTCAR") {
        let structure = poscar::parse_poscar(file)?;
        println!("POSCAR: {}", structure.comment);
        for (symbol, count) in structure.symbol_counts() {
            println!("  {} x{}", symbol, count);
        }
    } else if name.contains("POTCAR") {
        let blocks = potcar::parse_potcar(file)?;
        println!("POTCAR: {} species", blocks.len());
        for block in &blocks {
            println!(
                "  {} {} (ZVAL {})",
                block.functional, block.symbol, block.valence
            );
        }
    } else {
        bail!("cannot tell the format of {} from its name", file.display());
    }
    Ok(())
}

fn check(dir: &Path, parameters: Option<&Path>) -> anyhow::Result<()> {
    let mut failures = 0usize;
    let mut checked = 0usize;

    let report = |name: &str, result: anyhow::Result<()>, failures: &mut usize| match result {
        Ok(()) => println!("  ok {}", name),
        Err(err) => {
            println!("  FAIL {}: {:#}", name, err);
            *failures += 1;
        }
    };

    let kpoints_path = dir.join("KPOINTS");
    if kpoints_path.is_file() {
        checked += 1;
        report(
            "KPOINTS",
            kpoints::parse_kpoints(&kpoints_path)
                .map(|_| ())
                .map_err(Into::into),
            &mut failures,
        );
    }
    let incar_path = dir.join("INCAR");
    if incar_path.is_file() {
        checked += 1;
        report(
            "INCAR",
            incar::parse_incar(&incar_path)
                .map(|params| {
                    params.unknown_tags();
                })
                .map_err(Into::into),
            &mut failures,
        );
    }
    let poscar_path = dir.join("POSCAR");
    if poscar_path.is_file() {
        checked += 1;
        report(
            "POSCAR",
            poscar::parse_poscar(&poscar_path)
                .map(|_| ())
                .map_err(Into::into),
            &mut failures,
        );
    }
    let potcar_path = dir.join("POTCAR");
    if potcar_path.is_file() {
        checked += 1;
        report(
            "POTCAR",
            potcar::parse_potcar(&potcar_path)
                .map(|_| ())
                .map_err(Into::into),
            &mut failures,
        );
    }

    if let Some(path) = parameters {
        checked += 1;
        let result = (|| -> anyhow::Result<()> {
            let text = std::fs::read_to_string(path)?;
            let json: serde_json::Value = serde_json::from_str(&text)?;
            let params = Incar::from_json(&json)?;
            params.unknown_tags();
            Ok(())
        })();
        report("parameters", result, &mut failures);
    }

    if checked == 0 {
        warn!("no recognized input files in {}", dir.display());
    }
    if failures > 0 {
        bail!("{} of {} checks failed", failures, checked);
    }
    println!("{} checks passed", checked);
    Ok(())
}
