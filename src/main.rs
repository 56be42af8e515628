/*
MIT License

Copyright (c) 2025 vasp-io-rs developers
*/

//! Main executable for vasp-io

use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = vasp_io::cli::Cli::parse();
    vasp_io::cli::run(cli)
}
