//! The thin command surface over the ingestor: a single `pack` subcommand,
//! nothing more.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::ingest::{pack_directory, IngestOptions};

#[derive(Debug, Parser)]
#[command(name = "streamdb", about = "Pack a directory tree into a StreamDb container")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pack a directory tree into a single .sdb file.
    Pack {
        input_dir: PathBuf,
        output_sdb: PathBuf,
        #[arg(long)]
        no_compression: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Pack { input_dir, output_sdb, no_compression } => {
            let options = IngestOptions { use_compression: !no_compression, ..IngestOptions::default() };
            let count = pack_directory(&input_dir, &options, &output_sdb)?;
            log::info!("packed {count} documents into {}", output_sdb.display());
            println!("packed {count} documents into {}", output_sdb.display());
            Ok(())
        }
    }
}
