use clap::Parser;
use streamdb::cli::{self, Cli};

fn main() -> streamdb::Result<()> {
    let _ = streamdb::logger::init();
    cli::run(Cli::parse())
}
