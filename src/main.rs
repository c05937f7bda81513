use clap::Parser;
use sable::engine::transposition::TranspositionTable;
use sable::engine::{logger, uci::Uci};
use std::path::PathBuf;

/// UCI chess engine. Point your GUI at the binary, or drive it by hand
/// with `uci` / `position` / `go` on standard input.
#[derive(Parser)]
#[command(name = "sable", version, about)]
struct Cli {
    /// Transposition table size in megabytes
    #[arg(
        long,
        default_value_t = TranspositionTable::DEFAULT_MEGABYTES as u64,
        value_parser = clap::value_parser!(u64).range(1..=4096),
    )]
    hash: u64,

    /// Append engine diagnostics to this file (also settable at runtime
    /// with `setoption name Log File`)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    logger::init();
    if let Some(path) = &cli.log_file {
        logger::set_file(Some(path));
    }
    log::info!("starting Sable {}", env!("CARGO_PKG_VERSION"));

    Uci::new(cli.hash as usize).uci_loop();
}
