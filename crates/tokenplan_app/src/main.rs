mod cli;
mod commands;
mod progress;
mod render;

use clap::Parser;
use engine_logging::{engine_debug, LogDestination};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // With a log file, -q only silences the terminal.
    let destination = match (cli.log_file.clone(), cli.quiet) {
        (Some(path), true) => LogDestination::File(path),
        (Some(path), false) => LogDestination::Both(path),
        (None, _) => LogDestination::Terminal,
    };
    let level = engine_logging::level_from_verbosity(cli.verbose, cli.quiet && cli.log_file.is_none());
    engine_logging::initialize(level, destination);
    engine_debug!("Parsed command line: {:?}", cli);

    commands::run(cli)
}
