//! Hush CLI - scrub conversation records from the command line.

use clap::Parser;
use hush_cli::commands;
use hush_cli::{Cli, Command, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Log to stderr so stdout stays clean JSON
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> hush_cli::Result<()> {
    let formatter = Formatter::new(cli.compact, !cli.no_color);

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &formatter),
        Command::Project(args) => commands::execute_project(args, &formatter),
        Command::Mask(args) => commands::execute_mask(args),
    }
}
