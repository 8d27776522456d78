//! Run command implementation.

use crate::cli::RunArgs;
use crate::commands::read_document;
use crate::error::Result;
use crate::output::Formatter;
use hush_scrubber::{ScrubConfig, ScrubOutcome, Scrubber};
use tracing::info;

/// Execute the run command.
pub fn execute_run(args: RunArgs, formatter: &Formatter) -> Result<()> {
    let outcome = scrub(&args)?;

    if args.summary {
        eprintln!("{}", formatter.summary(&outcome.report));
    }
    println!("{}", formatter.document(&outcome.document)?);

    Ok(())
}

/// Load the config, build the scrubber and run it over the input document.
pub fn scrub(args: &RunArgs) -> Result<ScrubOutcome> {
    let config = load_config(args)?;
    let scrubber = build_scrubber(config, args.offline)?;
    let document = read_document(args.input.as_deref())?;

    Ok(scrubber.run(document))
}

/// Load the config file and apply command-line overrides.
pub fn load_config(args: &RunArgs) -> Result<ScrubConfig> {
    let mut config = ScrubConfig::from_file(&args.config)?;
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    config.validate()?;
    Ok(config)
}

/// Build a scrubber; the chat provider is only connected when there are
/// fields to rewrite and the run is not offline.
pub fn build_scrubber(config: ScrubConfig, offline: bool) -> Result<Scrubber> {
    if offline || config.transform.is_empty() {
        info!(mode = config.mode.as_str(), "rewrite pass disabled");
        return Ok(Scrubber::new(config)?);
    }
    Ok(Scrubber::connect(config)?)
}
