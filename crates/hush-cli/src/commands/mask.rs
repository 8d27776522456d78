//! Mask command implementation.

use crate::cli::MaskArgs;
use crate::commands::read_input;
use crate::error::Result;
use hush_scrubber::config::DEFAULT_MASK_PATTERNS;
use hush_scrubber::ContentMasker;

/// Execute the mask command.
pub fn execute_mask(args: MaskArgs) -> Result<()> {
    let text = read_input(args.input.as_deref())?;
    print!("{}", mask_text(&args, &text));
    Ok(())
}

/// Mask `text` with the patterns and mode from `args`.
pub fn mask_text(args: &MaskArgs, text: &str) -> String {
    let masker = if args.patterns.is_empty() {
        ContentMasker::new(DEFAULT_MASK_PATTERNS, args.mode.into())
    } else {
        ContentMasker::new(&args.patterns, args.mode.into())
    };
    masker.mask(Some(text))
}
