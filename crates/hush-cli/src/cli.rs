//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use hush_domain::ScrubMode;
use std::path::PathBuf;

/// Hush - scrub sensitive and non-essential content from conversation records.
#[derive(Debug, Parser)]
#[command(name = "hush")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Project, mask and rewrite a document using a TOML config
    Run(RunArgs),

    /// Apply a projection rule set to a document
    Project(ProjectArgs),

    /// Mask patterns in free text
    Mask(MaskArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// TOML configuration file
    #[arg(short, long, env = "HUSH_CONFIG")]
    pub config: PathBuf,

    /// Override the configured mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Skip the rewrite pass; no provider is contacted
    #[arg(long)]
    pub offline: bool,

    /// Print the run summary to stderr
    #[arg(short, long)]
    pub summary: bool,

    /// Document file (JSON); reads stdin when omitted
    pub input: Option<PathBuf>,
}

/// Arguments for the project command.
#[derive(Debug, Parser)]
pub struct ProjectArgs {
    /// JSON file holding `{"analysis": [{"fields": [...], "action": "keep"}]}`
    #[arg(short, long)]
    pub rules: PathBuf,

    /// Document file (JSON); reads stdin when omitted
    pub input: Option<PathBuf>,
}

/// Arguments for the mask command.
#[derive(Debug, Parser)]
pub struct MaskArgs {
    /// Pattern to mask (repeatable); defaults to SSN:, Credit Card:, Password:
    #[arg(short, long = "pattern")]
    pub patterns: Vec<String>,

    /// Marker style
    #[arg(short, long, value_enum, default_value = "redact")]
    pub mode: ModeArg,

    /// Text file; reads stdin when omitted
    pub input: Option<PathBuf>,
}

/// Mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Replace sensitive content with [REDACTED]
    Redact,
    /// Reduce content to what is essential
    Minimize,
}

impl From<ModeArg> for ScrubMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Redact => ScrubMode::Redact,
            ModeArg::Minimize => ScrubMode::Minimize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from([
            "hush",
            "run",
            "--config",
            "hush.toml",
            "--mode",
            "minimize",
            "--offline",
            "vcon.json",
        ]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.config, PathBuf::from("hush.toml"));
                assert_eq!(args.mode, Some(ModeArg::Minimize));
                assert!(args.offline);
                assert_eq!(args.input, Some(PathBuf::from("vcon.json")));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_mask_command_repeated_patterns() {
        let cli = Cli::parse_from(["hush", "--compact", "mask", "-p", "SSN:", "-p", "PIN:"]);
        assert!(cli.compact);
        match cli.command {
            Command::Mask(args) => {
                assert_eq!(args.patterns, vec!["SSN:", "PIN:"]);
                assert_eq!(args.mode, ModeArg::Redact);
                assert!(args.input.is_none());
            }
            _ => panic!("Expected Mask command"),
        }
    }

    #[test]
    fn test_project_requires_rules() {
        assert!(Cli::try_parse_from(["hush", "project", "doc.json"]).is_err());
    }

    #[test]
    fn test_mode_conversion() {
        let mode: ScrubMode = ModeArg::Minimize.into();
        assert_eq!(mode, ScrubMode::Minimize);
    }
}
