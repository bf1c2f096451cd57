//! Command-line configuration for `thing-tool`.
//!
//! Every option can also be set through a `THING_TOOL_*` environment
//! variable; command-line values win.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use healthvault_thing::{CodecSettings, ThingTypeId};

/// Tool configuration, parsed from arguments and environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "thing-tool")]
#[command(about = "Validate, normalize and inspect HealthVault thing fragments")]
pub struct ToolConfig {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "THING_TOOL_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Thing type to decode as, instead of inferring it from the root element.
    #[arg(long, global = true, env = "THING_TOOL_TYPE_ID")]
    pub type_id: Option<ThingTypeId>,

    /// JSON file with codec settings.
    #[arg(long, global = true, env = "THING_TOOL_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Write records without validating them first.
    #[arg(long, global = true, env = "THING_TOOL_NO_VALIDATE")]
    pub no_validate: bool,

    /// Drop unknown elements and attributes instead of preserving them.
    #[arg(long, global = true, env = "THING_TOOL_DISCARD_UNKNOWN")]
    pub discard_unknown: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the registered thing types
    Types,
    /// Print the schema of one thing type as JSON
    Describe(DescribeArgs),
    /// Decode and validate a fragment
    Validate(FileArgs),
    /// Decode a fragment and write it back in canonical form
    Normalize(NormalizeArgs),
    /// Decode a fragment and print the typed record as JSON
    Inspect(FileArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DescribeArgs {
    /// Type id or root element name
    pub type_name: String,
}

#[derive(Debug, Clone, Args)]
pub struct FileArgs {
    /// Fragment file to read
    pub file: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct NormalizeArgs {
    /// Fragment file to read
    pub file: PathBuf,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ToolConfig {
    /// Codec settings: the settings file if given, then command-line
    /// overrides.
    pub fn codec_settings(&self) -> anyhow::Result<CodecSettings> {
        let mut settings = match &self.settings {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading settings file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing settings file {}", path.display()))?
            }
            None => CodecSettings::default(),
        };
        if self.no_validate {
            settings.validate_before_write = false;
        }
        if self.discard_unknown {
            settings.preserve_unknown_content = false;
        }
        Ok(settings)
    }
}
