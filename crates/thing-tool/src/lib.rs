//! # thing-tool
//!
//! A command-line front end over the standard HealthVault item types. It
//! reads thing fragments from files, decodes them with the type registered
//! for their root element (or the type given with `--type-id`) and reports,
//! rewrites or prints them. No network I/O is performed.

use std::io::Write;

use healthvault_item_types::standard_registry;
use healthvault_thing::ThingContext;
use tracing::debug;

pub mod commands;
pub mod config;

pub use config::{Command, ToolConfig};

/// Installs a stderr subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "thing_tool={level},healthvault_thing_tool={level},healthvault_thing={level},healthvault_item_types={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Runs the configured command, writing its report to `out`.
///
/// Returns `Ok(false)` when the command ran but found the input invalid.
pub fn run(config: &ToolConfig, out: &mut dyn Write) -> anyhow::Result<bool> {
    let context = ThingContext::with_settings(standard_registry()?, config.codec_settings()?);
    debug!(command = ?config.command, "running");

    match &config.command {
        Command::Types => commands::types(&context, out).map(|()| true),
        Command::Describe(args) => commands::describe(&context, &args.type_name, out).map(|()| true),
        Command::Validate(args) => commands::validate(&context, config.type_id, &args.file, out),
        Command::Normalize(args) => commands::normalize(
            &context,
            config.type_id,
            &args.file,
            args.output.as_deref(),
            out,
        ),
        Command::Inspect(args) => commands::inspect(&context, config.type_id, &args.file, out),
    }
}
