//! thing-tool
//!
//! Validates, normalizes and inspects HealthVault thing fragments.

use std::process::ExitCode;

use clap::Parser;
use healthvault_thing_tool::{ToolConfig, init_logging, run};

fn main() -> ExitCode {
    let config = ToolConfig::parse();
    init_logging(&config.log_level);

    let stdout = std::io::stdout();
    match run(&config, &mut stdout.lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            ExitCode::from(2)
        }
    }
}
