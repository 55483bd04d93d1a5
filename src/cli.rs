//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::{app::Options, config::DEFAULT_CONFIG_PATH};

/// Terminal configuration console for grommunio appliances
#[derive(Parser, Debug)]
#[command(name = "grommunio-console")]
#[command(version)]
pub struct Cli {
    /// Verbose logging and the last key in the footer
    #[arg(short = 'v', long)]
    pub debug: bool,

    /// Development mode: `l` on the status screen opens the menu without login
    #[arg(long)]
    pub hidden_login: bool,

    /// Settings file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            debug: self.debug,
            hidden_login: self.hidden_login,
        }
    }
}
