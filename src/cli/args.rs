//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Config;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser)]
#[command(name = "rws-storage")]
#[command(
    about = "Snapshot free disk space on CODAR Radial Web Suite stations and chart it",
    version
)]
pub(crate) struct Cli {
    /// Delete all cached station sessions before running
    #[arg(long, visible_alias = "refresh-cookies")]
    pub(crate) refresh_sessions: bool,

    /// Enable debug output (per-page details and parse results)
    #[arg(short = 'v', long, visible_alias = "verbose")]
    pub(crate) debug: bool,

    /// Config file (default: ~/.config/rws-storage/config.toml)
    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Credentials JSON file (default: ./credentials.json)
    #[arg(long, value_name = "FILE")]
    pub(crate) credentials: Option<PathBuf>,

    /// Directory the chart is written to (default: ./output)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub(crate) output_dir: Option<PathBuf>,

    /// Directory holding cached station sessions
    #[arg(long, value_name = "DIR")]
    pub(crate) session_dir: Option<PathBuf>,

    /// Zone for report timestamps ("local", "UTC", "-05:00", "America/New_York")
    #[arg(long, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// Print the summary as JSON instead of a table
    #[arg(short, long)]
    pub(crate) json: bool,

    /// Color output mode
    #[arg(long, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long)]
    pub(crate) no_color: bool,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        if !self.debug && config.debug {
            self.debug = true;
        }
        if !self.no_color && config.no_color {
            self.no_color = true;
        }

        if self.credentials.is_none() {
            self.credentials = config.credentials.clone();
        }
        if self.output_dir.is_none() {
            self.output_dir = config.output_dir.clone();
        }
        if self.session_dir.is_none() {
            self.session_dir = config.session_dir.clone();
        }
        if self.timezone.is_none() {
            self.timezone = config.timezone.clone();
        }

        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }
}
