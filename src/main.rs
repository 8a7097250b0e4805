mod app;
mod browser;
mod cli;
mod config;
mod consts;
mod core;
mod credentials;
mod error;
mod output;
mod station;
mod utils;

use clap::Parser;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = app::run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
