//! # chat-md
//!
//! Normalizes chat messages before they are rendered: drops stale legacy
//! `null` fields, attaches a parsed message tree (`md`) to each message and
//! attachment, and shows auto-translated text when the viewer asked for it.

mod cli;
mod core;
mod run;

use clap::Parser;
use dotenv::dotenv;

use crate::cli::Args;

fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    // Exit uses Display not Debug for user-facing errors
    if let Err(e) = run::run(args) {
        log::debug!("{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
