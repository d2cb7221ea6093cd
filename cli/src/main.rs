//! Truck registry - register trucks priced by the FIPE table
//!
//! A command-line host for `truck-core`: it executes the requests the views
//! emit and prints what they render.

mod cli;
mod commands;
mod output;
mod transport;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "truck_cli=info,truck_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
