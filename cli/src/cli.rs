//! CLI argument definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trucks")]
#[command(author, version, about = "Register and list trucks priced by the FIPE table", long_about = None)]
pub struct Cli {
    /// Backend base URL (the `/api` prefix is added automatically)
    #[arg(long, global = true, env = "TRUCKS_API_URL", default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true, env = "TRUCKS_HTTP_TIMEOUT_SECS", default_value_t = 8)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered trucks
    List,

    /// Register a truck
    Create {
        /// License plate (AAA-1234 or AAA1A23)
        #[arg(long)]
        plate: String,

        /// Brand code or name
        #[arg(long)]
        brand: String,

        /// Model code or name
        #[arg(long)]
        model: String,

        /// Year code, label or plain year (e.g. 2022)
        #[arg(long)]
        year: String,
    },

    /// Change brand, model or year of a registered truck
    Edit {
        /// Truck id
        id: i64,

        /// Brand code or name (requires --model and --year)
        #[arg(long, requires_all = ["model", "year"])]
        brand: Option<String>,

        /// Model code or name (requires --year)
        #[arg(long, requires = "year")]
        model: Option<String>,

        /// Year code, label or plain year
        #[arg(long)]
        year: Option<String>,
    },

    /// List FIPE brands
    Brands,

    /// List FIPE models of a brand
    Models {
        /// Brand code or name
        #[arg(long)]
        brand: String,
    },

    /// List FIPE years of a model
    Years {
        /// Brand code or name
        #[arg(long)]
        brand: String,

        /// Model code or name
        #[arg(long)]
        model: String,
    },
}
