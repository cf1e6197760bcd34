mod locations;
mod lookup;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "geoexplorer-cli")]
#[command(about = "GeoExplorer command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch location detail for one or more DANE codes, one JSON line each
    Lookup {
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// List the departments in the local dataset
    Departments,
    /// List the municipalities of a department (name or code)
    Municipalities { department: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = geoexplorer_core::load_app_config()?;

    // stdout carries command output; logs go to stderr.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Lookup { codes } => lookup::run_lookup(&config, &codes).await,
        Commands::Departments => locations::run_departments(&config),
        Commands::Municipalities { department } => {
            locations::run_municipalities(&config, &department)
        }
    }
}
