mod find;
mod host;
mod render;
mod watch;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lastcall")]
#[command(about = "Find nearby liquor stores before they close")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one discovery and print the results
    Find {
        /// Latitude of the search position
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the search position
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Print outlet records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Interactive session with refresh and closing alerts
    Watch {
        /// Latitude of the search position
        #[arg(long, allow_hyphen_values = true, requires = "lng")]
        lat: Option<f64>,
        /// Longitude of the search position
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,
        /// Turn closing alerts on at startup
        #[arg(long)]
        alerts: bool,
        /// Deny notification permission
        #[arg(long)]
        no_notify: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = lastcall_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Find { lat, lng, json } => find::run_find(&config, lat, lng, json).await,
        Commands::Watch {
            lat,
            lng,
            alerts,
            no_notify,
        } => watch::run_watch(&config, lat.zip(lng), alerts, !no_notify).await,
    }
}
