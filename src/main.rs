use clap::{Parser, Subcommand};
use parcel_track::apis::create_carrier;
use parcel_track::client::{HttpFetch, ReqwestFetcher};
use parcel_track::common::constants::get_supported_carriers;
use parcel_track::config::{Config, DEFAULT_CONFIG_PATH};
use parcel_track::logging;
use parcel_track::server::{start_server, AppState};
use parcel_track::TrackingQuery;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "parcel_track")]
#[command(about = "Normalized parcel tracking for DPD, DHL and Hermes")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Look up a single parcel and print the normalized result
    Track {
        /// Carrier to query. Available: dpd, dhl, hermes
        carrier: String,
        parcelno: String,
        #[arg(long)]
        zip: Option<String>,
        #[arg(long)]
        locale: Option<String>,
        /// Include the raw upstream payload as `orig`
        #[arg(long)]
        include_original: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load_from(&cli.config)?;

    let _guard = logging::init_logging(&config.logging);

    let fetcher: Arc<dyn HttpFetch> =
        Arc::new(ReqwestFetcher::with_user_agent(config.upstream.user_agent.clone()));

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let state = AppState::from_config(&config.upstream, fetcher);
            start_server(&config.server, state).await?;
        }
        Commands::Track {
            carrier,
            parcelno,
            zip,
            locale,
            include_original,
        } => {
            let api = create_carrier(&carrier, &config.upstream, fetcher).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown carrier '{}'. Available: {}",
                    carrier,
                    get_supported_carriers().join(", ")
                )
            })?;

            let query = TrackingQuery::from_input(parcelno, zip, locale, include_original);
            info!("Tracking {} parcel {}", carrier, query.parcelno);

            let result = api.track(&query).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
