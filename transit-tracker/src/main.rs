use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_tracker::api::{ApiClient, ApiError};
use transit_tracker::app::Tracker;
use transit_tracker::catalog::StationCatalog;
use transit_tracker::config::{AppConfig, ConfigError};
use transit_tracker::feed::DepartureFeed;
use transit_tracker::polling::PollingController;
use transit_tracker::trips::{Geocoder, GeocoderConfig, TripPlanner};
use transit_tracker::web::{AppState, WebPresenter, create_router};

/// Anything that stops the server from coming up.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client: {0}")]
    Client(#[from] ApiError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "transit tracker failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    let client = ApiClient::new(config.api())?;

    let presenter = WebPresenter::new(config.map_center, config.default_zoom, config.error_display);

    // Polling controller runs on its own task for the life of the process
    let feed = DepartureFeed::new(client.clone(), config.feed());
    let (controller, handle) = PollingController::new(feed, presenter.clone(), config.polling());
    tokio::spawn(controller.run());

    let catalog = StationCatalog::new(client);
    let tracker = Tracker::new(catalog.clone(), handle, presenter.clone());

    info!(api = %config.api_url, city = %config.city_code, "loading station catalog");
    let stations = tracker.refresh_catalog().await;
    info!(
        count = stations.value().len(),
        live = stations.is_live(),
        "station catalog ready"
    );

    let geocoder = Geocoder::new(
        GeocoderConfig::new(&config.geocoder_url, config.map_center)
            .with_timeout(config.http_timeout_secs),
        catalog,
    )?;
    let planner = TripPlanner::new(geocoder);

    let addr = config.listen;
    let state = AppState::new(tracker, presenter, planner, config);
    let app = create_router(state, concat!(env!("CARGO_MANIFEST_DIR"), "/static"));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Novi Sad transit tracker listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
