//! HTTP route handlers.

use askama::Template;
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::app::TrackerError;
use crate::domain::{Coord, VehicleOrder};
use crate::geolocation::ReportedFix;
use crate::polling::{ControllerClosed, Presenter};
use crate::trips::Location;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/departures", get(departures_fragment))
        .route("/api/state", get(page_state))
        .route("/api/stations", get(list_stations))
        .route("/api/stations/suggest", get(suggest_stations))
        .route("/search", post(search))
        .route("/nearby", post(nearby))
        .route("/auto-refresh", post(auto_refresh))
        .route("/visibility", post(visibility))
        .route("/stop", post(stop))
        .route("/refresh", post(refresh))
        .route("/trips", post(plan_trip))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page.
async fn index_page(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.presenter.view();
    let config = &state.config;

    let template = IndexTemplate {
        stations: view.stations.iter().map(StationOption::from_station).collect(),
        radius_meters: config.default_radius_meters,
        auto_refresh: view.status.auto_refresh,
        refresh_secs: config.refresh_interval.as_secs(),
        center_lat: config.map_center.lat(),
        center_lon: config.map_center.lon(),
        zoom: config.default_zoom,
        board: BoardView::from_view(&view, VehicleOrder::default()),
        error: view.visible_error().map(str::to_string),
    };

    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Error page for unknown paths.
async fn not_found() -> impl IntoResponse {
    let template = ErrorTemplate {
        title: "Not found".to_string(),
        message: "There is nothing at this address.".to_string(),
    };
    (
        StatusCode::NOT_FOUND,
        Html(
            template
                .render()
                .unwrap_or_else(|e| format!("Template error: {}", e)),
        ),
    )
}

/// Departures board fragment, polled by the page script.
async fn departures_fragment(
    State(state): State<AppState>,
    Query(req): Query<DeparturesQuery>,
) -> Response {
    let view = state.presenter.view();
    let template = DeparturesTemplate {
        board: BoardView::from_view(&view, req.order),
        error: view.visible_error().map(str::to_string),
    };
    askama_axum::into_response(&template)
}

/// Everything the page script needs to redraw.
async fn page_state(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse::from_view(&state.presenter.view()))
}

/// Every catalog station.
async fn list_stations(State(state): State<AppState>) -> Json<StationListResponse> {
    let stations = state.tracker.catalog().stations().await;
    Json(StationListResponse {
        stations: stations.iter().map(StationResult::from_station).collect(),
    })
}

/// Autocomplete for station names.
async fn suggest_stations(
    State(state): State<AppState>,
    Query(req): Query<SuggestQuery>,
) -> Json<StationListResponse> {
    let matches = state.tracker.suggest(&req.q).await;
    Json(StationListResponse {
        stations: matches.iter().map(StationResult::from_station).collect(),
    })
}

/// Start tracking a station.
async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    state.tracker.submit_search(form.mode, &form.value)?;
    let body = Json(StateResponse::from_view(&state.presenter.view()));
    Ok((StatusCode::ACCEPTED, body).into_response())
}

/// Rank stations around the position the browser reported.
async fn nearby(
    State(state): State<AppState>,
    Form(form): Form<NearbyForm>,
) -> Result<Json<NearbyResponse>, AppError> {
    let fix = ReportedFix::from_report(form.lat, form.lon, form.error.as_deref());
    let radius = form.distance.unwrap_or(state.config.default_radius_meters);

    let results = state.tracker.find_nearby(&fix, radius).await?;
    Ok(Json(NearbyResponse {
        stations: results.iter().map(NearbyResult::from_result).collect(),
    }))
}

async fn auto_refresh(
    State(state): State<AppState>,
    Form(form): Form<AutoRefreshForm>,
) -> Result<StatusCode, AppError> {
    state.tracker.set_auto_refresh(form.enabled)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn visibility(
    State(state): State<AppState>,
    Form(form): Form<VisibilityForm>,
) -> Result<StatusCode, AppError> {
    state.tracker.visibility_changed(form.hidden)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stop(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.tracker.stop()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn refresh(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.tracker.refresh()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Plan a trip and render the itineraries.
async fn plan_trip(
    State(state): State<AppState>,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let from = endpoint(form.from, form.from_lat, form.from_lon);
    let to = endpoint(form.to, form.to_lat, form.to_lon);
    let via = form.via.map(Location::named);

    let plan = match state.planner.plan(from, to, via).await {
        Ok(plan) => plan,
        Err(e) => {
            state.presenter.error(e.message());
            return Err(AppError::BadRequest {
                message: e.to_string(),
            });
        }
    };
    info!(summary = %plan.summary(), "planned trip");

    state.presenter.show_trip(&plan);
    let html = TripsTemplate::from_plan(&plan)
        .render()
        .map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;
    Ok(Html(html).into_response())
}

fn endpoint(name: String, lat: Option<f64>, lon: Option<f64>) -> Location {
    let coords = match (lat, lon) {
        (Some(lat), Some(lon)) => Coord::new(lat, lon).ok(),
        _ => None,
    };
    Location { name, coords }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<TrackerError> for AppError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::ControllerClosed(closed) => closed.into(),
            _ => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl From<ControllerClosed> for AppError {
    fn from(e: ControllerClosed) -> Self {
        AppError::Unavailable {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            warn!(%status, message, "request failed");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
