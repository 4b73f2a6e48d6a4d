use crate::analysis::normalize_analysis_payload;
use crate::errors::AppError;
use crate::highlights::extract_highlights;
use crate::models::*;
use crate::openai_client::OpenAiVisionClient;
use crate::services::{NominatimService, OverpassService};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;

/// Search radius applied when the request omits one, in meters.
pub const DEFAULT_RADIUS_M: f64 = 600.0;

/// Shared application state injected into handlers.
///
/// Deliberately just configuration: requests are isolated, provider clients
/// are constructed per request, and nothing is cached across requests.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "neighbor-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/analyze-building
///
/// Submits the supplied images to the vision model with an instruction block
/// pinning the caller's address, then validates and normalizes the returned
/// combined matrix.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - Address plus ordered image references.
///
/// # Returns
///
/// * `Result<Json<AnalyzeBuildingResponse>, AppError>` - The validated
///   analysis plus token accounting, or an error.
pub async fn analyze_building(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeBuildingRequest>,
) -> Result<Json<AnalyzeBuildingResponse>, AppError> {
    tracing::info!(
        "POST /api/analyze-building - address: '{}', {} image(s)",
        payload.address,
        payload.images.len()
    );

    // Input guard runs before any outbound call
    if payload.images.is_empty() {
        return Err(AppError::BadRequest("No images provided".to_string()));
    }

    let client = OpenAiVisionClient::new(&state.config)?;
    let completion = client
        .analyze_building(&payload.address, &payload.images)
        .await?;

    let content = completion.first_content().ok_or_else(|| {
        AppError::UpstreamFormat("No content received from model provider".to_string())
    })?;

    let raw: serde_json::Value = serde_json::from_str(content).map_err(|e| {
        AppError::UpstreamFormat(format!("Invalid JSON response from model provider: {}", e))
    })?;

    let data = normalize_analysis_payload(raw)?;

    tracing::info!(
        "Building analysis validated for '{}': {} floors, style {:?}",
        payload.address,
        data.combined_matrix.num_floors,
        data.combined_matrix.architectural_style
    );

    Ok(Json(AnalyzeBuildingResponse {
        success: true,
        data,
        usage: completion.usage,
    }))
}

/// POST /api/fetch-osm-data
///
/// Reverse-geocodes the coordinate and collects categorized nearby points of
/// interest within the radius. The two upstream lookups are independent and
/// issued concurrently; both must succeed.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - Coordinate plus optional radius in meters.
///
/// # Returns
///
/// * `Result<Json<FetchOsmDataResponse>, AppError>` - Location summary and
///   highlights, or an error.
pub async fn fetch_osm_data(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FetchOsmDataRequest>,
) -> Result<Json<FetchOsmDataResponse>, AppError> {
    tracing::info!(
        "POST /api/fetch-osm-data - ({}, {}), radius: {:?}",
        payload.latitude,
        payload.longitude,
        payload.radius
    );

    // Range validation runs before any outbound call
    let violations = payload.validate();
    if !violations.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Invalid request parameters: {}",
            violations.join("; ")
        )));
    }

    let radius = payload.radius.unwrap_or(DEFAULT_RADIUS_M);

    let nominatim = NominatimService::new(&state.config);
    let overpass = OverpassService::new(&state.config);

    let (reverse, spatial) = tokio::join!(
        nominatim.reverse(payload.latitude, payload.longitude),
        overpass.radius_query(payload.latitude, payload.longitude, radius)
    );
    let reverse = reverse?;
    let spatial = spatial?;

    let origin = Geolocation {
        lat: payload.latitude,
        lng: payload.longitude,
    };
    let highlights = extract_highlights(&spatial.elements, origin);

    let data = OsmData {
        input: QueryInput {
            lat: payload.latitude,
            lng: payload.longitude,
            radius_m: radius,
        },
        location: LocationInfo {
            display_name: reverse.display_name.clone(),
            city: reverse.city(),
            county: reverse.address.county.clone(),
            state: reverse.address.state.clone(),
            postcode: reverse.address.postcode.clone(),
        },
        highlights,
        fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    let violations = data.validate();
    if !violations.is_empty() {
        return Err(AppError::InternalValidation(violations));
    }

    tracing::info!(
        "OSM data assembled for ({}, {}): {} bus stops, {} stations, {} schools, {} groceries, {} parks, {} churches",
        payload.latitude,
        payload.longitude,
        data.highlights.bus_stops.len(),
        data.highlights.subway_stations.len(),
        data.highlights.schools.len(),
        data.highlights.groceries.len(),
        data.highlights.parks.len(),
        data.highlights.churches.len()
    );

    Ok(Json(FetchOsmDataResponse {
        success: true,
        data,
    }))
}
