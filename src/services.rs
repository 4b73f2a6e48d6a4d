use crate::config::Config;
use crate::errors::AppError;
use crate::models::{NominatimReverse, OverpassResponse};
use reqwest::Client;
use std::time::Duration;

/// User-Agent sent to the public geodata services. Nominatim's usage policy
/// rejects anonymous clients.
const USER_AGENT: &str = "neighbor-api/1.0";

/// Reverse-geocoding timeout. The whole request fails if the lookup is
/// slower; no partial location data is synthesized.
const NOMINATIM_TIMEOUT_SECS: u64 = 8;

/// Spatial-query timeout, matching the `[timeout:25]` passed to Overpass.
const OVERPASS_TIMEOUT_SECS: u64 = 25;

/// Client for the Nominatim reverse-geocoding provider.
pub struct NominatimService {
    client: Client,
    base_url: String,
}

impl NominatimService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.nominatim_base.clone(),
        }
    }

    /// Resolves a coordinate to place metadata.
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude of the query point.
    /// * `lng` - Longitude of the query point.
    ///
    /// # Returns
    ///
    /// * `Result<NominatimReverse, AppError>` - Display name and address
    ///   subfields; each subfield individually nullable.
    pub async fn reverse(&self, lat: f64, lng: f64) -> Result<NominatimReverse, AppError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/reverse", self.base_url),
            &[
                ("format", "jsonv2"),
                ("lat", lat.to_string().as_str()),
                ("lon", lng.to_string().as_str()),
                ("addressdetails", "1"),
                ("extratags", "1"),
            ],
        )
        .map_err(|e| AppError::UpstreamError(format!("Failed to build Nominatim URL: {}", e)))?;

        tracing::info!("Reverse geocoding ({}, {})", lat, lng);

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .timeout(Duration::from_secs(NOMINATIM_TIMEOUT_SECS))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Nominatim returned error {}: {}", status, error_text);
            return Err(AppError::UpstreamError(format!(
                "Nominatim returned status {}: {}",
                status, error_text
            )));
        }

        let result: NominatimReverse = response.json().await.map_err(|e| {
            AppError::UpstreamFormat(format!("Failed to parse Nominatim response: {}", e))
        })?;

        Ok(result)
    }
}

/// Client for the Overpass spatial-query provider.
pub struct OverpassService {
    client: Client,
    base_url: String,
}

impl OverpassService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.overpass_base.clone(),
        }
    }

    /// Fetches all tagged nodes, ways, and relations within `radius` meters
    /// of the point, with center coordinates for non-node elements.
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude of the query point.
    /// * `lng` - Longitude of the query point.
    /// * `radius` - Search radius in meters.
    ///
    /// # Returns
    ///
    /// * `Result<OverpassResponse, AppError>` - The raw element list.
    pub async fn radius_query(
        &self,
        lat: f64,
        lng: f64,
        radius: f64,
    ) -> Result<OverpassResponse, AppError> {
        let query = format!(
            "[out:json][timeout:25];\n\
             (\n\
               node(around:{radius},{lat},{lng});\n\
               way(around:{radius},{lat},{lng});\n\
               relation(around:{radius},{lat},{lng});\n\
             );\n\
             out tags center;"
        );

        let url = reqwest::Url::parse_with_params(&self.base_url, &[("data", query.as_str())])
            .map_err(|e| AppError::UpstreamError(format!("Failed to build Overpass URL: {}", e)))?;

        tracing::info!("Overpass radius query ({}, {}) r={}m", lat, lng, radius);

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .timeout(Duration::from_secs(OVERPASS_TIMEOUT_SECS))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Overpass returned error {}: {}", status, error_text);
            return Err(AppError::UpstreamError(format!(
                "Overpass returned status {}: {}",
                status, error_text
            )));
        }

        let result: OverpassResponse = response.json().await.map_err(|e| {
            AppError::UpstreamFormat(format!("Failed to parse Overpass response: {}", e))
        })?;

        tracing::debug!("Overpass returned {} element(s)", result.elements.len());

        Ok(result)
    }
}
