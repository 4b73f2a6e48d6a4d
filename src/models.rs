use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============ Building Analysis: Request Models ============

/// Request payload for the building analysis endpoint.
#[derive(Debug, Deserialize)]
pub struct AnalyzeBuildingRequest {
    /// Street address of the building. Pinned verbatim into the model
    /// instruction; the model is told not to infer it from the imagery.
    #[serde(default = "default_address")]
    pub address: String,
    /// Ordered image references. The first image is conventionally the
    /// top-down view, subsequent images street-level.
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

fn default_address() -> String {
    "TBD".to_string()
}

/// A single input image: either a bare URL string or an object carrying a
/// URL plus a requested processing fidelity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// Bare URL form.
    Url(String),
    /// Object form with optional detail level.
    Detailed {
        url: String,
        #[serde(default)]
        detail: ImageDetail,
    },
}

impl ImageRef {
    /// The image URL regardless of form.
    pub fn url(&self) -> &str {
        match self {
            ImageRef::Url(url) => url,
            ImageRef::Detailed { url, .. } => url,
        }
    }

    /// The requested processing fidelity (`auto` for the bare form).
    pub fn detail(&self) -> ImageDetail {
        match self {
            ImageRef::Url(_) => ImageDetail::Auto,
            ImageRef::Detailed { detail, .. } => *detail,
        }
    }
}

/// Processing fidelity requested from the vision provider per image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    #[default]
    Auto,
    Low,
    High,
}

impl ImageDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageDetail::Auto => "auto",
            ImageDetail::Low => "low",
            ImageDetail::High => "high",
        }
    }
}

// ============ Building Analysis: Output Models ============

/// Architectural style categories the model must choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchitecturalStyle {
    PrewarMasonry,
    ArtDeco,
    Modernist,
    Brutalist,
    Postmodern,
    PostwarCommercial,
    ContemporaryGlass,
    IndustrialLoft,
    TownhouseRowhouse,
    VernacularOther,
    Unknown,
}

/// Facade material categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacadeMaterial {
    Glass,
    Brick,
    Stone,
    Concrete,
    MetalPanel,
    CompositePanel,
    Stucco,
    Wood,
    Terracotta,
    Other,
}

/// Building program (use) categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    Residential,
    Office,
    Retail,
    Hotel,
    Industrial,
    Parking,
    Institutional,
    Civic,
    Community,
    MechanicalOther,
    Unknown,
}

/// One entry of the facade material mix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacadeMaterialShare {
    /// Material category.
    pub material: FacadeMaterial,
    /// Estimated percentage of total visible facade area (0-100).
    pub percent: f64,
}

/// One entry of the program mix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramShare {
    /// Program category.
    pub program: ProgramType,
    /// Estimated percentage of total building area (0-100).
    pub percent: f64,
}

/// Model confidence per estimated field group, each 0-1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceScores {
    pub num_floors: f64,
    pub window_to_wall_ratio: f64,
    pub architectural_style: f64,
    pub estimated_building_age: f64,
    pub facade_material_mix: f64,
    pub program_mix: f64,
}

impl ConfidenceScores {
    fn collect_violations(&self, errors: &mut Vec<String>) {
        for (field, value) in [
            ("num_floors", self.num_floors),
            ("window_to_wall_ratio", self.window_to_wall_ratio),
            ("architectural_style", self.architectural_style),
            ("estimated_building_age", self.estimated_building_age),
            ("facade_material_mix", self.facade_material_mix),
            ("program_mix", self.program_mix),
        ] {
            if !(value >= 0.0 && value <= 1.0) {
                errors.push(format!(
                    "combined_matrix.confidence_scores.{}: must be between 0 and 1 (got {})",
                    field, value
                ));
            }
        }
    }
}

/// Structured building description produced by the vision model.
///
/// Category membership is enforced by the enums at parse time; numeric
/// ranges are checked by `validate`, which reports every violation so the
/// caller sees the full diff rather than the first failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingAnalysis {
    /// Street address, echoed from the request.
    pub address: String,
    /// Total number of above-grade floors.
    pub num_floors: i64,
    /// Ratio of glazed area to total facade area (0-1).
    pub window_to_wall_ratio: f64,
    /// Closest-fit architectural style.
    pub architectural_style: ArchitecturalStyle,
    /// Short free-text explanation of key stylistic qualities.
    pub architectural_style_add: String,
    /// Single year like "1975" or a range like "1960-1980".
    pub estimated_building_age: String,
    /// Facade material shares. Items should sum to ~100; the sum is
    /// model-estimated and deliberately not enforced.
    pub facade_material_mix: Vec<FacadeMaterialShare>,
    /// Program shares. Same advisory-sum convention as the facade mix.
    pub program_mix: Vec<ProgramShare>,
    /// Per-field-group confidence.
    pub confidence_scores: ConfidenceScores,
    /// Free-text assumptions and uncertainties.
    pub notes: String,
}

impl BuildingAnalysis {
    /// Collects every numeric-range and structural violation.
    ///
    /// An empty result means the analysis conforms to the schema.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.num_floors < 1 {
            errors.push(format!(
                "combined_matrix.num_floors: must be a positive integer (got {})",
                self.num_floors
            ));
        }
        if !(self.window_to_wall_ratio >= 0.0 && self.window_to_wall_ratio <= 1.0) {
            errors.push(format!(
                "combined_matrix.window_to_wall_ratio: must be between 0 and 1 (got {})",
                self.window_to_wall_ratio
            ));
        }
        if self.facade_material_mix.is_empty() {
            errors.push("combined_matrix.facade_material_mix: must not be empty".to_string());
        }
        for (i, share) in self.facade_material_mix.iter().enumerate() {
            if !(share.percent >= 0.0 && share.percent <= 100.0) {
                errors.push(format!(
                    "combined_matrix.facade_material_mix[{}].percent: must be between 0 and 100 (got {})",
                    i, share.percent
                ));
            }
        }
        if self.program_mix.is_empty() {
            errors.push("combined_matrix.program_mix: must not be empty".to_string());
        }
        for (i, share) in self.program_mix.iter().enumerate() {
            if !(share.percent >= 0.0 && share.percent <= 100.0) {
                errors.push(format!(
                    "combined_matrix.program_mix[{}].percent: must be between 0 and 100 (got {})",
                    i, share.percent
                ));
            }
        }
        self.confidence_scores.collect_violations(&mut errors);

        errors
    }
}

/// The normalized analysis payload: always the bare `combined_matrix` form,
/// whichever shape the provider actually returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedMatrix {
    pub combined_matrix: BuildingAnalysis,
}

/// Token accounting reported by the model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response payload for the building analysis endpoint.
#[derive(Debug, Serialize)]
pub struct AnalyzeBuildingResponse {
    /// Whether the analysis succeeded.
    pub success: bool,
    /// The validated, normalized analysis.
    pub data: CombinedMatrix,
    /// Token accounting, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

// ============ Geo-Enrichment: Request Models ============

/// Request payload for the geo-enrichment endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchOsmDataRequest {
    /// Latitude of the query point, degrees in [-90, 90].
    pub latitude: f64,
    /// Longitude of the query point, degrees in [-180, 180].
    pub longitude: f64,
    /// Search radius in meters; defaults to 600 when absent.
    pub radius: Option<f64>,
}

impl FetchOsmDataRequest {
    /// Collects every out-of-range or malformed input field.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.latitude >= -90.0 && self.latitude <= 90.0) {
            errors.push(format!(
                "latitude: must be between -90 and 90 (got {})",
                self.latitude
            ));
        }
        if !(self.longitude >= -180.0 && self.longitude <= 180.0) {
            errors.push(format!(
                "longitude: must be between -180 and 180 (got {})",
                self.longitude
            ));
        }
        if let Some(radius) = self.radius {
            if !(radius.is_finite() && radius > 0.0) {
                errors.push(format!("radius: must be a positive number (got {})", radius));
            }
        }

        errors
    }
}

// ============ Geo-Enrichment: Output Models ============

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub lat: f64,
    pub lng: f64,
}

/// A classified point of interest near the query coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiItem {
    /// Display name, resolved from tags with a per-category fallback.
    pub name: String,
    /// Great-circle distance from the query point, rounded to the nearest
    /// meter; absent when the element carries no coordinate.
    pub distance_m: Option<i64>,
    /// Element coordinate (own position, else bounding center).
    pub geolocation: Option<Geolocation>,
}

/// The six categorized POI lists.
///
/// Within each list entries are unique by (name, geolocation); the key
/// deliberately ignores category, so the same name and coordinate may appear
/// in two different lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Highlights {
    pub bus_stops: Vec<PoiItem>,
    pub subway_stations: Vec<PoiItem>,
    pub schools: Vec<PoiItem>,
    pub groceries: Vec<PoiItem>,
    pub parks: Vec<PoiItem>,
    pub churches: Vec<PoiItem>,
}

impl Highlights {
    /// Category lists paired with their field names, in output order.
    pub fn categories(&self) -> [(&'static str, &Vec<PoiItem>); 6] {
        [
            ("bus_stops", &self.bus_stops),
            ("subway_stations", &self.subway_stations),
            ("schools", &self.schools),
            ("groceries", &self.groceries),
            ("parks", &self.parks),
            ("churches", &self.churches),
        ]
    }
}

/// Reverse-geocoded place metadata; each sub-field is individually nullable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInfo {
    pub display_name: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

/// Echo of the (possibly defaulted) enrichment query inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueryInput {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
}

/// Full geo-enrichment payload for one query coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsmData {
    /// Exact echo of the query inputs.
    pub input: QueryInput,
    /// Reverse-geocoded location summary.
    pub location: LocationInfo,
    /// Categorized, deduplicated nearby points of interest.
    pub highlights: Highlights,
    /// RFC 3339 UTC timestamp of when the data was assembled.
    pub fetched_at: String,
}

impl OsmData {
    /// Defensive output check before the payload leaves the service.
    ///
    /// Construction from validated inputs should never trip this; a
    /// non-empty result is surfaced as an internal validation error rather
    /// than returned to the caller.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.input.lat >= -90.0 && self.input.lat <= 90.0) {
            errors.push(format!("input.lat: out of range (got {})", self.input.lat));
        }
        if !(self.input.lng >= -180.0 && self.input.lng <= 180.0) {
            errors.push(format!("input.lng: out of range (got {})", self.input.lng));
        }
        if !(self.input.radius_m.is_finite() && self.input.radius_m > 0.0) {
            errors.push(format!(
                "input.radius_m: must be positive (got {})",
                self.input.radius_m
            ));
        }
        if self.fetched_at.is_empty() {
            errors.push("fetched_at: must not be empty".to_string());
        }
        for (category, items) in self.highlights.categories() {
            for (i, item) in items.iter().enumerate() {
                if let Some(distance) = item.distance_m {
                    if distance < 0 {
                        errors.push(format!(
                            "highlights.{}[{}].distance_m: must be non-negative (got {})",
                            category, i, distance
                        ));
                    }
                }
                if let Some(geo) = item.geolocation {
                    if !geo.lat.is_finite() || !geo.lng.is_finite() {
                        errors.push(format!(
                            "highlights.{}[{}].geolocation: coordinates must be finite",
                            category, i
                        ));
                    }
                }
            }
        }

        errors
    }
}

/// Response payload for the geo-enrichment endpoint.
#[derive(Debug, Serialize)]
pub struct FetchOsmDataResponse {
    /// Whether the enrichment succeeded.
    pub success: bool,
    /// The assembled, validated enrichment data.
    pub data: OsmData,
}

// ============ Upstream Wire Models ============

/// Address subfields of a Nominatim reverse-geocoding response.
///
/// Only the fields the location summary needs; everything else in the
/// Nominatim payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

/// Nominatim reverse-geocoding response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimReverse {
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: NominatimAddress,
}

impl NominatimReverse {
    /// City with Nominatim's town/village fallback chain applied.
    pub fn city(&self) -> Option<String> {
        self.address
            .city
            .clone()
            .or_else(|| self.address.town.clone())
            .or_else(|| self.address.village.clone())
    }
}

/// Center coordinate Overpass reports for ways and relations.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

/// One tagged element from an Overpass radius query.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    /// Own coordinate (nodes).
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Bounding center (ways, relations).
    pub center: Option<OverpassCenter>,
    /// OSM tags; elements without tags match no category.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Overpass query response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}
