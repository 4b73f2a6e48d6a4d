//! POI extraction over raw Overpass elements: tag classification into the
//! six highlight categories, great-circle distances from the query point,
//! and per-category deduplication.

use crate::models::{Geolocation, Highlights, OverpassElement, PoiItem};
use std::collections::{HashMap, HashSet};

/// Earth's mean radius in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

type Tags = HashMap<String, String>;

/// Great-circle (haversine) distance between two points in meters.
#[inline]
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// The six output categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    BusStops,
    SubwayStations,
    Schools,
    Groceries,
    Parks,
    Churches,
}

/// One classification rule: an independent tag predicate plus the naming
/// fallbacks for elements it matches. Rules are evaluated independently, so
/// one element may land in several categories.
struct CategoryRule {
    bucket: Bucket,
    generic_label: &'static str,
    /// Groceries fall back to the brand tag before the generic label.
    brand_fallback: bool,
    matches: fn(&Tags) -> bool,
}

fn tag_is(tags: &Tags, key: &str, value: &str) -> bool {
    tags.get(key).map(|v| v == value).unwrap_or(false)
}

fn is_bus_stop(tags: &Tags) -> bool {
    tag_is(tags, "highway", "bus_stop")
        || tag_is(tags, "bus", "yes")
        || tag_is(tags, "public_transport", "platform")
}

fn is_subway_station(tags: &Tags) -> bool {
    tag_is(tags, "railway", "station") || tag_is(tags, "railway", "stop")
}

fn is_school(tags: &Tags) -> bool {
    tag_is(tags, "amenity", "school")
}

fn is_park(tags: &Tags) -> bool {
    tag_is(tags, "leisure", "park")
        || tag_is(tags, "leisure", "playground")
        || tag_is(tags, "landuse", "recreation_ground")
}

fn is_grocery(tags: &Tags) -> bool {
    matches!(
        tags.get("shop").map(String::as_str),
        Some("supermarket" | "convenience" | "greengrocer" | "organic")
    ) || tag_is(tags, "amenity", "marketplace")
}

fn is_church(tags: &Tags) -> bool {
    tag_is(tags, "amenity", "place_of_worship") || tag_is(tags, "building", "church")
}

const RULES: [CategoryRule; 6] = [
    CategoryRule {
        bucket: Bucket::BusStops,
        generic_label: "Bus stop",
        brand_fallback: false,
        matches: is_bus_stop,
    },
    CategoryRule {
        bucket: Bucket::SubwayStations,
        generic_label: "Subway station",
        brand_fallback: false,
        matches: is_subway_station,
    },
    CategoryRule {
        bucket: Bucket::Schools,
        generic_label: "School",
        brand_fallback: false,
        matches: is_school,
    },
    CategoryRule {
        bucket: Bucket::Groceries,
        generic_label: "Grocery",
        brand_fallback: true,
        matches: is_grocery,
    },
    CategoryRule {
        bucket: Bucket::Parks,
        generic_label: "Park",
        brand_fallback: false,
        matches: is_park,
    },
    CategoryRule {
        bucket: Bucket::Churches,
        generic_label: "Church",
        brand_fallback: false,
        matches: is_church,
    },
];

/// Display name fallback: explicit name tag, then (for groceries) brand,
/// then the category's generic label.
fn resolve_name(tags: &Tags, rule: &CategoryRule) -> String {
    if let Some(name) = tags.get("name") {
        return name.clone();
    }
    if rule.brand_fallback {
        if let Some(brand) = tags.get("brand") {
            return brand.clone();
        }
    }
    rule.generic_label.to_string()
}

/// Element coordinate: own position for nodes, bounding center for ways and
/// relations, none for elements carrying neither.
fn element_coords(element: &OverpassElement) -> Option<Geolocation> {
    if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
        return Some(Geolocation { lat, lng: lon });
    }
    element.center.map(|c| Geolocation {
        lat: c.lat,
        lng: c.lon,
    })
}

/// Dedup key: resolved name plus the exact coordinate bits.
///
/// Coordinates are keyed by their bit patterns so distinct float values
/// never merge; items without a coordinate share one null key per name.
fn dedupe_key(item: &PoiItem) -> (String, Option<(u64, u64)>) {
    (
        item.name.clone(),
        item.geolocation
            .map(|g| (g.lat.to_bits(), g.lng.to_bits())),
    )
}

/// Collapses duplicates by (name, geolocation), keeping the first occurrence
/// and preserving order otherwise.
pub fn dedupe(items: Vec<PoiItem>) -> Vec<PoiItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(dedupe_key(item)))
        .collect()
}

/// Classifies raw Overpass elements into the six highlight categories.
///
/// Every rule is evaluated against every element; elements matching no rule
/// are discarded, elements without any coordinate are kept with null
/// distance and geolocation. Each category list is deduplicated by
/// (name, geolocation), first occurrence wins.
pub fn extract_highlights(elements: &[OverpassElement], origin: Geolocation) -> Highlights {
    let mut buckets = Highlights::default();

    for element in elements {
        let coords = element_coords(element);
        let distance_m =
            coords.map(|c| haversine_m(origin.lat, origin.lng, c.lat, c.lng).round() as i64);

        for rule in &RULES {
            if (rule.matches)(&element.tags) {
                let item = PoiItem {
                    name: resolve_name(&element.tags, rule),
                    distance_m,
                    geolocation: coords,
                };
                match rule.bucket {
                    Bucket::BusStops => buckets.bus_stops.push(item),
                    Bucket::SubwayStations => buckets.subway_stations.push(item),
                    Bucket::Schools => buckets.schools.push(item),
                    Bucket::Groceries => buckets.groceries.push(item),
                    Bucket::Parks => buckets.parks.push(item),
                    Bucket::Churches => buckets.churches.push(item),
                }
            }
        }
    }

    Highlights {
        bus_stops: dedupe(buckets.bus_stops),
        subway_stations: dedupe(buckets.subway_stations),
        schools: dedupe(buckets.schools),
        groceries: dedupe(buckets.groceries),
        parks: dedupe(buckets.parks),
        churches: dedupe(buckets.churches),
    }
}
