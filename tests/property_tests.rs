/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use neighbor_api::highlights::{dedupe, haversine_m};
use neighbor_api::models::{FetchOsmDataRequest, Geolocation, PoiItem};
use proptest::prelude::*;

// Property: Haversine distance is a well-behaved metric over valid coordinates
proptest! {
    #[test]
    fn haversine_never_negative(
        lat1 in -90.0f64..=90.0,
        lon1 in -180.0f64..=180.0,
        lat2 in -90.0f64..=90.0,
        lon2 in -180.0f64..=180.0
    ) {
        let d = haversine_m(lat1, lon1, lat2, lon2);
        prop_assert!(d >= 0.0, "distance must be non-negative, got {}", d);
        prop_assert!(d.is_finite());
    }

    #[test]
    fn haversine_symmetric(
        lat1 in -90.0f64..=90.0,
        lon1 in -180.0f64..=180.0,
        lat2 in -90.0f64..=90.0,
        lon2 in -180.0f64..=180.0
    ) {
        let forward = haversine_m(lat1, lon1, lat2, lon2);
        let backward = haversine_m(lat2, lon2, lat1, lon1);
        prop_assert!((forward - backward).abs() < 1e-6);
    }

    #[test]
    fn haversine_zero_at_identical_points(
        lat in -90.0f64..=90.0,
        lon in -180.0f64..=180.0
    ) {
        prop_assert_eq!(haversine_m(lat, lon, lat, lon), 0.0);
    }

    #[test]
    fn haversine_one_degree_latitude_about_111km(
        lat in -80.0f64..=80.0,
        lon in -180.0f64..=180.0
    ) {
        let d = haversine_m(lat, lon, lat + 1.0, lon);
        prop_assert!(
            (d - 111_320.0).abs() / 111_320.0 < 0.01,
            "one degree of latitude should be ~111,320m, got {}",
            d
        );
    }

    #[test]
    fn haversine_bounded_by_half_circumference(
        lat1 in -90.0f64..=90.0,
        lon1 in -180.0f64..=180.0,
        lat2 in -90.0f64..=90.0,
        lon2 in -180.0f64..=180.0
    ) {
        // Half the Earth's great circle, with slack for rounding
        let d = haversine_m(lat1, lon1, lat2, lon2);
        prop_assert!(d <= 6_371_000.0 * std::f64::consts::PI + 1.0);
    }
}

// Property: Request validation never panics and classifies correctly
proptest! {
    #[test]
    fn request_validation_never_panics(
        latitude in prop::num::f64::ANY,
        longitude in prop::num::f64::ANY,
        radius in prop::option::of(prop::num::f64::ANY)
    ) {
        let request = FetchOsmDataRequest { latitude, longitude, radius };
        let _ = request.validate();
    }

    #[test]
    fn in_range_requests_always_accepted(
        latitude in -90.0f64..=90.0,
        longitude in -180.0f64..=180.0,
        radius in 1.0f64..=10_000.0
    ) {
        let request = FetchOsmDataRequest {
            latitude,
            longitude,
            radius: Some(radius),
        };
        prop_assert!(request.validate().is_empty());
    }

    #[test]
    fn out_of_range_latitude_always_rejected(extra in 1e-6f64..=1e6) {
        let request = FetchOsmDataRequest {
            latitude: 90.0 + extra,
            longitude: 0.0,
            radius: None,
        };
        prop_assert!(!request.validate().is_empty());
    }
}

// Strategy for POI items drawn from a small pool so collisions are common
fn poi_item_strategy() -> impl Strategy<Value = PoiItem> {
    (
        prop::sample::select(vec!["Bus stop", "School", "Park", "St. Mary"]),
        prop::option::of((0i64..4, 0i64..4)),
    )
        .prop_map(|(name, cell)| {
            let geolocation = cell.map(|(lat, lng)| Geolocation {
                lat: lat as f64 * 0.001 + 40.0,
                lng: lng as f64 * 0.001 - 74.0,
            });
            PoiItem {
                name: name.to_string(),
                distance_m: geolocation.map(|_| 100),
                geolocation,
            }
        })
}

// Property: Deduplication semantics
proptest! {
    #[test]
    fn dedupe_is_idempotent(items in prop::collection::vec(poi_item_strategy(), 0..40)) {
        let once = dedupe(items);
        let twice = dedupe(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn dedupe_never_grows_and_preserves_first(items in prop::collection::vec(poi_item_strategy(), 0..40)) {
        let out = dedupe(items.clone());
        prop_assert!(out.len() <= items.len());
        if let (Some(first_in), Some(first_out)) = (items.first(), out.first()) {
            prop_assert_eq!(first_in, first_out);
        }
        // Every surviving item appeared in the input
        for item in &out {
            prop_assert!(items.contains(item));
        }
    }

    #[test]
    fn dedupe_distinct_keys_survive(items in prop::collection::vec(poi_item_strategy(), 0..40)) {
        let out = dedupe(items);
        let keys: Vec<_> = out
            .iter()
            .map(|i| (i.name.clone(), i.geolocation.map(|g| (g.lat.to_bits(), g.lng.to_bits()))))
            .collect();
        let mut unique = keys.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(keys.len(), unique.len());
    }
}
