// Unit tests for Cafe Radar

use cafe_radar::core::{
    distance::{calculate_bounding_box, format_distance, haversine_distance, is_valid_location, is_within_bounding_box},
    filters::{filter_by_distance, sort_by_distance},
    scoring::score_candidate,
};
use cafe_radar::models::{Candidate, Location, PriceTier, ScoringWeights, UserPreferences};
use std::collections::HashSet;

fn sample_points() -> Vec<Location> {
    let mut points = Vec::new();
    for lat in [-90.0, -66.5, -33.9, 0.0, 12.3, 52.3676, 78.2, 90.0] {
        for lng in [-180.0, -122.4, -0.1, 0.0, 4.9041, 139.7, 180.0] {
            points.push(Location::new(lat, lng));
        }
    }
    points
}

fn create_candidate(id: &str, lat: f64, lng: f64) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: None,
        location: Location::new(lat, lng),
        price_tier: Some(PriceTier::Moderate),
        rating: 3.5,
        review_count: 4,
        features: HashSet::new(),
    }
}

#[test]
fn test_distance_identity() {
    for p in sample_points() {
        assert_eq!(haversine_distance(&p, &p).unwrap(), 0.0, "{:?}", p);
    }
}

#[test]
fn test_distance_symmetry_and_range() {
    let points = sample_points();
    for a in &points {
        for b in &points {
            let ab = haversine_distance(a, b).unwrap();
            let ba = haversine_distance(b, a).unwrap();
            assert!((ab - ba).abs() < 1e-6, "{:?} {:?}", a, b);
            assert!((0.0..=20015.1).contains(&ab), "{:?} {:?} -> {}", a, b, ab);
        }
    }
}

#[test]
fn test_distance_amsterdam_to_rotterdam() {
    let amsterdam = Location::new(52.3676, 4.9041);
    let rotterdam = Location::new(51.9225, 4.4792);

    let distance = haversine_distance(&amsterdam, &rotterdam).unwrap();
    assert!((50.0..=65.0).contains(&distance), "got {}", distance);
}

#[test]
fn test_distance_agrees_with_geo() {
    use geo::{point, HaversineDistance};

    let points = sample_points();
    for a in points.iter().step_by(5) {
        for b in points.iter().step_by(3) {
            let ours = haversine_distance(a, b).unwrap();
            let theirs = point!(x: a.longitude, y: a.latitude)
                .haversine_distance(&point!(x: b.longitude, y: b.latitude))
                / 1000.0;

            // geo uses the mean radius 6371.0088km
            assert!((ours - theirs).abs() <= theirs * 1e-5 + 1e-6, "{} vs {}", ours, theirs);
        }
    }
}

#[test]
fn test_location_validity() {
    assert!(is_valid_location(&Location::new(90.0, 180.0)));
    assert!(!is_valid_location(&Location::new(90.1, 0.0)));
    assert!(!is_valid_location(&Location::new(0.0, -180.1)));
}

#[test]
fn test_bounding_box_contains_center() {
    for center in sample_points() {
        for radius in [0.01, 1.0, 25.0, 500.0, 5000.0] {
            let bbox = calculate_bounding_box(&center, radius).unwrap();
            assert!(is_within_bounding_box(&center, &bbox), "{:?} r={}", center, radius);
        }
    }
}

/// Point `distance_km` away from `center` along `bearing` (radians)
fn destination(center: &Location, distance_km: f64, bearing: f64) -> Location {
    let angular = distance_km / 6371.0;
    let lat1 = center.latitude.to_radians();
    let lng1 = center.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    let lng = (lng2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    Location::new(lat2.to_degrees().clamp(-90.0, 90.0), lng)
}

#[test]
fn test_bounding_box_covers_every_point_in_radius() {
    let centers = [
        Location::new(52.3676, 4.9041),
        Location::new(0.0, 0.0),
        Location::new(-33.9, 151.2),
        Location::new(64.1, -21.9),
        Location::new(-17.8, 179.9),
        Location::new(85.0, 0.0),
        Location::new(-88.5, -60.0),
    ];

    for center in centers {
        for radius in [0.05, 1.0, 10.0, 75.0, 500.0, 2500.0] {
            let bbox = calculate_bounding_box(&center, radius).unwrap();
            let candidates: Vec<Candidate> = (0..360)
                .flat_map(|step| {
                    let bearing = (step as f64).to_radians();
                    [1.0, 0.9995, 0.5].map(|f| destination(&center, radius * f, bearing))
                })
                .enumerate()
                .map(|(i, p)| create_candidate(&i.to_string(), p.latitude, p.longitude))
                .collect();

            let kept = filter_by_distance(candidates, &center, radius).unwrap();
            assert!(!kept.is_empty());
            for c in &kept {
                assert!(
                    bbox.contains(&c.candidate.location),
                    "{:?} at {}km from {:?} (r={}) outside {:?}",
                    c.candidate.location,
                    c.distance_km,
                    center,
                    radius,
                    bbox
                );
            }
        }
    }
}

#[test]
fn test_filter_is_bounded_subset() {
    let center = Location::new(52.3676, 4.9041);
    let candidates: Vec<Candidate> = (0..200)
        .map(|i| {
            let lat = 52.0 + (i % 20) as f64 * 0.04;
            let lng = 4.5 + (i / 20) as f64 * 0.08;
            create_candidate(&i.to_string(), lat, lng)
        })
        .collect();
    let input_ids: HashSet<String> = candidates.iter().map(|c| c.id.clone()).collect();

    for radius in [0.5, 3.0, 10.0, 40.0] {
        let filtered = filter_by_distance(candidates.clone(), &center, radius).unwrap();
        for c in &filtered {
            assert!(input_ids.contains(&c.candidate.id));
            let exact = haversine_distance(&center, &c.candidate.location).unwrap();
            assert!(exact <= radius);
            assert_eq!(exact, c.distance_km);
        }
    }
}

#[test]
fn test_sort_non_decreasing() {
    let center = Location::new(52.3676, 4.9041);
    let candidates: Vec<Candidate> = (0..50)
        .map(|i| create_candidate(&i.to_string(), 52.3676 + ((i * 7) % 13) as f64 * 0.003, 4.9041))
        .collect();

    let sorted = sort_by_distance(filter_by_distance(candidates, &center, 100.0).unwrap());

    for pair in sorted.windows(2) {
        assert!(pair[0].distance_km <= pair[1].distance_km);
        if pair[0].distance_km == pair[1].distance_km {
            // equal distances keep input order
            let a: usize = pair[0].candidate.id.parse().unwrap();
            let b: usize = pair[1].candidate.id.parse().unwrap();
            assert!(a < b);
        }
    }
}

#[test]
fn test_format_distance_examples() {
    assert_eq!(format_distance(0.5), "500m");
    assert_eq!(format_distance(1.5), "1.5km");
    assert_eq!(format_distance(0.001), "1m");
    assert_eq!(format_distance(1.0), "1.0km");
}

#[test]
fn test_scenario_all_reasons() {
    let candidate = Candidate {
        id: "shop".to_string(),
        name: None,
        location: Location::new(52.37, 4.9),
        price_tier: Some(PriceTier::Budget),
        rating: 4.5,
        review_count: 50,
        features: ["wifi".to_string()].into_iter().collect(),
    };
    let preferences = UserPreferences {
        preferred_price_tiers: [PriceTier::Budget].into_iter().collect(),
        max_travel_distance_km: 5.0,
        favorite_features: ["wifi".to_string()].into_iter().collect(),
    };

    let breakdown = score_candidate(&candidate, 2.0, &preferences, &ScoringWeights::default());

    assert_eq!(breakdown.reasons.len(), 5);
    assert!(breakdown.score > 100.0);
    assert_eq!(breakdown.match_percentage(), 100.0);
}

#[test]
fn test_feature_monotonicity() {
    let preferences = UserPreferences {
        preferred_price_tiers: HashSet::new(),
        max_travel_distance_km: 3.0,
        favorite_features: ["wifi", "quiet", "outdoor"].iter().map(|f| f.to_string()).collect(),
    };
    let weights = ScoringWeights::default();

    let mut candidate = create_candidate("c", 52.37, 4.9);
    let mut last = score_candidate(&candidate, 1.0, &preferences, &weights).score;

    for feature in ["quiet", "espresso", "wifi", "outdoor"] {
        candidate.features.insert(feature.to_string());
        let next = score_candidate(&candidate, 1.0, &preferences, &weights).score;
        assert!(next >= last);
        last = next;
    }
}
