use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A point on the globe in decimal degrees
///
/// Values are never clamped; use [`Location::validate`] before computing with them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both coordinates finite and within `[-90, 90]` / `[-180, 180]`
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> Result<(), crate::RankError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(crate::RankError::InvalidLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// Price bracket of a shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceTier {
    #[serde(alias = "budget")]
    Budget,
    #[serde(alias = "moderate")]
    Moderate,
    #[serde(alias = "expensive")]
    Expensive,
    #[serde(alias = "luxury")]
    Luxury,
    /// Any tier string this build does not know about
    #[serde(other)]
    Unknown,
}

/// A rankable point of interest, owned by whichever source produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub location: Location,
    #[serde(rename = "priceTier", default)]
    pub price_tier: Option<PriceTier>,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "reviewCount", default)]
    pub review_count: u32,
    #[serde(default)]
    pub features: HashSet<String>,
}

/// Per-query ranking preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(rename = "preferredPriceTiers", default)]
    pub preferred_price_tiers: HashSet<PriceTier>,
    #[serde(rename = "maxTravelDistanceKm")]
    pub max_travel_distance_km: f64,
    #[serde(rename = "favoriteFeatures", default)]
    pub favorite_features: HashSet<String>,
}

/// Ranked, explained result for a single candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub name: Option<String>,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    pub score: f64,
    #[serde(rename = "matchPercentage")]
    pub match_percentage: f64,
    pub reasons: Vec<String>,
}

/// Geospatial bounding box
///
/// Longitude bounds may extend past ±180 when the window wraps the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// True when the longitude window covers every meridian
    pub fn is_full_width(&self) -> bool {
        self.min_lng <= -180.0 && self.max_lng >= 180.0
    }

    pub fn crosses_antimeridian(&self) -> bool {
        !self.is_full_width() && (self.min_lng < -180.0 || self.max_lng > 180.0)
    }

    /// Point-in-box test, honouring windows that wrap the antimeridian
    #[inline]
    pub fn contains(&self, location: &Location) -> bool {
        if location.latitude < self.min_lat || location.latitude > self.max_lat {
            return false;
        }

        let lng = location.longitude;
        [lng, lng - 360.0, lng + 360.0]
            .iter()
            .any(|l| *l >= self.min_lng && *l <= self.max_lng)
    }
}

/// Scoring weights and thresholds
///
/// Injected into the [`Ranker`](crate::Ranker) once; the ranking policy is data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub distance: f64,
    pub price: f64,
    pub rating: f64,
    /// Added once per shared feature
    pub feature: f64,
    pub popularity: f64,
    pub rating_threshold: f64,
    /// Review count must be strictly greater than this
    pub popularity_threshold: u32,
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), crate::RankError> {
        let fields = [
            ("distance", self.distance),
            ("price", self.price),
            ("rating", self.rating),
            ("feature", self.feature),
            ("popularity", self.popularity),
            ("rating_threshold", self.rating_threshold),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(crate::RankError::InvalidWeights(format!(
                    "{} must be a finite, non-negative number (got {})",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            distance: 50.0,
            price: 30.0,
            rating: 20.0,
            feature: 10.0,
            popularity: 10.0,
            rating_threshold: 4.0,
            popularity_threshold: 10,
        }
    }
}

/// A single ranking request
#[derive(Debug, Clone)]
pub struct RankQuery {
    pub center: Location,
    pub radius_km: f64,
    pub preferences: UserPreferences,
    pub limit: usize,
}
