use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

use crate::models::domain::{Location, PriceTier, UserPreferences};

/// Request to rank shops around a point
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub limit: Option<u16>,
    #[validate(nested)]
    pub preferences: PreferencesPayload,
}

impl NearbyRequest {
    pub fn center(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// Preferences as they arrive on the wire
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PreferencesPayload {
    #[serde(alias = "preferred_price_tiers", rename = "preferredPriceTiers", default)]
    pub preferred_price_tiers: HashSet<PriceTier>,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(alias = "max_travel_distance_km", rename = "maxTravelDistanceKm")]
    pub max_travel_distance_km: f64,
    #[serde(alias = "favorite_features", rename = "favoriteFeatures", default)]
    pub favorite_features: HashSet<String>,
}

impl From<PreferencesPayload> for UserPreferences {
    fn from(payload: PreferencesPayload) -> Self {
        Self {
            preferred_price_tiers: payload.preferred_price_tiers,
            max_travel_distance_km: payload.max_travel_distance_km,
            favorite_features: payload.favorite_features,
        }
    }
}
