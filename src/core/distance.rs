use crate::error::{RankError, Result};
use crate::models::{BoundingBox, Location};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude used for the bounding box
pub const KM_PER_DEGREE: f64 = 111.32;

/// Smallest |cos(latitude)| used when widening the longitude window
const MIN_COS_LATITUDE: f64 = 1e-6;

/// Scales 111.32 km/° up to the 6371 km sphere (~111.195 km/°), plus a
/// little slack for rounding
const SPHERE_CORRECTION: f64 =
    KM_PER_DEGREE / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0) * (1.0 + 1e-9);

/// Beyond this latitude the longitude window always spans the globe
const POLAR_LATITUDE: f64 = 89.0;

/// Returns true if the location has finite, in-range coordinates
#[inline]
pub fn is_valid_location(location: &Location) -> bool {
    location.is_valid()
}

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `a` - First point in degrees
/// * `b` - Second point in degrees
///
/// # Returns
/// Great-circle distance in kilometers, or [`RankError::InvalidLocation`]
/// if either point is out of range or non-finite
pub fn haversine_distance(a: &Location, b: &Location) -> Result<f64> {
    a.validate()?;
    b.validate()?;
    Ok(haversine_unchecked(a, b))
}

/// Haversine kernel for inputs that were already validated
#[inline]
pub(crate) fn haversine_unchecked(a: &Location, b: &Location) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // rounding can push h a hair above 1 for antipodal points
    let c = 2.0 * h.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box around a center point
///
/// This is much cheaper than Haversine and is only a pre-filter: the
/// rectangle over-admits points near its corners but never drops a point
/// within `radius_km`. 1° latitude ≈ 111.32 km, 1° longitude ≈ 111.32 km *
/// cos(latitude), with the latitude taken at the poleward edge of the box
/// where the circle is widest in longitude.
///
/// Near the poles the longitude window widens to the whole globe instead of
/// dividing by a vanishing cosine.
///
/// # Arguments
/// * `center` - Center point in degrees
/// * `radius_km` - Radius in kilometers, must be finite and positive
///
/// # Returns
/// BoundingBox with min/max lat/lng, latitudes clamped to [-90, 90]
pub fn calculate_bounding_box(center: &Location, radius_km: f64) -> Result<BoundingBox> {
    center.validate()?;
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(RankError::InvalidRadius(radius_km));
    }

    let lat_delta = radius_km / KM_PER_DEGREE * SPHERE_CORRECTION;
    let min_lat = (center.latitude - lat_delta).max(-90.0);
    let max_lat = (center.latitude + lat_delta).min(90.0);

    let poleward_lat = min_lat.abs().max(max_lat.abs());
    let cos_lat = poleward_lat.to_radians().cos().abs().max(MIN_COS_LATITUDE);
    let lng_delta = radius_km / (KM_PER_DEGREE * cos_lat) * SPHERE_CORRECTION;

    let (min_lng, max_lng) = if poleward_lat > POLAR_LATITUDE || lng_delta >= 180.0 {
        (-180.0, 180.0)
    } else {
        (center.longitude - lng_delta, center.longitude + lng_delta)
    };

    Ok(BoundingBox {
        min_lat,
        max_lat,
        min_lng,
        max_lng,
    })
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(location: &Location, bbox: &BoundingBox) -> bool {
    bbox.contains(location)
}

/// Render a distance for display
///
/// Below one kilometer the value is shown in whole meters (`"500m"`),
/// otherwise in kilometers with one decimal (`"1.5km"`). The unit is picked
/// on the rounded meter value, so 999.6 m renders as `"1.0km"`. Negative and
/// NaN inputs are outside the documented domain and render as `"0m"`.
pub fn format_distance(km: f64) -> String {
    let km = if km.is_nan() { 0.0 } else { km.max(0.0) };
    let meters = (km * 1000.0).round();
    if meters < 1000.0 {
        format!("{}m", meters as u64)
    } else {
        format!("{:.1}km", km)
    }
}
