use rayon::prelude::*;

use crate::core::distance::haversine_unchecked;
use crate::error::{RankError, Result};
use crate::models::{Candidate, Location};

/// Tolerance in degrees for treating two coordinates as the same point
pub const COORDINATE_EPSILON_DEG: f64 = 1e-9;

/// A candidate paired with its exact distance from the query center
///
/// The distance is computed once here and carried through scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct DistancedCandidate {
    pub candidate: Candidate,
    pub distance_km: f64,
}

#[inline]
fn same_point(a: &Location, b: &Location) -> bool {
    (a.latitude - b.latitude).abs() <= COORDINATE_EPSILON_DEG
        && (a.longitude - b.longitude).abs() <= COORDINATE_EPSILON_DEG
}

#[inline]
fn within_radius(candidate: &Candidate, center: &Location, radius_km: f64) -> Option<f64> {
    if !candidate.location.is_valid() {
        tracing::warn!(
            "Dropping candidate {} with invalid location ({}, {})",
            candidate.id,
            candidate.location.latitude,
            candidate.location.longitude
        );
        return None;
    }

    let distance_km = haversine_unchecked(center, &candidate.location);
    if distance_km <= radius_km || (radius_km == 0.0 && same_point(center, &candidate.location)) {
        Some(distance_km)
    } else {
        None
    }
}

/// Keep only candidates whose exact distance to `center` is within `radius_km`
///
/// Input order is preserved. A radius of 0 keeps candidates sitting on the
/// center (within [`COORDINATE_EPSILON_DEG`]). Candidates with invalid
/// coordinates are dropped.
///
/// # Arguments
/// * `candidates` - Candidates to filter, consumed
/// * `center` - Query center in degrees
/// * `radius_km` - Radius in kilometers, finite and non-negative
///
/// # Returns
/// Retained candidates paired with their Haversine distance, or an error for
/// an invalid center or radius
pub fn filter_by_distance(
    candidates: Vec<Candidate>,
    center: &Location,
    radius_km: f64,
) -> Result<Vec<DistancedCandidate>> {
    filter_by_distance_with(candidates, center, radius_km, usize::MAX)
}

/// Same as [`filter_by_distance`], switching to a rayon parallel pass once
/// the input holds at least `parallel_threshold` candidates
pub fn filter_by_distance_with(
    candidates: Vec<Candidate>,
    center: &Location,
    radius_km: f64,
    parallel_threshold: usize,
) -> Result<Vec<DistancedCandidate>> {
    center.validate()?;
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(RankError::InvalidRadius(radius_km));
    }

    let keep = |candidate: Candidate| {
        within_radius(&candidate, center, radius_km).map(|distance_km| DistancedCandidate {
            candidate,
            distance_km,
        })
    };

    let filtered = if candidates.len() >= parallel_threshold {
        // collect keeps the input order
        candidates.into_par_iter().filter_map(keep).collect()
    } else {
        candidates.into_iter().filter_map(keep).collect()
    };

    Ok(filtered)
}

/// Stable ascending sort by the attached distance
///
/// Candidates at equal distance keep their relative input order.
pub fn sort_by_distance(mut candidates: Vec<DistancedCandidate>) -> Vec<DistancedCandidate> {
    candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    candidates
}
