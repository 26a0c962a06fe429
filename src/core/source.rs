use std::future::Future;

use thiserror::Error;

use crate::models::{BoundingBox, Candidate, Location};

/// Supplies candidates for a ranking query
///
/// `fetch` must return a superset of the candidates inside `bbox`; the
/// ranker applies the exact radius test itself. Errors are handed back to the
/// caller unchanged and never retried by the engine.
pub trait CandidateSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch(
        &self,
        bbox: &BoundingBox,
    ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send;
}

#[derive(Debug, Error)]
#[error("Location unavailable: {0}")]
pub struct LocationUnavailable(pub String);

/// Where a caller can get the user's current position from
///
/// Not used by the engine; hosts use it to fill in a query center.
pub trait GeolocationProvider: Send + Sync {
    fn current(&self) -> Result<Location, LocationUnavailable>;
}

/// A provider that always reports the same configured position
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Location);

impl GeolocationProvider for FixedLocation {
    fn current(&self) -> Result<Location, LocationUnavailable> {
        if self.0.is_valid() {
            Ok(self.0)
        } else {
            Err(LocationUnavailable(format!(
                "configured location ({}, {}) is out of range",
                self.0.latitude, self.0.longitude
            )))
        }
    }
}
