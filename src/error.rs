use thiserror::Error;

/// Errors surfaced by the ranking engine
///
/// Validation variants are raised before any retrieval or scoring happens.
/// `RetrievalFailed` carries the source's own error untouched as its `source()`.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("Invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("Invalid radius: {0} km (must be finite and greater than 0)")]
    InvalidRadius(f64),

    #[error("Invalid limit: {0} (must be greater than 0)")]
    InvalidLimit(usize),

    #[error("Invalid max travel distance: {0} km (must be finite and greater than 0)")]
    InvalidTravelDistance(f64),

    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),

    #[error("Candidate retrieval failed: {0}")]
    RetrievalFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RankError {
    /// True for errors caused by caller input rather than the candidate source
    pub fn is_validation(&self) -> bool {
        !matches!(self, RankError::RetrievalFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, RankError>;
