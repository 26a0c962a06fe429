// Service exports
pub mod appwrite;
pub mod memory;
pub mod rate_limit;

pub use appwrite::{AppwriteError, AppwriteSource};
pub use memory::{InMemorySource, SeedError};
pub use rate_limit::{Clock, ManualClock, RateDecision, RateLimitStore, SystemClock};

use thiserror::Error;

use crate::core::source::CandidateSource;
use crate::models::{BoundingBox, Candidate};

/// Errors from whichever source the host was configured with
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Appwrite(#[from] AppwriteError),
}

/// The candidate source selected in configuration
pub enum ShopSource {
    Memory(InMemorySource),
    Appwrite(AppwriteSource),
}

impl ShopSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ShopSource::Memory(_) => "memory",
            ShopSource::Appwrite(_) => "appwrite",
        }
    }
}

impl CandidateSource for ShopSource {
    type Error = SourceError;

    async fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<Candidate>, Self::Error> {
        match self {
            ShopSource::Memory(source) => Ok(source.within(bbox)),
            ShopSource::Appwrite(source) => Ok(source.query_shops(bbox).await?),
        }
    }
}
