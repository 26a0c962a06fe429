// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod ranker;
pub mod scoring;
pub mod source;

pub use distance::{calculate_bounding_box, format_distance, haversine_distance, is_valid_location, is_within_bounding_box};
pub use filters::{filter_by_distance, sort_by_distance, DistancedCandidate};
pub use ranker::{RankResult, Ranker};
pub use scoring::{score_candidate, ScoreBreakdown};
pub use source::{CandidateSource, FixedLocation, GeolocationProvider, LocationUnavailable};
