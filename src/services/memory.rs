use std::convert::Infallible;
use std::path::Path;

use thiserror::Error;

use crate::core::source::CandidateSource;
use crate::models::{BoundingBox, Candidate};

/// Errors that can occur when loading seed data
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Candidate source backed by a list held in memory
///
/// Useful for local development, tests and small fixed catalogues.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    candidates: Vec<Candidate>,
}

impl InMemorySource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Load a JSON array of candidates
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let candidates: Vec<Candidate> = serde_json::from_str(&raw)?;

        tracing::info!(
            "Loaded {} candidates from {}",
            candidates.len(),
            path.as_ref().display()
        );

        Ok(Self { candidates })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates whose location falls inside `bbox`
    pub fn within(&self, bbox: &BoundingBox) -> Vec<Candidate> {
        self.candidates
            .iter()
            .filter(|c| bbox.contains(&c.location))
            .cloned()
            .collect()
    }
}

impl CandidateSource for InMemorySource {
    type Error = Infallible;

    async fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<Candidate>, Self::Error> {
        Ok(self.within(bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::calculate_bounding_box;
    use crate::models::Location;
    use std::io::Write;

    fn create_candidate(id: &str, lat: f64, lng: f64) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: None,
            location: Location::new(lat, lng),
            price_tier: None,
            rating: 0.0,
            review_count: 0,
            features: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_box_members() {
        let source = InMemorySource::new(vec![
            create_candidate("in", 52.37, 4.90),
            create_candidate("out", 51.92, 4.48),
        ]);
        let bbox = calculate_bounding_box(&Location::new(52.3676, 4.9041), 5.0).unwrap();

        let fetched = source.fetch(&bbox).await.unwrap();

        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "in");
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"s1","location":{{"latitude":52.37,"longitude":4.9}},"priceTier":"BUDGET"}}]"#
        )
        .unwrap();

        let source = InMemorySource::from_json_file(file.path()).unwrap();
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            InMemorySource::from_json_file(file.path()),
            Err(SeedError::Parse(_))
        ));
        assert!(matches!(
            InMemorySource::from_json_file("/definitely/not/here.json"),
            Err(SeedError::Io(_))
        ));
    }
}
