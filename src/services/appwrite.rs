use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::core::source::CandidateSource;
use crate::models::{BoundingBox, Candidate, Location, PriceTier};

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Shop document as stored in the Appwrite collection
#[derive(Debug, Deserialize)]
struct ShopDocument {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(rename = "priceTier", default)]
    price_tier: Option<PriceTier>,
    #[serde(default)]
    rating: f64,
    #[serde(rename = "reviewCount", default)]
    review_count: u32,
    #[serde(default)]
    features: Vec<String>,
}

impl From<ShopDocument> for Candidate {
    fn from(doc: ShopDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            location: Location::new(doc.latitude, doc.longitude),
            price_tier: doc.price_tier,
            rating: doc.rating,
            review_count: doc.review_count,
            features: doc.features.into_iter().collect::<HashSet<_>>(),
        }
    }
}

/// Candidate source reading shops from an Appwrite collection
///
/// The bounding box is pushed down as latitude/longitude range queries so the
/// server only returns the rectangle around the query center. Results are
/// read `page_limit` documents at a time until the reported total is covered.
pub struct AppwriteSource {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    collection_id: String,
    page_limit: usize,
    client: Client,
}

impl AppwriteSource {
    /// Create a new Appwrite source
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collection_id: String,
        page_limit: usize,
        timeout: Duration,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            collection_id,
            page_limit: page_limit.max(1),
            client,
        })
    }

    /// Appwrite query strings for one page of a bounding box
    ///
    /// Longitude is left unconstrained when the window wraps the antimeridian
    /// or spans the whole globe; the engine's exact filter handles the rest.
    pub fn build_queries(bbox: &BoundingBox, page_limit: usize, offset: usize) -> Vec<String> {
        let mut queries = vec![
            format!("greaterThanEqual(\"latitude\", {})", bbox.min_lat),
            format!("lessThanEqual(\"latitude\", {})", bbox.max_lat),
        ];

        if !bbox.is_full_width() && !bbox.crosses_antimeridian() {
            queries.push(format!("greaterThanEqual(\"longitude\", {})", bbox.min_lng));
            queries.push(format!("lessThanEqual(\"longitude\", {})", bbox.max_lng));
        }

        queries.push(format!("limit({})", page_limit));
        queries.push(format!("offset({})", offset));
        queries
    }

    fn documents_url(&self, bbox: &BoundingBox, offset: usize) -> String {
        let params = Self::build_queries(bbox, self.page_limit, offset)
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}/databases/{}/collections/{}/documents?{}",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collection_id,
            params
        )
    }

    /// Query shops inside the bounding box, following pages until the
    /// server's total is reached
    pub async fn query_shops(&self, bbox: &BoundingBox) -> Result<Vec<Candidate>, AppwriteError> {
        let mut shops = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.query_page(bbox, offset).await?;
            offset += page.document_count;

            shops.extend(page.shops);

            if page.document_count < self.page_limit || offset as u64 >= page.total {
                tracing::debug!("Queried {} shops (total: {})", shops.len(), page.total);
                return Ok(shops);
            }
        }
    }

    async fn query_page(&self, bbox: &BoundingBox, offset: usize) -> Result<ShopPage, AppwriteError> {
        let url = self.documents_url(bbox, offset);

        tracing::debug!("Querying shops from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppwriteError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to query shops: {} - {}", status, body);
            return Err(AppwriteError::ApiError(format!(
                "Failed to query shops: {}",
                status
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let shops = documents
            .iter()
            .filter_map(|doc| match ShopDocument::deserialize(doc) {
                Ok(shop) => Some(Candidate::from(shop)),
                Err(e) => {
                    tracing::warn!("Skipping unparseable shop document: {}", e);
                    None
                }
            })
            .collect();

        Ok(ShopPage {
            shops,
            document_count: documents.len(),
            total,
        })
    }
}

/// One page of a documents listing
struct ShopPage {
    shops: Vec<Candidate>,
    /// Documents on the page, parseable or not
    document_count: usize,
    total: u64,
}

impl CandidateSource for AppwriteSource {
    type Error = AppwriteError;

    async fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<Candidate>, Self::Error> {
        self.query_shops(bbox).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_include_longitude_for_regular_box() {
        let bbox = BoundingBox {
            min_lat: 52.0,
            max_lat: 52.5,
            min_lng: 4.5,
            max_lng: 5.0,
        };

        let queries = AppwriteSource::build_queries(&bbox, 100, 0);

        assert_eq!(
            queries,
            vec![
                "greaterThanEqual(\"latitude\", 52)",
                "lessThanEqual(\"latitude\", 52.5)",
                "greaterThanEqual(\"longitude\", 4.5)",
                "lessThanEqual(\"longitude\", 5)",
                "limit(100)",
                "offset(0)",
            ]
        );
    }

    #[test]
    fn test_queries_skip_longitude_when_wrapping() {
        let bbox = BoundingBox {
            min_lat: -18.0,
            max_lat: -17.5,
            min_lng: 179.5,
            max_lng: 180.4,
        };

        let queries = AppwriteSource::build_queries(&bbox, 50, 100);
        assert_eq!(queries.len(), 4);
        assert_eq!(queries[3], "offset(100)");
        assert!(queries.iter().all(|q| !q.contains("longitude")));
    }

    #[test]
    fn test_document_conversion() {
        let doc: ShopDocument = serde_json::from_value(serde_json::json!({
            "$id": "shop-1",
            "name": "Koffie",
            "latitude": 52.37,
            "longitude": 4.9,
            "priceTier": "MODERATE",
            "rating": 4.3,
            "reviewCount": 12,
            "features": ["wifi", "wifi", "outdoor"]
        }))
        .unwrap();

        let candidate = Candidate::from(doc);
        assert_eq!(candidate.id, "shop-1");
        assert_eq!(candidate.price_tier, Some(PriceTier::Moderate));
        assert_eq!(candidate.features.len(), 2);
    }
}
