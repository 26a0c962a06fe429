use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub appwrite: Option<AppwriteSettings>,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Memory,
    Appwrite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
    /// JSON seed file for the in-memory source
    pub seed_path: Option<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            seed_path: None,
        }
    }
}

fn default_source_kind() -> SourceKind { SourceKind::Memory }

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub shops_collection: String,
    pub page_limit: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

fn default_radius_km() -> f64 { 5.0 }
fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 100 }
fn default_parallel_threshold() -> usize { crate::core::ranker::DEFAULT_PARALLEL_THRESHOLD }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_distance_weight")]
    pub distance: f64,
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_feature_weight")]
    pub feature: f64,
    #[serde(default = "default_popularity_weight")]
    pub popularity: f64,
    #[serde(default = "default_rating_threshold")]
    pub rating_threshold: f64,
    #[serde(default = "default_popularity_threshold")]
    pub popularity_threshold: u32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            distance: default_distance_weight(),
            price: default_price_weight(),
            rating: default_rating_weight(),
            feature: default_feature_weight(),
            popularity: default_popularity_weight(),
            rating_threshold: default_rating_threshold(),
            popularity_threshold: default_popularity_threshold(),
        }
    }
}

fn default_distance_weight() -> f64 { 50.0 }
fn default_price_weight() -> f64 { 30.0 }
fn default_rating_weight() -> f64 { 20.0 }
fn default_feature_weight() -> f64 { 10.0 }
fn default_popularity_weight() -> f64 { 10.0 }
fn default_rating_threshold() -> f64 { 4.0 }
fn default_popularity_threshold() -> u32 { 10 }

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            distance: config.distance,
            price: config.price,
            rating: config.rating,
            feature: config.feature,
            popularity: config.popularity,
            rating_threshold: config.rating_threshold,
            popularity_threshold: config.popularity_threshold,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
    /// Sweep expired windows once the store tracks this many clients
    #[serde(default = "default_sweep_threshold")]
    pub sweep_threshold: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            sweep_threshold: default_sweep_threshold(),
        }
    }
}

fn default_max_requests() -> u32 { 60 }
fn default_window_secs() -> i64 { 60 }
fn default_sweep_threshold() -> usize { 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CAFE_RADAR)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CAFE_RADAR__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Scoring weights from the `[scoring.weights]` section, validated
    pub fn scoring_weights(&self) -> Result<ScoringWeights, ConfigError> {
        let weights = ScoringWeights::from(&self.scoring.weights);
        weights
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(weights)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("CAFE_RADAR")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.distance, 50.0);
        assert_eq!(weights.price, 30.0);
        assert_eq!(weights.rating, 20.0);
        assert_eq!(weights.feature, 10.0);
        assert_eq!(weights.popularity, 10.0);
        assert_eq!(ScoringWeights::from(&weights), ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_load_from_file_with_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 9090

[scoring.weights]
price = 45.0
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.source.kind, SourceKind::Memory);
        assert_eq!(settings.ranking.default_limit, 20);

        let weights = settings.scoring_weights().unwrap();
        assert_eq!(weights.price, 45.0);
        assert_eq!(weights.distance, 50.0);
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 9090

[scoring.weights]
rating = -5.0
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert!(settings.scoring_weights().is_err());
    }
}
