use crate::error::{ShelfError, ShelfResult};
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `SHELF__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub recommendations: RecommendationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// ─── Recommendation Config ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    /// Result count used when the caller does not pass `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Hard cap on `limit`; larger requests are clamped, not rejected.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    /// Candidate over-fetch factor: the pool holds `limit * pool_factor` books.
    #[serde(default = "default_pool_factor")]
    pub pool_factor: usize,
    /// How many genres and authors seed the candidate query.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_refresh_queue_capacity")]
    pub refresh_queue_capacity: usize,
}

// Default functions
fn default_node_id() -> String {
    "shelf-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_limit() -> usize {
    10
}
fn default_max_limit() -> usize {
    50
}
fn default_pool_factor() -> usize {
    5
}
fn default_top_n() -> usize {
    5
}
fn default_refresh_queue_capacity() -> usize {
    1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            pool_factor: default_pool_factor(),
            top_n: default_top_n(),
            refresh_queue_capacity: default_refresh_queue_capacity(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            recommendations: RecommendationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and validate it.
    pub fn load() -> ShelfResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("SHELF")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ShelfError::Config(e.to_string()))?;
        config.recommendations.validate()?;
        Ok(config)
    }
}

impl RecommendationConfig {
    /// Every knob must be at least 1; the refresh queue cannot be unbounded
    /// or zero-sized.
    pub fn validate(&self) -> ShelfResult<()> {
        let knobs = [
            ("default_limit", self.default_limit),
            ("max_limit", self.max_limit),
            ("pool_factor", self.pool_factor),
            ("top_n", self.top_n),
            ("refresh_queue_capacity", self.refresh_queue_capacity),
        ];
        for (name, value) in knobs {
            if value == 0 {
                return Err(ShelfError::Config(format!(
                    "recommendations.{name} must be at least 1"
                )));
            }
        }
        Ok(())
    }
}
