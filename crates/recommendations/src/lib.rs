//! Recommendation engine: per-user preference modelling from library
//! history, bounded candidate retrieval and explainable scoring.

#![warn(clippy::unwrap_used)]

pub mod candidates;
pub mod engine;
pub mod preferences;
pub mod refresh;
pub mod scorer;
pub mod weight;

pub use engine::{BasedOn, Recommendation, RecommendationEngine, RecommendationResponse};
pub use preferences::PreferenceRecomputer;
pub use refresh::{RefreshDispatcher, RefreshScheduler};
