pub mod config;
pub mod error;
pub mod query;
pub mod types;

pub use config::AppConfig;
pub use error::{ShelfError, ShelfResult};
