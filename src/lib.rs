//! `WeatherWiz` - current weather lookup with a predicted weather category
//!
//! This library provides the weather provider client, the model-backed
//! weather category predictor, and the web dashboard that ties them together.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod image_encoder;
pub mod models;
pub mod prediction;
pub mod report;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::WeatherWizConfig;
pub use error::WeatherWizError;
pub use models::{WeatherReading, WeatherReport};
pub use prediction::{PredictionError, Predictor};
pub use weather::{FetchError, WeatherClient, WeatherProvider};
pub use web::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherWizError>;
