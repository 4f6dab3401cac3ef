//! OpenWeatherMap current-weather client
//!
//! Issues one GET per lookup against the `/weather` endpoint with metric
//! units and turns the response into a [`WeatherReading`]. Failures are
//! reported as a tagged [`FetchError`] so a failed lookup can never reach
//! the classifier.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::models::WeatherReading;

/// Unit system requested from the provider; conversions below assume it
const UNITS: &str = "metric";

/// Message used when the provider rejects a request without explaining why
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Why a weather lookup failed
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response
    #[error("{0}")]
    Transport(String),

    /// The provider answered with a non-200 status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The provider answered 200 with an unexpected body
    #[error("Invalid weather data: {0}")]
    Decode(String),
}

impl FetchError {
    /// Text shown to the user in place of the readings
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            FetchError::Transport(message)
            | FetchError::Upstream { message, .. }
            | FetchError::Decode(message) => message,
        }
    }
}

/// Source of current weather readings
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Look up the current reading for a free-text city name
    async fn current_reading(&self, city: &str) -> Result<WeatherReading, FetchError>;
}

/// Weather API client for OpenWeatherMap
pub struct WeatherClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    /// Create a new weather API client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("Weather API key is not configured")?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("WeatherWiz/", env!("CARGO_PKG_VERSION")));
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }
        let http = builder
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let mut client = ClientBuilder::new(http);
        if config.max_retries > 0 {
            let policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
            client = client.with(RetryTransientMiddleware::new_with_policy(policy));
        }

        Ok(Self {
            client: client.build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Client error text without the request URL, which carries the API key
    fn transport_message(&self, error: reqwest_middleware::Error) -> String {
        match error {
            reqwest_middleware::Error::Reqwest(e) => e.without_url().to_string(),
            // Retry middleware wraps the last reqwest error, URL included
            reqwest_middleware::Error::Middleware(e) => format!("{e:#}")
                .replace(&*urlencoding::encode(&self.api_key), "***")
                .replace(&self.api_key, "***"),
        }
    }

    fn current_weather_url(&self, city: &str) -> String {
        format!(
            "{}/weather?q={}&appid={}&units={}",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key),
            UNITS
        )
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn current_reading(&self, city: &str) -> Result<WeatherReading, FetchError> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(self.current_weather_url(city))
            .send()
            .await
            .map_err(|e| {
                let message = self.transport_message(e);
                warn!("Weather request failed: {}", message);
                FetchError::Transport(message)
            })?;

        let status = response.status();
        debug!("Weather provider answered {}", status);

        if status != StatusCode::OK {
            let message = response
                .json::<openweathermap::ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
            warn!(status = status.as_u16(), "Weather provider rejected request: {}", message);
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: openweathermap::CurrentWeatherResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        info!(
            "Retrieved current weather in {:.3}s",
            start_time.elapsed().as_secs_f64()
        );

        Ok(body.into())
    }
}

/// `OpenWeatherMap` API response structures
mod openweathermap {
    use super::WeatherReading;
    use serde::Deserialize;

    /// Subset of the `/weather` response the dashboard needs
    #[derive(Debug, Deserialize)]
    pub struct CurrentWeatherResponse {
        pub main: MainBlock,
        pub wind: WindBlock,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainBlock {
        pub temp: f64,
        pub humidity: f64,
        pub pressure: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindBlock {
        /// m/s with metric units
        pub speed: f64,
    }

    /// Error body, e.g. `{"cod":"404","message":"city not found"}`
    #[derive(Debug, Deserialize)]
    pub struct ErrorResponse {
        pub message: Option<String>,
    }

    impl From<CurrentWeatherResponse> for WeatherReading {
        fn from(response: CurrentWeatherResponse) -> Self {
            Self {
                temperature_c: response.main.temp,
                humidity_pct: response.main.humidity,
                wind_speed_kmh: WeatherReading::ms_to_kmh(response.wind.speed),
                pressure_mb: response.main.pressure,
            }
        }
    }
}
