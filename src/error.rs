//! Error types and handling for the `WeatherWiz` dashboard

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::prediction::PredictionError;
use crate::weather::FetchError;

/// Main error type for the `WeatherWiz` application
#[derive(Error, Debug)]
pub enum WeatherWizError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather provider errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Model artifact or inference errors
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// Branding image errors
    #[error("Image error: {message}")]
    Image { message: String },

    /// Page rendering errors
    #[error("Template error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },
}

impl WeatherWizError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new image error
    pub fn image<S: Into<String>>(message: S) -> Self {
        Self::Image {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherWizError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            WeatherWizError::Fetch(err) => err.message().to_string(),
            WeatherWizError::Prediction(_) => {
                "Weather prediction failed. The model files may be missing or damaged.".to_string()
            }
            WeatherWizError::Image { .. } => "Unable to load the branding image.".to_string(),
            WeatherWizError::Template { .. } => "Unable to render the dashboard.".to_string(),
        }
    }

    /// HTTP status used when this error ends a request
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            WeatherWizError::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WeatherWizError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        let body = format!(
            "<!DOCTYPE html><html><head><title>WeatherWiz</title></head>\
             <body><h1>Something went wrong</h1><p>{}</p></body></html>",
            tera::escape_html(&self.user_message())
        );
        (self.status_code(), Html(body)).into_response()
    }
}
