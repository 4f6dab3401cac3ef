//! Weather observation and report models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of readings the classifier consumes
pub const FEATURE_COUNT: usize = 4;

/// Current observation for one city, as fed to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Relative humidity as reported by the provider
    pub humidity_pct: f64,
    /// Wind speed in km/h, rounded to two decimals
    pub wind_speed_kmh: f64,
    /// Atmospheric pressure in hPa (millibars)
    pub pressure_mb: f64,
}

impl WeatherReading {
    /// Convert wind speed from m/s to km/h, rounded to two decimals
    #[must_use]
    pub fn ms_to_kmh(speed_ms: f64) -> f64 {
        round_to(speed_ms * 3.6, 2)
    }

    /// Classifier input, in the order the model was trained on
    #[must_use]
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.temperature_c,
            self.humidity_pct,
            self.wind_speed_kmh,
            self.pressure_mb,
        ]
    }

    /// Format temperature for display
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:?}", self.temperature_c)
    }

    /// Format humidity for display
    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{:?}", self.humidity_pct)
    }

    /// Format wind speed for display
    #[must_use]
    pub fn format_wind_speed(&self) -> String {
        format!("{:?}", self.wind_speed_kmh)
    }

    /// Format pressure for display; whole hPa values print without a fraction
    #[must_use]
    pub fn format_pressure(&self) -> String {
        format!("{}", self.pressure_mb)
    }
}

/// A reading together with the label the classifier predicted for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    /// City name exactly as entered
    pub city: String,
    pub reading: WeatherReading,
    /// Predicted weather category
    pub prediction: String,
    pub generated_at: DateTime<Utc>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
