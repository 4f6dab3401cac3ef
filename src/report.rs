//! Fetch-then-predict flow shared by the page and the JSON API

use chrono::Utc;
use tracing::{info, instrument};

use crate::models::WeatherReport;
use crate::prediction::Predictor;
use crate::weather::WeatherProvider;

/// Fetch the current reading for `city` and classify it.
///
/// A failed fetch ends the flow as [`crate::WeatherWizError::Fetch`] before
/// the predictor runs.
#[instrument(skip(weather, predictor))]
pub async fn generate(
    weather: &dyn WeatherProvider,
    predictor: &Predictor,
    city: &str,
) -> crate::Result<WeatherReport> {
    let reading = weather.current_reading(city).await?;
    let prediction = predictor.predict_async(reading).await?;

    info!(prediction = %prediction, "Report generated");

    Ok(WeatherReport {
        city: city.to_string(),
        reading,
        prediction,
        generated_at: Utc::now(),
    })
}
