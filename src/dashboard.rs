//! Server-rendered dashboard page
//!
//! `GET /` shows blank placeholders; `POST /` runs one report for the
//! submitted city and shows either the readings or the provider's error in
//! the sidebar.

use axum::{Form, extract::State, response::Html};
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tracing::warn;

use crate::models::WeatherReport;
use crate::web::AppState;
use crate::{WeatherWizError, report};

const TEMPLATE_NAME: &str = "dashboard.html";

pub const SUCCESS_STATUS: &str = "Report Generated Successfully";

/// Everything the page displays for one interaction
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardView {
    pub city: String,
    pub temperature: String,
    pub humidity: String,
    pub wind_speed: String,
    pub pressure: String,
    pub prediction: String,
    /// Sidebar confirmation
    pub status: Option<String>,
    /// Sidebar error, readings stay blank
    pub error: Option<String>,
}

impl DashboardView {
    pub fn from_report(report: &WeatherReport) -> Self {
        Self {
            city: report.city.clone(),
            temperature: report.reading.format_temperature(),
            humidity: report.reading.format_humidity(),
            wind_speed: report.reading.format_wind_speed(),
            pressure: report.reading.format_pressure(),
            prediction: report.prediction.clone(),
            status: Some(SUCCESS_STATUS.to_string()),
            error: None,
        }
    }

    pub fn failed(city: &str, message: &str) -> Self {
        Self {
            city: city.to_string(),
            error: Some(message.to_string()),
            ..Self::default()
        }
    }
}

/// Tera renderer with the header logo baked in
pub struct DashboardRenderer {
    tera: Tera,
    logo_base64: String,
}

impl DashboardRenderer {
    pub fn new(logo_base64: String) -> crate::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(
            TEMPLATE_NAME,
            include_str!("../templates/dashboard.html"),
        )?;
        Ok(Self { tera, logo_base64 })
    }

    pub fn render(&self, view: &DashboardView) -> crate::Result<String> {
        let mut context = Context::from_serialize(view)?;
        context.insert("logo_base64", &self.logo_base64);
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub city: String,
}

pub async fn show(State(state): State<AppState>) -> crate::Result<Html<String>> {
    Ok(Html(state.renderer.render(&DashboardView::default())?))
}

pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> crate::Result<Html<String>> {
    let view = match report::generate(state.weather.as_ref(), &state.predictor, &form.city).await {
        Ok(report) => DashboardView::from_report(&report),
        Err(WeatherWizError::Fetch(err)) => {
            warn!(city = %form.city, "Weather lookup failed: {}", err);
            DashboardView::failed(&form.city, err.message())
        }
        Err(err) => return Err(err),
    };

    Ok(Html(state.renderer.render(&view)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_page_has_placeholders_only() {
        let renderer = DashboardRenderer::new("AAAA".to_string()).unwrap();
        let html = renderer.render(&DashboardView::default()).unwrap();

        assert!(html.contains("Temperature (🌡):  °C"));
        assert!(html.contains("Current Weather expected to be: </p>"));
        assert!(html.contains("data:image/png;base64,AAAA"));
        assert!(!html.contains(SUCCESS_STATUS));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_failed_view_shows_error_in_sidebar() {
        let renderer = DashboardRenderer::new(String::new()).unwrap();
        let html = renderer
            .render(&DashboardView::failed("Atlantis", "city not found"))
            .unwrap();

        assert!(html.contains("<div class=\"error\">city not found</div>"));
        assert!(html.contains("Pressure:(🕧)  millibars"));
        assert!(!html.contains("data:image/png"));
    }

    #[test]
    fn test_city_is_escaped() {
        let renderer = DashboardRenderer::new(String::new()).unwrap();
        let html = renderer
            .render(&DashboardView::failed("<script>", "Nothing to geocode"))
            .unwrap();

        assert!(!html.contains("value=\"<script>\""));
        assert!(html.contains("&lt;script&gt;"));
    }
}
