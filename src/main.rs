use anyhow::Result;
use weatherwiz::{VERSION, WeatherWizConfig, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = WeatherWizConfig::load()?;
    let _telemetry = telemetry::init(&config.logging)?;

    tracing::info!(
        classifier = %config.model.classifier_path.display(),
        label_encoder = %config.model.label_encoder_path.display(),
        "WeatherWiz v{} starting",
        VERSION
    );

    web::run(config).await
}
