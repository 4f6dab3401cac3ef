//! Inline image encoding for the dashboard header

use std::io::Cursor;
use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat};

use crate::WeatherWizError;

/// PNG-encode `image` and return it as standard base64, ready for a `data:image/png` URI
pub fn encode_png_base64(image: &DynamicImage) -> crate::Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| WeatherWizError::image(format!("Failed to encode PNG: {e}")))?;
    Ok(STANDARD.encode(buffer.into_inner()))
}

/// Decode the branding image at `path` and encode it for inline embedding
pub fn load_logo(path: impl AsRef<Path>) -> crate::Result<String> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|e| {
        WeatherWizError::image(format!("Failed to open {}: {e}", path.display()))
    })?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        "Loaded logo from {}",
        path.display()
    );
    encode_png_base64(&image)
}
