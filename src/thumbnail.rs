use base64::{engine::general_purpose::STANDARD, Engine};
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use once_cell::sync::Lazy;
use std::io::Cursor;
use std::time::Duration;

use crate::error::{Error, Result};

pub const THUMB_SIZE: u32 = 96;
const FETCH_TIMEOUT: Duration = Duration::from_secs(4);

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
        .build()
        .unwrap_or_default()
});

/// Scales to cover a `THUMB_SIZE` square, cropping the overflow, and returns a JPEG
/// data URL.
pub fn to_data_url(bytes: &[u8]) -> Result<String> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::Thumbnail(e.to_string()))?;
    let thumb = img.resize_to_fill(THUMB_SIZE, THUMB_SIZE, FilterType::Triangle);
    let rgb = DynamicImage::ImageRgb8(thumb.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| Error::Thumbnail(e.to_string()))?;

    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(out.into_inner())))
}

pub async fn fetch(url: &str) -> Result<String> {
    let response = CLIENT
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::Thumbnail(e.to_string()))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Thumbnail(e.to_string()))?;
    to_data_url(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_to_data_url_crops_to_square() {
        let src = RgbaImage::from_pixel(320, 180, Rgba([200, 30, 30, 255]));
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(src)
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();

        let url = to_data_url(png.get_ref()).unwrap();
        let b64 = url.strip_prefix("data:image/jpeg;base64,").unwrap();
        let decoded = image::load_from_memory(&STANDARD.decode(b64).unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (THUMB_SIZE, THUMB_SIZE));
    }

    #[test]
    fn test_rejects_non_images() {
        assert!(matches!(
            to_data_url(b"<html>nope</html>"),
            Err(Error::Thumbnail(_))
        ));
    }
}
