use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::GenericImageView;

use crate::error::{Result, StudioError};

pub const DEFAULT_MAX_WIDTH: u32 = 1200;
pub const DEFAULT_MAX_HEIGHT: u32 = 1200;
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Splits a `data:<mime>;base64,<payload>` URL into its media type and
/// decoded bytes.
pub fn parse_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| StudioError::ImageError("not a data URL".into()))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| StudioError::ImageError("data URL is not base64-encoded".into()))?;
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| StudioError::ImageError(format!("invalid base64 payload: {}", e)))?;
    Ok((mime.to_string(), bytes))
}

/// Builds a self-describing data URL from raw bytes.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Scale-down-only fit: neither output dimension exceeds its maximum,
/// aspect ratio preserved, never upscaled.
pub fn target_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let mut out_width = width;
    let mut out_height = height;
    if width > height {
        if width > max_width {
            out_height = ((height as f64 * max_width as f64) / width as f64).round() as u32;
            out_width = max_width;
        }
    } else if height > max_height {
        out_width = ((width as f64 * max_height as f64) / height as f64).round() as u32;
        out_height = max_height;
    }
    (out_width, out_height)
}

/// Recompresses an encoded image to bounded JPEG with the default
/// limits used for webhook payloads.
pub async fn compress_image(source: &str) -> Result<String> {
    compress_image_with(
        source,
        DEFAULT_MAX_WIDTH,
        DEFAULT_MAX_HEIGHT,
        DEFAULT_JPEG_QUALITY,
    )
    .await
}

/// Recompresses an encoded image: decode, scale down to fit the given
/// maxima, re-encode as quality-lossy JPEG. Accepts a data URL or a
/// fetchable resource URL. Decode errors fail the call.
pub async fn compress_image_with(
    source: &str,
    max_width: u32,
    max_height: u32,
    quality: u8,
) -> Result<String> {
    let data_url = if source.starts_with("data:") {
        source.to_string()
    } else {
        fetch_as_data_url(source).await?
    };

    tokio::task::spawn_blocking(move || {
        let (_, bytes) = parse_data_url(&data_url)?;
        compress_bytes(&bytes, max_width, max_height, quality)
    })
    .await
    .map_err(|e| StudioError::InternalError(format!("compression task failed: {}", e)))?
}

fn compress_bytes(bytes: &[u8], max_width: u32, max_height: u32, quality: u8) -> Result<String> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| StudioError::ImageError(format!("failed to decode image: {}", e)))?;

    let (width, height) = img.dimensions();
    let (out_width, out_height) = target_dimensions(width, height, max_width, max_height);

    let img = if (out_width, out_height) != (width, height) {
        img.resize_exact(out_width, out_height, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| StudioError::ImageError(format!("failed to encode JPEG: {}", e)))?;

    Ok(encode_data_url("image/jpeg", &out))
}

/// Fetches a served resource and normalizes it into a storable data
/// URL, using the reported content type.
pub async fn fetch_as_data_url(url: &str) -> Result<String> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| StudioError::ConnectionFailed(format!("failed to fetch resource: {}", e)))?;

    let mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| StudioError::ConnectionFailed(format!("failed to read resource: {}", e)))?;

    Ok(encode_data_url(&mime, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn png_data_url(width: u32, height: u32) -> String {
        let img = RgbImage::from_pixel(width, height, image::Rgb([120, 30, 30]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        encode_data_url("image/png", buf.get_ref())
    }

    #[test]
    fn data_url_round_trip() {
        let url = encode_data_url("image/png", b"abc");
        let (mime, bytes) = parse_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"abc");
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(parse_data_url("https://example.com/a.png").is_err());
        assert!(parse_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn landscape_is_bounded_by_width() {
        assert_eq!(target_dimensions(2400, 1200, 1200, 1200), (1200, 600));
    }

    #[test]
    fn portrait_is_bounded_by_height() {
        assert_eq!(target_dimensions(1000, 2000, 1200, 1200), (600, 1200));
    }

    #[test]
    fn small_images_are_never_upscaled() {
        assert_eq!(target_dimensions(640, 480, 1200, 1200), (640, 480));
        assert_eq!(target_dimensions(100, 100, 1200, 1200), (100, 100));
    }

    #[tokio::test]
    async fn compress_downscales_and_reencodes_as_jpeg() {
        let source = png_data_url(2400, 1200);
        let compressed = compress_image_with(&source, 1200, 1200, 80).await.unwrap();
        let (mime, bytes) = parse_data_url(&compressed).unwrap();
        assert_eq!(mime, "image/jpeg");
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.dimensions(), (1200, 600));
    }

    #[tokio::test]
    async fn compress_keeps_small_images_at_size() {
        let source = png_data_url(64, 32);
        let compressed = compress_image_with(&source, 1200, 1200, 80).await.unwrap();
        let (_, bytes) = parse_data_url(&compressed).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.dimensions(), (64, 32));
    }

    #[tokio::test]
    async fn compress_fails_loudly_on_undecodable_input() {
        let source = encode_data_url("image/png", b"definitely not an image");
        assert!(matches!(
            compress_image_with(&source, 1200, 1200, 80).await,
            Err(StudioError::ImageError(_))
        ));
    }
}
