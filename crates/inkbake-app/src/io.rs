//! Image decoding and PNG encoding.

use crate::error::{AppError, AppResult};
use image::RgbaImage;
use std::path::Path;

/// Decode any supported image file into straight RGBA8.
pub fn load_image(path: &Path) -> AppResult<RgbaImage> {
    let image = image::open(path).map_err(|source| AppError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    let image = image.to_rgba8();
    log::info!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image)
}

/// Encode an RGBA8 image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> AppResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
    }
    Ok(png_data)
}

/// Encode and write a PNG file.
pub fn write_png(path: &Path, image: &RgbaImage) -> AppResult<()> {
    let data = encode_png(image)?;
    std::fs::write(path, &data).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Wrote {} ({} bytes)", path.display(), data.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_png_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.png");
        let image = RgbaImage::from_fn(7, 5, |x, y| Rgba([x as u8 * 30, y as u8 * 40, 200, 128]));

        write_png(&path, &image).unwrap();
        assert_eq!(load_image(&path).unwrap(), image);
    }

    #[test]
    fn test_encode_has_png_signature() {
        let data = encode_png(&RgbaImage::new(2, 2)).unwrap();
        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, AppError::Decode { .. }));
    }
}
