use std::path::Path;

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;

/// JPEG quality used when sharing a flag.
pub const SHARE_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no image available to share")]
    NoImageAvailable,
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write shared image: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode the displayed image as a lossy JPEG.
///
/// Alpha is dropped since JPEG has no alpha channel.
pub fn encode_for_sharing(
    image: Option<&DynamicImage>,
    quality: u8,
) -> Result<Vec<u8>, ExportError> {
    let image = image.ok_or(ExportError::NoImageAvailable)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::NoImageAvailable);
    }

    let rgb = image.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).encode_image(&rgb)?;
    Ok(out)
}

/// Hand the encoded bytes over to their destination.
pub fn write_shared(bytes: &[u8], dest: &Path) -> Result<(), ExportError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, bytes)?;
    log::info!("Shared {} bytes to {}", bytes.len(), dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::tests::scratch_dir;
    use image::{Rgba, RgbaImage};

    fn flag() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(48, 32, |x, _| {
            if x < 16 {
                Rgba([0, 85, 164, 255])
            } else if x < 32 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([239, 65, 53, 255])
            }
        }))
    }

    #[test]
    fn encodes_jpeg() {
        let bytes = encode_for_sharing(Some(&flag()), SHARE_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (48, 32));
    }

    #[test]
    fn lower_quality_is_smaller() {
        let img = flag();
        let high = encode_for_sharing(Some(&img), 100).unwrap();
        let low = encode_for_sharing(Some(&img), 10).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn nothing_to_share() {
        assert!(matches!(
            encode_for_sharing(None, SHARE_QUALITY),
            Err(ExportError::NoImageAvailable)
        ));
        let empty = DynamicImage::new_rgba8(0, 0);
        assert!(matches!(
            encode_for_sharing(Some(&empty), SHARE_QUALITY),
            Err(ExportError::NoImageAvailable)
        ));
    }

    #[test]
    fn writes_to_destination() {
        let dir = scratch_dir("export");
        let dest = dir.join("out").join("France.jpg");
        let bytes = encode_for_sharing(Some(&flag()), SHARE_QUALITY).unwrap();

        write_shared(&bytes, &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), bytes);
    }
}
