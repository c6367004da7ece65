use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScaleError {
    #[error("scale coefficient must be within 0..=1, got {0}")]
    InvalidCoefficient(f32),
}

/// Scale `image` down by `coefficient`, returning a new bitmap.
///
/// Both dimensions become `round(dim * coefficient)`. Resampling is bilinear.
/// When either side rounds to zero (always the case for a coefficient of 0)
/// the result is an empty RGBA image with those dimensions.
pub fn scale_down(image: &DynamicImage, coefficient: f32) -> Result<DynamicImage, ScaleError> {
    if !(0.0..=1.0).contains(&coefficient) {
        return Err(ScaleError::InvalidCoefficient(coefficient));
    }

    let (w, h) = image.dimensions();
    let new_w = scaled_dimension(w, coefficient);
    let new_h = scaled_dimension(h, coefficient);

    if new_w == 0 || new_h == 0 {
        return Ok(DynamicImage::new_rgba8(new_w, new_h));
    }
    Ok(image.resize_exact(new_w, new_h, FilterType::Triangle))
}

fn scaled_dimension(dim: u32, coefficient: f32) -> u32 {
    (f64::from(dim) * f64::from(coefficient)).round() as u32
}
