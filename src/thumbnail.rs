use image::GenericImageView;
use rayon::prelude::*;

use crate::asset::{AssetKey, ImageResolver};
use crate::scale;

/// Coefficient applied to full-size flags for list rows.
pub const THUMBNAIL_COEFFICIENT: f32 = 0.5;

/// RGBA pixels plus dimensions, ready for an image handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Produce the list-row thumbnail for `key`.
///
/// Failures are logged and replaced by a neutral square so a broken asset
/// never takes the whole list down.
pub fn generate_thumbnail<R>(images: &R, key: &AssetKey, coefficient: f32) -> Thumbnail
where
    R: ImageResolver + ?Sized,
{
    let full = match images.resolve_image(key) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("Failed to load flag {}: {}", key, e);
            return placeholder_thumbnail(PLACEHOLDER_SIZE);
        }
    };

    match scale::scale_down(&full, coefficient) {
        Ok(thumb) => {
            let (width, height) = thumb.dimensions();
            Thumbnail {
                rgba: thumb.to_rgba8().into_raw(),
                width,
                height,
            }
        }
        Err(e) => {
            log::warn!("Failed to scale flag {}: {}", key, e);
            placeholder_thumbnail(PLACEHOLDER_SIZE)
        }
    }
}

/// Generate thumbnails for several keys in parallel using rayon.
/// Output order matches `keys`.
pub fn generate_thumbnails_parallel<R>(
    images: &R,
    keys: &[AssetKey],
    coefficient: f32,
) -> Vec<Thumbnail>
where
    R: ImageResolver + Sync + ?Sized,
{
    keys.par_iter()
        .map(|k| generate_thumbnail(images, k, coefficient))
        .collect()
}

const PLACEHOLDER_SIZE: u32 = 32;

fn placeholder_thumbnail(size: u32) -> Thumbnail {
    Thumbnail {
        rgba: vec![60u8; (size * size * 4) as usize],
        width: size,
        height: size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::ResourceBundle;
    use crate::asset::tests::{scratch_dir, write_flag};

    #[test]
    fn thumbnail_is_half_size() {
        let dir = scratch_dir("thumb");
        write_flag(&dir, "Greece", 90, 60);
        let bundle = ResourceBundle::new(&dir);

        let thumb = generate_thumbnail(&bundle, &AssetKey::new("Greece"), THUMBNAIL_COEFFICIENT);
        assert_eq!((thumb.width, thumb.height), (45, 30));
        assert_eq!(thumb.rgba.len(), 45 * 30 * 4);
    }

    #[test]
    fn missing_flag_gets_placeholder() {
        let dir = scratch_dir("thumb-missing");
        let bundle = ResourceBundle::new(&dir);

        let thumb = generate_thumbnail(&bundle, &AssetKey::new("Nowhere"), THUMBNAIL_COEFFICIENT);
        assert_eq!(thumb, placeholder_thumbnail(PLACEHOLDER_SIZE));
    }

    #[test]
    fn parallel_keeps_order() {
        let dir = scratch_dir("thumb-parallel");
        write_flag(&dir, "A", 20, 10);
        write_flag(&dir, "B", 40, 20);
        write_flag(&dir, "C", 60, 30);
        let bundle = ResourceBundle::new(&dir);
        let keys: Vec<_> = ["A", "B", "C"].into_iter().map(AssetKey::new).collect();

        let thumbs = generate_thumbnails_parallel(&bundle, &keys, THUMBNAIL_COEFFICIENT);
        let widths: Vec<_> = thumbs.iter().map(|t| t.width).collect();
        assert_eq!(widths, [10, 20, 30]);
    }
}
