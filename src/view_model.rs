use image::DynamicImage;

use crate::asset::{AssetError, AssetKey, DisplayNameResolver, ImageResolver};
use crate::catalog::Catalog;
use crate::thumbnail::{self, Thumbnail};

/// One row of the country list.
#[derive(Debug, Clone)]
pub struct RowViewModel {
    pub index: usize,
    pub key: AssetKey,
    pub display_name: String,
    pub thumbnail: Thumbnail,
}

/// Everything the detail screen shows for a single country.
#[derive(Debug, Clone)]
pub struct DetailViewModel {
    pub key: AssetKey,
    pub title: String,
    /// Full-size flag, never scaled.
    pub image: DynamicImage,
}

/// Build a row per catalog entry, in catalog order.
pub fn render_list<N, I>(
    catalog: &Catalog,
    names: &N,
    images: &I,
    thumbnail_coefficient: f32,
) -> Vec<RowViewModel>
where
    N: DisplayNameResolver + ?Sized,
    I: ImageResolver + Sync + ?Sized,
{
    let keys: Vec<AssetKey> = catalog.iter().cloned().collect();
    let thumbnails = thumbnail::generate_thumbnails_parallel(images, &keys, thumbnail_coefficient);

    keys.into_iter()
        .zip(thumbnails)
        .enumerate()
        .map(|(index, (key, thumbnail))| RowViewModel {
            index,
            display_name: names.resolve_display_name(&key),
            key,
            thumbnail,
        })
        .collect()
}

pub fn render_detail<N, I>(
    key: &AssetKey,
    names: &N,
    images: &I,
) -> Result<DetailViewModel, AssetError>
where
    N: DisplayNameResolver + ?Sized,
    I: ImageResolver + ?Sized,
{
    let image = images.resolve_image(key)?;
    Ok(DetailViewModel {
        key: key.clone(),
        title: names.resolve_display_name(key),
        image,
    })
}
