use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::{ASSET_SUFFIX, AssetKey};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("resource directory {} is unavailable: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How catalog entries are ordered after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogOrder {
    #[default]
    Alphabetical,
    /// Whatever order the directory listing produced.
    Listing,
}

/// Derive asset keys from a directory listing.
///
/// Only names ending in `@3x.png` are kept. The key is everything before the
/// first `@`, so `Flag@2x@3x.png` becomes `Flag`. Input order is preserved.
pub fn build_catalog<I, S>(listing: I) -> Vec<AssetKey>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    listing
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            if !name.ends_with(ASSET_SUFFIX) {
                return None;
            }
            let key = name.split('@').next()?;
            if key.is_empty() {
                return None;
            }
            Some(AssetKey::new(key))
        })
        .collect()
}

/// The ordered list of countries shown on the list screen.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    keys: Vec<AssetKey>,
}

impl Catalog {
    pub fn from_listing<I, S>(listing: I, order: CatalogOrder) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = build_catalog(listing);
        if order == CatalogOrder::Alphabetical {
            keys.sort();
        }
        Catalog { keys }
    }

    /// Scan `dir` for flag images.
    pub fn load(dir: &Path, order: CatalogOrder) -> Result<Self, CatalogError> {
        let unavailable = |source| CatalogError::DirectoryUnavailable {
            path: dir.to_path_buf(),
            source,
        };
        let entries = std::fs::read_dir(dir).map_err(unavailable)?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(unavailable)?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::debug!("Skipping non UTF-8 file name {:?}", raw),
            }
        }

        let catalog = Catalog::from_listing(&names, order);
        if catalog.is_empty() {
            log::warn!("No *{} files in {}", ASSET_SUFFIX, dir.display());
        }
        log::info!(
            "Found {} flags among {} files in {}",
            catalog.len(),
            names.len(),
            dir.display()
        );
        Ok(catalog)
    }

    pub fn get(&self, index: usize) -> Option<&AssetKey> {
        self.keys.get(index)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetKey> {
        self.keys.iter()
    }
}
