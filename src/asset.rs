use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use thiserror::Error;

/// Suffix every flag image must carry to be picked up by the catalog.
pub const ASSET_SUFFIX: &str = "@3x.png";

/// Identifier shared by a country's display name and its flag image.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetKey(String);

impl AssetKey {
    pub fn new(key: impl Into<String>) -> Self {
        AssetKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the image this key refers to, e.g. `France@3x.png`.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.0, ASSET_SUFFIX)
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no image for {key} at {}", path.display())]
    Missing { key: AssetKey, path: PathBuf },
    #[error("failed to decode image for {key}: {source}")]
    Decode {
        key: AssetKey,
        #[source]
        source: image::ImageError,
    },
}

/// Maps an asset key to a human readable name.
pub trait DisplayNameResolver {
    fn resolve_display_name(&self, key: &AssetKey) -> String;
}

/// Loads the full-size bitmap for an asset key.
pub trait ImageResolver {
    fn resolve_image(&self, key: &AssetKey) -> Result<DynamicImage, AssetError>;
}

/// Flag images stored as `<key>@3x.png` in a single directory.
#[derive(Debug, Clone)]
pub struct ResourceBundle {
    dir: PathBuf,
}

impl ResourceBundle {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ResourceBundle { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn image_path(&self, key: &AssetKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl ImageResolver for ResourceBundle {
    fn resolve_image(&self, key: &AssetKey) -> Result<DynamicImage, AssetError> {
        let path = self.image_path(key);
        if !path.is_file() {
            return Err(AssetError::Missing {
                key: key.clone(),
                path,
            });
        }
        image::open(&path).map_err(|source| AssetError::Decode {
            key: key.clone(),
            source,
        })
    }
}

/// Localized names loaded from `strings/<locale>.json` files.
///
/// Tables are consulted in fallback order; a key missing from all of them
/// resolves to the key itself.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    tables: Vec<HashMap<String, String>>,
}

impl StringTable {
    /// Load every table along the locale's fallback chain. Missing files are
    /// skipped silently, unreadable or malformed ones with a warning.
    pub fn load(resource_dir: &Path, locale: &str) -> Self {
        let strings_dir = resource_dir.join("strings");
        let mut tables = Vec::new();
        for candidate in locale_fallback_chain(locale) {
            let path = strings_dir.join(format!("{candidate}.json"));
            let data = match std::fs::read_to_string(&path) {
                Ok(data) => data,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    log::warn!("Cannot read string table {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<HashMap<String, String>>(&data) {
                Ok(table) => {
                    log::debug!("Loaded {} strings from {}", table.len(), path.display());
                    tables.push(table);
                }
                Err(e) => log::warn!("Ignoring string table {}: {}", path.display(), e),
            }
        }
        StringTable { tables }
    }

    #[cfg(test)]
    pub fn from_tables(tables: Vec<HashMap<String, String>>) -> Self {
        StringTable { tables }
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.tables
            .iter()
            .find_map(|t| t.get(key))
            .map(String::as_str)
    }

    /// Translate an arbitrary string key, falling back to the key.
    pub fn localized(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }
}

impl DisplayNameResolver for StringTable {
    fn resolve_display_name(&self, key: &AssetKey) -> String {
        self.localized(key.as_str())
    }
}

/// Build the lookup order for a locale identifier.
///
/// `pt_BR.UTF-8` -> `["pt-BR", "pt", "en"]`
pub fn locale_fallback_chain(locale: &str) -> Vec<String> {
    let l = locale
        .trim()
        .split('.')
        .next()
        .unwrap_or_default()
        .replace('_', "-");
    let mut chain = Vec::new();

    if !l.is_empty() && l != "C" && l != "POSIX" {
        chain.push(l.clone());
        if let Some(lang) = l.split('-').next() {
            if !lang.is_empty() {
                chain.push(lang.to_string());
            }
        }
    }
    chain.push("en".to_string());

    let mut out: Vec<String> = Vec::new();
    for x in chain {
        if !out.contains(&x) {
            out.push(x);
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Fresh, empty directory under the system temp dir.
    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "world-flags-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub(crate) fn write_flag(dir: &Path, key: &str, w: u32, h: u32) {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 30, 30, 255]));
        img.save(dir.join(format!("{key}{ASSET_SUFFIX}"))).unwrap();
    }

    #[test]
    fn key_maps_to_file_name() {
        assert_eq!(AssetKey::new("France").file_name(), "France@3x.png");
        assert_eq!(AssetKey::new("France").to_string(), "France");
    }

    #[test]
    fn fallback_chain_strips_encoding_and_region() {
        assert_eq!(locale_fallback_chain("pt_BR.UTF-8"), vec!["pt-BR", "pt", "en"]);
        assert_eq!(locale_fallback_chain("en-US"), vec!["en-US", "en"]);
        assert_eq!(locale_fallback_chain("de"), vec!["de", "en"]);
        assert_eq!(locale_fallback_chain("C"), vec!["en"]);
        assert_eq!(locale_fallback_chain(""), vec!["en"]);
    }

    #[test]
    fn display_name_falls_back_to_key() {
        let mut fr = HashMap::new();
        fr.insert("Germany".to_string(), "Allemagne".to_string());
        let mut en = HashMap::new();
        en.insert("Germany".to_string(), "Germany".to_string());
        en.insert("Japan".to_string(), "Japan".to_string());
        let table = StringTable::from_tables(vec![fr, en]);

        assert_eq!(table.resolve_display_name(&AssetKey::new("Germany")), "Allemagne");
        assert_eq!(table.resolve_display_name(&AssetKey::new("Japan")), "Japan");
        assert_eq!(table.resolve_display_name(&AssetKey::new("Atlantis")), "Atlantis");
    }

    #[test]
    fn string_table_loads_along_chain() {
        let dir = scratch_dir("strings");
        let strings = dir.join("strings");
        std::fs::create_dir_all(&strings).unwrap();
        std::fs::write(strings.join("fr.json"), r#"{"France": "La France"}"#).unwrap();
        std::fs::write(
            strings.join("en.json"),
            r#"{"France": "France", "Countries": "Countries"}"#,
        )
        .unwrap();
        std::fs::write(strings.join("fr-CA.json"), "not json").unwrap();

        let table = StringTable::load(&dir, "fr_CA.UTF-8");
        assert_eq!(table.localized("France"), "La France");
        assert_eq!(table.localized("Countries"), "Countries");
        assert_eq!(table.localized("Spain"), "Spain");
    }

    #[test]
    fn unreadable_table_is_skipped() {
        let dir = scratch_dir("strings-unreadable");
        let strings = dir.join("strings");
        std::fs::create_dir_all(&strings).unwrap();
        std::fs::write(strings.join("de.json"), b"{\"Spain\": \"Spanien\xff\"}").unwrap();
        std::fs::write(strings.join("en.json"), r#"{"Spain": "Spain"}"#).unwrap();
        // A directory where a table is expected cannot be read as a file
        std::fs::create_dir_all(strings.join("de-AT.json")).unwrap();

        let table = StringTable::load(&dir, "de_AT");
        assert_eq!(table.localized("Spain"), "Spain");
    }

    #[test]
    fn bundle_resolves_and_reports_missing() {
        let dir = scratch_dir("bundle");
        write_flag(&dir, "Italy", 12, 8);
        let bundle = ResourceBundle::new(&dir);

        let img = bundle.resolve_image(&AssetKey::new("Italy")).unwrap();
        assert_eq!((img.width(), img.height()), (12, 8));

        let err = bundle.resolve_image(&AssetKey::new("Peru")).unwrap_err();
        assert!(matches!(err, AssetError::Missing { .. }));
    }

    #[test]
    fn bundle_reports_undecodable_file() {
        let dir = scratch_dir("bundle-bad");
        std::fs::write(dir.join("Chad@3x.png"), b"definitely not a png").unwrap();
        let bundle = ResourceBundle::new(&dir);

        let err = bundle.resolve_image(&AssetKey::new("Chad")).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }
}
