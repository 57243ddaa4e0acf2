//! Font discovery for the text renderer.
//!
//! Fonts are looked up by family name (`Arial-Bold`, `Impact`) against the
//! files found in the configured font directories. The catalog is scanned
//! once and handed to the overlay builders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};

/// Font file extensions understood by the text renderer.
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// Maximum directory depth searched below each font root.
const MAX_SCAN_DEPTH: usize = 6;

/// Font family name to font file index.
#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    fonts: HashMap<String, PathBuf>,
}

impl FontCatalog {
    /// Scan font directories. Missing directories are skipped.
    pub fn scan(dirs: &[PathBuf]) -> Self {
        let mut catalog = Self::default();
        for dir in dirs {
            catalog.scan_dir(dir, 0);
        }
        debug!(fonts = catalog.len(), "Font catalog scanned");
        catalog
    }

    /// Build a catalog from explicit `(family, file)` pairs.
    pub fn from_entries<I, S, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, P)>,
        S: AsRef<str>,
        P: Into<PathBuf>,
    {
        let fonts = entries
            .into_iter()
            .map(|(name, path)| (normalize_font_name(name.as_ref()), path.into()))
            .collect();
        Self { fonts }
    }

    fn scan_dir(&mut self, dir: &Path, depth: usize) {
        if depth > MAX_SCAN_DEPTH {
            return;
        }
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.scan_dir(&path, depth + 1);
                continue;
            }
            let is_font = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if !is_font {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                // First match wins so earlier roots take precedence
                self.fonts
                    .entry(normalize_font_name(stem))
                    .or_insert_with(|| path.clone());
            }
        }
    }

    /// Resolve a family name or a direct font file path.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.is_file() {
            return Some(direct.to_path_buf());
        }
        self.fonts.get(&normalize_font_name(name)).cloned()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Lowercase and strip separators: `Arial-Bold`, `arial_bold` and
/// `Arial Bold` all map to `arialbold`.
fn normalize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Text rendering capability injected into the overlay builders.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    catalog: FontCatalog,
    fallback_font: String,
}

impl TextRenderer {
    pub fn new(catalog: FontCatalog, fallback_font: impl Into<String>) -> Self {
        Self {
            catalog,
            fallback_font: fallback_font.into(),
        }
    }

    /// Scan fonts per the media configuration.
    pub fn from_config(config: &MediaConfig) -> Self {
        let renderer = Self::new(FontCatalog::scan(&config.font_dirs), config.fallback_font.clone());
        if renderer.fallback_font_file().is_err() {
            warn!(
                font = %renderer.fallback_font,
                "Fallback font not found; captions with unavailable fonts will fail"
            );
        }
        renderer
    }

    /// Font file for a requested family.
    pub fn font_file(&self, name: &str) -> MediaResult<PathBuf> {
        self.catalog
            .resolve(name)
            .ok_or_else(|| MediaError::overlay(format!("Font not available: {}", name)))
    }

    /// Font file for the fallback style.
    pub fn fallback_font_file(&self) -> MediaResult<PathBuf> {
        self.font_file(&self.fallback_font)
            .map_err(|_| MediaError::overlay(format!("Fallback font not available: {}", self.fallback_font)))
    }

    pub fn fallback_font(&self) -> &str {
        &self.fallback_font
    }
}
