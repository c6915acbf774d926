//! Theme index cache
//!
//! Scanning the theme directory means parsing every manifest under it. The
//! index keeps the outcome in a small RON file next to the themes so later
//! runs only read one file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::theme::manifest::ThemeManifest;
use crate::theme::ThemeError;

/// Where one theme's manifest lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeIndexEntry {
    /// Theme name
    pub name: String,
    /// Theme alias, empty when there is none
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    /// Manifest path relative to the theme directory
    pub location: PathBuf,
}

impl ThemeIndexEntry {
    /// Whether `name` matches the entry's name or alias, ignoring case
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || (!self.alias.is_empty() && self.alias.eq_ignore_ascii_case(name))
    }
}

/// Index of every theme manifest under a directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeIndex {
    /// Index format version
    pub version: f32,
    /// Indexed themes in discovery order
    pub themes: Vec<ThemeIndexEntry>,
}

impl ThemeIndex {
    /// Scan `theme_directory` recursively for `*.{extension}` manifests
    ///
    /// Manifests that fail to parse or have no name are skipped with a warning.
    pub fn create(theme_directory: &Path, extension: &str) -> Result<Self, ThemeError> {
        let mut manifests = Vec::new();
        collect_manifests(theme_directory, extension, &mut manifests)?;
        manifests.sort();

        let mut themes = Vec::new();
        for path in manifests {
            let manifest = match ThemeManifest::load(&path) {
                Ok(manifest) => manifest,
                Err(error) => {
                    log::warn!("Skipping theme manifest {}: {error}", path.display());
                    continue;
                }
            };
            if manifest.header.name.trim().is_empty() {
                log::warn!("Skipping unnamed theme manifest {}", path.display());
                continue;
            }

            let location = path.strip_prefix(theme_directory).map_or_else(|_| path.clone(), Path::to_path_buf);
            themes.push(ThemeIndexEntry { name: manifest.header.name, alias: manifest.header.alias, location });
        }

        log::info!("Indexed {} theme(s) under {}", themes.len(), theme_directory.display());
        Ok(Self { version: 1.0, themes })
    }

    /// Read an index file
    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let source = fs::read_to_string(path)?;
        ron::from_str(&source).map_err(|e| ThemeError::Parse { path: path.to_path_buf(), reason: e.to_string() })
    }

    /// Write the index file
    pub fn save(&self, path: &Path) -> Result<(), ThemeError> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ThemeError::Serialize(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Read the index at `cache_path`, scanning and writing it first when absent
    pub fn load_or_create(theme_directory: &Path, cache_path: &Path, extension: &str) -> Result<Self, ThemeError> {
        if cache_path.exists() {
            return Self::load(cache_path);
        }

        log::info!("No theme index at {}, scanning {}", cache_path.display(), theme_directory.display());
        let index = Self::create(theme_directory, extension)?;
        index.save(cache_path)?;
        Ok(index)
    }

    /// Every entry matching `name` by name or alias
    pub fn find<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ThemeIndexEntry> + 'a {
        self.themes.iter().filter(move |entry| entry.matches(name))
    }
}

fn collect_manifests(directory: &Path, extension: &str, found: &mut Vec<PathBuf>) -> Result<(), ThemeError> {
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_manifests(&path, extension, found)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some(extension) {
            found.push(path);
        }
    }
    Ok(())
}
