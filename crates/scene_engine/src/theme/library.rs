//! Loaded theme content, looked up by name

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::content::ContentManager;
use crate::core::ContentConfig;
use crate::graphics::{AnimatedSprite, TextureInfo};
use crate::theme::index::ThemeIndex;
use crate::theme::manifest::{ContentType, ThemeManifest};
use crate::theme::ThemeError;

/// Content manager that owns theme textures
pub const THEME_CONTENT_MANAGER: &str = "_System_ThemeContent";

/// Frames and rate of a theme animation
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationInfo {
    /// Frames per second
    pub frame_rate: f32,
    /// Frames in playback order
    pub frames: Vec<TextureInfo>,
}

impl AnimationInfo {
    /// Build a sprite playing this animation
    pub fn to_sprite(&self) -> AnimatedSprite {
        AnimatedSprite::new(self.frames.clone(), self.frame_rate)
    }
}

/// Textures, animations and sound locations of the loaded themes
///
/// The first definition of a name wins; loading a second theme only adds
/// names that are still free.
pub struct ThemeLibrary {
    theme_directory: PathBuf,
    cache_path: PathBuf,
    extension: String,
    content: Arc<ContentManager>,
    index: Option<ThemeIndex>,

    name: Option<String>,
    alias: Option<String>,
    textures: HashMap<String, TextureInfo>,
    animations: HashMap<String, AnimationInfo>,
    sounds: HashMap<String, PathBuf>,
}

impl ThemeLibrary {
    /// Create an empty library reading themes from the configured directory
    pub fn new(config: &ContentConfig, content: Arc<ContentManager>) -> Self {
        Self {
            theme_directory: config.theme_directory.clone(),
            cache_path: config.theme_cache_path(),
            extension: config.theme_extension.clone(),
            content,
            index: None,
            name: None,
            alias: None,
            textures: HashMap::new(),
            animations: HashMap::new(),
            sounds: HashMap::new(),
        }
    }

    /// Name of the last theme loaded
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Alias of the last theme loaded
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The theme index, read or created on first use
    pub fn index(&mut self) -> Result<&ThemeIndex, ThemeError> {
        let index = match self.index.take() {
            Some(index) => index,
            None => ThemeIndex::load_or_create(&self.theme_directory, &self.cache_path, &self.extension)?,
        };
        Ok(&*self.index.insert(index))
    }

    /// Load every indexed theme whose name or alias matches `name`
    pub fn load_theme(&mut self, name: &str) -> Result<(), ThemeError> {
        let manifests: Vec<PathBuf> = self
            .index()?
            .find(name)
            .map(|entry| entry.location.clone())
            .collect();
        if manifests.is_empty() {
            return Err(ThemeError::NotFound(name.to_string()));
        }

        for location in manifests {
            let path = self.theme_directory.join(location);
            let manifest = ThemeManifest::load(&path)?;
            self.load_manifest(&manifest, path.parent().unwrap_or_else(|| Path::new("")))?;

            log::info!("Loaded theme '{}' from {}", manifest.header.name, path.display());
            self.name = Some(manifest.header.name);
            self.alias = (!manifest.header.alias.is_empty()).then_some(manifest.header.alias);
        }

        Ok(())
    }

    /// Load a manifest's content, resolving entry locations against `base`
    pub fn load_manifest(&mut self, manifest: &ThemeManifest, base: &Path) -> Result<(), ThemeError> {
        for collection in &manifest.collections {
            match collection.kind {
                ContentType::Graphics => {
                    for entry in &collection.entries {
                        let texture = self.content.load_texture(base.join(&entry.location))?;
                        let info = entry.properties.region(TextureInfo::new(Some(texture)));
                        self.textures.entry(entry.name.clone()).or_insert(info);
                    }
                }
                ContentType::AnimatedSprite => {
                    for entry in &collection.entries {
                        let texture = self.content.load_texture(base.join(&entry.location))?;
                        let frames: Vec<TextureInfo> = entry
                            .properties
                            .frames
                            .iter()
                            .map(|frame| frame.region(TextureInfo::new(Some(texture.clone()))))
                            .collect();

                        if let Some(first) = frames.first() {
                            self.textures.entry(entry.name.clone()).or_insert_with(|| first.clone());
                        }
                        self.animations
                            .entry(entry.name.clone())
                            .or_insert(AnimationInfo { frame_rate: entry.properties.framerate, frames });
                    }
                }
                ContentType::Sound => {
                    for entry in &collection.entries {
                        self.sounds.entry(entry.name.clone()).or_insert_with(|| base.join(&entry.location));
                    }
                }
                ContentType::Font | ContentType::Model | ContentType::Video => {
                    log::debug!("Skipping {} {:?} entries", collection.entries.len(), collection.kind);
                }
            }
        }
        Ok(())
    }

    /// Texture region by name
    pub fn texture(&self, name: &str) -> Option<&TextureInfo> {
        self.textures.get(name)
    }

    /// Animation by name
    pub fn animation(&self, name: &str) -> Option<&AnimationInfo> {
        self.animations.get(name)
    }

    /// Sound file location by name
    pub fn sound(&self, name: &str) -> Option<&Path> {
        self.sounds.get(name).map(PathBuf::as_path)
    }
}

impl std::fmt::Debug for ThemeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeLibrary")
            .field("theme_directory", &self.theme_directory)
            .field("name", &self.name)
            .field("textures", &self.textures.len())
            .field("animations", &self.animations.len())
            .field("sounds", &self.sounds.len())
            .finish_non_exhaustive()
    }
}
