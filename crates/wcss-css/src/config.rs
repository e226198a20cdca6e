//! Engine configuration loaded from JSON.
//!
//! ```json
//! {
//!   "media": ["all", "handheld"],
//!   "viewport": { "width": 176, "height": 208 },
//!   "max_fetch_workers": 2,
//!   "fonts": [{ "family": "system", "size": 15 }],
//!   "special_keys": { "send": 4001 }
//! }
//! ```
//!
//! Every field is optional.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wcss_dom::render::Font;

use crate::context::CssContext;

/// Screen size used as the reference for percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 240,
            height: 320,
        }
    }
}

/// A font made available for resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Family name.
    pub family: String,
    /// Pixel size.
    #[serde(default = "default_font_size")]
    pub size: i32,
    /// Bold face.
    #[serde(default)]
    pub bold: bool,
    /// Italic face.
    #[serde(default)]
    pub italic: bool,
}

const fn default_font_size() -> i32 {
    Font::MEDIUM_SIZE
}

impl From<&FontConfig> for Font {
    fn from(config: &FontConfig) -> Self {
        Self {
            family: config.family.clone(),
            size: config.size,
            bold: config.bold,
            italic: config.italic,
        }
    }
}

/// File form of the context settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Supported media types.
    pub media: Vec<String>,
    /// Percentage reference.
    pub viewport: Viewport,
    /// Concurrent fetches per phase.
    pub max_fetch_workers: usize,
    /// Request background, list and `img` images.
    pub show_images: bool,
    /// Registered fonts.
    pub fonts: Vec<FontConfig>,
    /// Link targets to style as visited.
    pub visited: Vec<String>,
    /// Named keys for `-wap-access-key`.
    pub special_keys: HashMap<String, u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            media: vec!["all".to_string(), "handheld".to_string()],
            viewport: Viewport::default(),
            max_fetch_workers: 2,
            show_images: true,
            fonts: Vec::new(),
            visited: Vec::new(),
            special_keys: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Copy the settings into `ctx`.
    pub fn apply_to(&self, ctx: &mut CssContext) {
        ctx.set_media(self.media.iter().cloned());
        ctx.set_viewport(self.viewport);
        ctx.set_show_images(self.show_images);
        for font in &self.fonts {
            ctx.fonts_mut().register(font.into());
        }
        for url in &self.visited {
            ctx.mark_visited(url.clone());
        }
        for (name, &code) in &self.special_keys {
            ctx.add_special_key(name.clone(), code);
        }
    }

    /// A fresh context with these settings.
    #[must_use]
    pub fn to_context(&self) -> CssContext {
        let mut ctx = CssContext::new();
        self.apply_to(&mut ctx);
        ctx
    }
}
