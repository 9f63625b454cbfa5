use domain::FontFamily;
use std::collections::HashSet;
use tracing::debug;

pub const GOOGLE_FONTS_CSS: &str = "https://fonts.googleapis.com/css2";

#[derive(Debug, Default)]
pub struct FontLoader {
    loaded: HashSet<FontFamily>,
}

impl FontLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure(&mut self, font: FontFamily) -> Option<String> {
        if !self.loaded.insert(font) {
            return None;
        }
        debug!("Loading web font {}", font);
        Some(stylesheet_url(font))
    }

    pub fn is_loaded(&self, font: FontFamily) -> bool {
        self.loaded.contains(&font)
    }
}

pub fn stylesheet_url(font: FontFamily) -> String {
    format!(
        "{}?family={}&display=swap",
        GOOGLE_FONTS_CSS,
        font.as_str().replace(' ', "+")
    )
}
