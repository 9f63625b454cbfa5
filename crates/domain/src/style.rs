use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        HEX_COLOR.is_match(raw).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for HexColor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFamily {
    Inter,
    Lora,
    Merriweather,
    PlayfairDisplay,
    RobotoMono,
    Caveat,
}

impl FontFamily {
    pub const ALL: [FontFamily; 6] = [
        FontFamily::Inter,
        FontFamily::Lora,
        FontFamily::Merriweather,
        FontFamily::PlayfairDisplay,
        FontFamily::RobotoMono,
        FontFamily::Caveat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontFamily::Inter => "Inter",
            FontFamily::Lora => "Lora",
            FontFamily::Merriweather => "Merriweather",
            FontFamily::PlayfairDisplay => "Playfair Display",
            FontFamily::RobotoMono => "Roboto Mono",
            FontFamily::Caveat => "Caveat",
        }
    }

    /// CSS `font-family` value with a generic fallback. Family names are left
    /// unquoted so the value can sit inside a double-quoted `style` attribute.
    pub fn css_stack(&self) -> String {
        let generic = match self {
            FontFamily::Lora | FontFamily::Merriweather | FontFamily::PlayfairDisplay => "serif",
            FontFamily::RobotoMono => "monospace",
            FontFamily::Caveat => "cursive",
            FontFamily::Inter => "sans-serif",
        };
        format!("{}, {}", self.as_str(), generic)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|f| f.as_str() == raw)
    }
}

impl FromStr for FontFamily {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::UnknownFont(s.to_string()))
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FontFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentStyle {
    pub background_color: Option<HexColor>,
    pub font_family: Option<FontFamily>,
}

impl CommentStyle {
    pub fn from_raw(background_color: Option<&str>, font_family: Option<&str>) -> Self {
        Self {
            background_color: background_color.and_then(HexColor::parse),
            font_family: font_family.and_then(FontFamily::parse),
        }
    }

    pub fn is_default(&self) -> bool {
        self.background_color.is_none() && self.font_family.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_pattern() {
        assert!(HexColor::parse("#1a2b3c").is_some());
        assert!(HexColor::parse("#FFF").is_some());
        assert!(HexColor::parse("1a2b3c").is_none());
        assert!(HexColor::parse("#1a2b3").is_none());
        assert!(HexColor::parse("javascript:alert(1)").is_none());
        assert!(HexColor::parse("#fff; background:url(x)").is_none());
    }

    #[test]
    fn font_allow_list() {
        assert_eq!(FontFamily::parse("Lora"), Some(FontFamily::Lora));
        assert_eq!(FontFamily::parse("Playfair Display"), Some(FontFamily::PlayfairDisplay));
        assert_eq!(FontFamily::parse("Comic Sans MS"), None);
        assert_eq!(FontFamily::parse("Lora'; x"), None);
    }

    #[test]
    fn css_stack_has_no_quotes() {
        assert_eq!(FontFamily::PlayfairDisplay.css_stack(), "Playfair Display, serif");
        assert!(FontFamily::ALL.iter().all(|f| !f.css_stack().contains(&['"', '\''][..])));
    }

    #[test]
    fn invalid_values_are_dropped() {
        let style = CommentStyle::from_raw(Some("javascript:alert(1)"), Some("Wingdings"));
        assert!(style.is_default());

        let style = CommentStyle::from_raw(Some("#1a2b3c"), Some("Lora"));
        assert_eq!(style.background_color.unwrap().as_str(), "#1a2b3c");
        assert_eq!(style.font_family, Some(FontFamily::Lora));
    }
}
