//! Lexical categories and the display styles they map to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SyntaxError;

/// Kinds of classified text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Comment,
    String,
    Keyword,
    Number,
    /// Name introduced by `def` or `class`
    Definition,
    BuiltIn,
    /// Assignment target or call site
    Identifier,
    /// The `self` token
    SelfReference,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Comment,
        Category::String,
        Category::Keyword,
        Category::Number,
        Category::Definition,
        Category::BuiltIn,
        Category::Identifier,
        Category::SelfReference,
    ];

    /// Returns the theme key for this category.
    pub fn theme_key(&self) -> &'static str {
        match self {
            Category::Comment => "comment",
            Category::String => "string",
            Category::Keyword => "keyword",
            Category::Number => "number",
            Category::Definition => "definition",
            Category::BuiltIn => "built_in",
            Category::Identifier => "identifier",
            Category::SelfReference => "self_reference",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// An sRGB foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = SyntaxError;

    /// Parses `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let invalid = || SyntaxError::InvalidColor(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = SyntaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Display attributes for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Style {
    pub const fn plain(color: Color) -> Self {
        Self {
            color,
            bold: false,
            italic: false,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub const fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }
}

/// One Dark palette
mod colors {
    use super::Color;

    pub const KEYWORD: Color = Color::rgb(0xc6, 0x78, 0xdd); // Purple
    pub const COMMENT: Color = Color::rgb(0x5c, 0x63, 0x70); // Grey
    pub const STRING: Color = Color::rgb(0x98, 0xc3, 0x79); // Green
    pub const NUMBER: Color = Color::rgb(0xd1, 0x9a, 0x66); // Orange
    pub const IDENTIFIER: Color = Color::rgb(0xe5, 0xc0, 0x7b); // Yellow
    pub const DEFINITION: Color = Color::rgb(0x61, 0xaf, 0xef); // Blue
    pub const BUILT_IN: Color = Color::rgb(0x56, 0xb6, 0xc2); // Cyan
    pub const SELF: Color = Color::rgb(0xe0, 0x6c, 0x75); // Light red
}

/// Category-to-style mapping, fixed once the highlighter is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    styles: [Style; Category::ALL.len()],
}

impl Theme {
    pub fn one_dark() -> Self {
        let mut styles = [Style::plain(colors::IDENTIFIER); Category::ALL.len()];
        styles[Category::Comment.index()] = Style::plain(colors::COMMENT).italic();
        styles[Category::String.index()] = Style::plain(colors::STRING);
        styles[Category::Keyword.index()] = Style::plain(colors::KEYWORD).bold();
        styles[Category::Number.index()] = Style::plain(colors::NUMBER);
        styles[Category::Definition.index()] = Style::plain(colors::DEFINITION);
        styles[Category::BuiltIn.index()] = Style::plain(colors::BUILT_IN);
        styles[Category::Identifier.index()] = Style::plain(colors::IDENTIFIER);
        styles[Category::SelfReference.index()] = Style::plain(colors::SELF);
        Self { styles }
    }

    pub fn style(&self, category: Category) -> &Style {
        &self.styles[category.index()]
    }

    /// Replaces the style of one category.
    pub fn set(&mut self, category: Category, style: Style) {
        self.styles[category.index()] = style;
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::one_dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_round_trip() {
        let color: Color = "#c678dd".parse().unwrap();
        assert_eq!(color, Color::rgb(0xc6, 0x78, 0xdd));
        assert_eq!(color.to_string(), "#c678dd");
        assert_eq!("98C379".parse::<Color>().unwrap(), Color::rgb(0x98, 0xc3, 0x79));
    }

    #[test]
    fn test_invalid_colors() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn test_one_dark_attributes() {
        let theme = Theme::one_dark();
        assert!(theme.style(Category::Keyword).bold);
        assert!(theme.style(Category::Comment).italic);
        assert!(!theme.style(Category::String).bold);
        assert_eq!(theme.style(Category::SelfReference).color.to_string(), "#e06c75");
    }

    #[test]
    fn test_style_deserializes_from_toml() {
        let style: Style = toml::from_str("color = \"#ffffff\"\nbold = true").unwrap();
        assert_eq!(style, Style::plain(Color::rgb(255, 255, 255)).bold());
    }

    #[test]
    fn test_theme_override() {
        let mut theme = Theme::one_dark();
        theme.set(Category::Number, Style::plain(Color::rgb(1, 2, 3)));
        assert_eq!(theme.style(Category::Number).color, Color::rgb(1, 2, 3));
    }
}
