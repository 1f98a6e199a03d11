use serde::{Deserialize, Serialize};

/// Font size used when a style does not set one
pub const DEFAULT_FONT_SIZE: u8 = 14;
/// Font family used when a style does not set one
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// RGBA color, serialized as a CSS hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Convert to CSS hex color string
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }

    /// Parse from CSS hex color string, with or without the leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    // Common colors
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid hex color '{}'", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-cell style record. Unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "is_default_align")]
    pub text_align: HorizontalAlign,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_default_align(a: &HorizontalAlign) -> bool {
    *a == HorizontalAlign::default()
}

/// A single toolbar edit applied to a style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum StyleChange {
    ToggleBold,
    ToggleItalic,
    ToggleStrikethrough,
    FontSize(u8),
    FontFamily(String),
    Color(Color),
    Align(HorizontalAlign),
}

impl StyleChange {
    pub fn description(&self) -> &'static str {
        match self {
            StyleChange::ToggleBold => "Toggle bold",
            StyleChange::ToggleItalic => "Toggle italic",
            StyleChange::ToggleStrikethrough => "Toggle strikethrough",
            StyleChange::FontSize(_) => "Set font size",
            StyleChange::FontFamily(_) => "Set font family",
            StyleChange::Color(_) => "Set text color",
            StyleChange::Align(_) => "Set alignment",
        }
    }
}

impl CellStyle {
    /// Create a new style with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Builder pattern: set italic
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Builder pattern: set strikethrough
    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = strikethrough;
        self
    }

    /// Builder pattern: set text color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Builder pattern: set horizontal alignment
    pub fn with_text_align(mut self, align: HorizontalAlign) -> Self {
        self.text_align = align;
        self
    }

    /// Builder pattern: set font size
    pub fn with_font_size(mut self, size: u8) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Builder pattern: set font family
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Get the effective font size (default is 14)
    pub fn effective_font_size(&self) -> u8 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Get the effective font family (default is Arial)
    pub fn effective_font_family(&self) -> &str {
        self.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY)
    }

    /// Get the effective text color (default is black)
    pub fn effective_color(&self) -> Color {
        self.color.unwrap_or_default()
    }

    /// Apply a toolbar edit in place
    pub fn apply(&mut self, change: &StyleChange) {
        match change {
            StyleChange::ToggleBold => self.bold = !self.bold,
            StyleChange::ToggleItalic => self.italic = !self.italic,
            StyleChange::ToggleStrikethrough => self.strikethrough = !self.strikethrough,
            StyleChange::FontSize(size) => self.font_size = Some(*size),
            StyleChange::FontFamily(family) => self.font_family = Some(family.clone()),
            StyleChange::Color(color) => self.color = Some(*color),
            StyleChange::Align(align) => self.text_align = *align,
        }
    }

    /// Every field filled in with its effective value
    pub fn resolve(&self) -> ResolvedStyle {
        ResolvedStyle {
            bold: self.bold,
            italic: self.italic,
            strikethrough: self.strikethrough,
            font_size: self.effective_font_size(),
            font_family: self.effective_font_family().to_string(),
            color: self.effective_color(),
            text_align: self.text_align,
        }
    }
}

/// A style with no unset fields, as handed to file writers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub font_size: u8,
    pub font_family: String,
    pub color: Color,
    pub text_align: HorizontalAlign,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        CellStyle::default().resolve()
    }
}
