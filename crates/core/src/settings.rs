// ABOUTME: Reader typography settings with defaults, range clamping, user fonts and stylesheet generation.
// ABOUTME: Persistence goes through the SettingsStore trait with JSON-file and in-memory implementations.

//! Reader settings.
//!
//! Settings are serialized with camelCase keys (`fontSize`, `lineHeight`,
//! `maxWidth`, `fontFamily`, `userFonts`) and every numeric value is clamped
//! into its allowed range whenever settings are loaded.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

pub const FONT_SIZE_MIN: u32 = 14;
pub const FONT_SIZE_MAX: u32 = 24;
pub const LINE_HEIGHT_MIN: f32 = 1.2;
pub const LINE_HEIGHT_MAX: f32 = 2.5;
pub const MAX_WIDTH_MIN: u32 = 500;
pub const MAX_WIDTH_MAX: u32 = 900;
pub const MAX_WIDTH_STEP: u32 = 50;

const DEFAULT_FONT_SIZE: u32 = 18;
const DEFAULT_LINE_HEIGHT: f32 = 1.8;
const DEFAULT_MAX_WIDTH: u32 = 700;

const SYSTEM_STACK: &str =
    r#"-apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif"#;
const SERIF_STACK: &str = r#"Georgia, "Times New Roman", Times, serif"#;
const SANS_SERIF_STACK: &str = "Arial, Helvetica, sans-serif";
const MONOSPACE_STACK: &str = r#""Monaco", "Menlo", "Ubuntu Mono", monospace"#;
const CUSTOM_FALLBACK: &str = r#"-apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif"#;

/// Color theme of the reading view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for Theme {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// Font family: one of the built-in stacks or a user-installed font by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontFamily {
    #[default]
    System,
    Serif,
    SansSerif,
    Monospace,
    Custom(String),
}

impl FontFamily {
    /// CSS `font-family` value. Custom fonts get a system fallback stack.
    pub fn css_stack(&self) -> String {
        match self {
            FontFamily::System => SYSTEM_STACK.to_string(),
            FontFamily::Serif => SERIF_STACK.to_string(),
            FontFamily::SansSerif => SANS_SERIF_STACK.to_string(),
            FontFamily::Monospace => MONOSPACE_STACK.to_string(),
            FontFamily::Custom(name) => {
                format!("\"{}\", {}", css_string_escape(name), CUSTOM_FALLBACK)
            }
        }
    }
}

impl From<String> for FontFamily {
    fn from(s: String) -> Self {
        match s.trim() {
            "" | "system" => FontFamily::System,
            "serif" => FontFamily::Serif,
            "sans-serif" => FontFamily::SansSerif,
            "monospace" => FontFamily::Monospace,
            other => FontFamily::Custom(other.to_string()),
        }
    }
}

impl From<&str> for FontFamily {
    fn from(s: &str) -> Self {
        FontFamily::from(s.to_string())
    }
}

impl From<FontFamily> for String {
    fn from(f: FontFamily) -> Self {
        f.to_string()
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFamily::System => write!(f, "system"),
            FontFamily::Serif => write!(f, "serif"),
            FontFamily::SansSerif => write!(f, "sans-serif"),
            FontFamily::Monospace => write!(f, "monospace"),
            FontFamily::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Typography settings for the reading view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReaderSettings {
    pub theme: Theme,
    /// Pixels, 14 to 24.
    pub font_size: u32,
    /// Unitless multiplier, 1.2 to 2.5 in steps of 0.1.
    pub line_height: f32,
    /// Pixels, 500 to 900 in steps of 50.
    pub max_width: u32,
    pub font_family: FontFamily,
    pub user_fonts: Vec<String>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            font_size: DEFAULT_FONT_SIZE,
            line_height: DEFAULT_LINE_HEIGHT,
            max_width: DEFAULT_MAX_WIDTH,
            font_family: FontFamily::System,
            user_fonts: Vec::new(),
        }
    }
}

impl ReaderSettings {
    /// Bring every value into its allowed range and step.
    pub fn clamped(mut self) -> Self {
        self.font_size = self.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);

        self.line_height = if self.line_height.is_finite() {
            let stepped = (self.line_height * 10.0).round() / 10.0;
            stepped.clamp(LINE_HEIGHT_MIN, LINE_HEIGHT_MAX)
        } else {
            DEFAULT_LINE_HEIGHT
        };

        let width = self.max_width.clamp(MAX_WIDTH_MIN, MAX_WIDTH_MAX);
        let steps = (width - MAX_WIDTH_MIN + MAX_WIDTH_STEP / 2) / MAX_WIDTH_STEP;
        self.max_width = MAX_WIDTH_MIN + steps * MAX_WIDTH_STEP;

        let mut fonts: Vec<String> = Vec::with_capacity(self.user_fonts.len());
        for font in self.user_fonts.drain(..) {
            let font = font.trim().to_string();
            if !font.is_empty() && !fonts.contains(&font) {
                fonts.push(font);
            }
        }
        self.user_fonts = fonts;
        self
    }

    /// Register a user font. Fails if the name is blank or already present.
    pub fn add_user_font(&mut self, name: &str) -> Result<(), ExtractError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ExtractError::settings(
                "settings.add_font",
                Some(anyhow::anyhow!("font name is empty")),
            ));
        }
        if self.user_fonts.iter().any(|f| f == name) {
            return Err(ExtractError::settings(
                "settings.add_font",
                Some(anyhow::anyhow!("font already exists: {}", name)),
            ));
        }
        self.user_fonts.push(name.to_string());
        Ok(())
    }

    /// Remove a user font. Returns false if it was not registered.
    ///
    /// If the removed font was selected, the family falls back to `System`.
    pub fn remove_user_font(&mut self, name: &str) -> bool {
        let name = name.trim();
        let before = self.user_fonts.len();
        self.user_fonts.retain(|f| f != name);
        let removed = self.user_fonts.len() != before;
        if removed && self.font_family == FontFamily::Custom(name.to_string()) {
            self.font_family = FontFamily::System;
        }
        removed
    }

    /// The dynamic stylesheet applied to the reading view.
    pub fn to_css(&self) -> String {
        format!(
            ".readx-content {{\n  font-size: {}px !important;\n  line-height: {} !important;\n  max-width: {}px !important;\n  font-family: {} !important;\n}}\n\n.readx-container[data-theme=\"{}\"] {{\n  color-scheme: {};\n}}\n",
            self.font_size,
            self.line_height,
            self.max_width,
            self.font_family.css_stack(),
            self.theme,
            self.theme,
        )
    }
}

fn css_string_escape(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';' | '\n' | '\r'))
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect()
}

/// Persistence seam for reader settings.
pub trait SettingsStore {
    /// Load settings, returning defaults when nothing has been saved yet.
    fn load(&self) -> Result<ReaderSettings, ExtractError>;

    fn save(&self, settings: &ReaderSettings) -> Result<(), ExtractError>;
}

/// Settings stored as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<ReaderSettings, ExtractError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(ReaderSettings::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))
            .map_err(|e| ExtractError::settings("settings.load", Some(e)))?;
        let settings: ReaderSettings = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))
            .map_err(|e| ExtractError::settings("settings.load", Some(e)))?;
        Ok(settings.clamped())
    }

    fn save(&self, settings: &ReaderSettings) -> Result<(), ExtractError> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| ExtractError::settings("settings.save", Some(e.into())))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))
                    .map_err(|e| ExtractError::settings("settings.save", Some(e)))?;
            }
        }
        fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))
            .map_err(|e| ExtractError::settings("settings.save", Some(e)))?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// Settings held in memory, for hosts that persist elsewhere and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<ReaderSettings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<ReaderSettings, ExtractError> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone().unwrap_or_default().clamped())
    }

    fn save(&self, settings: &ReaderSettings) -> Result<(), ExtractError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(settings.clone());
        Ok(())
    }
}
