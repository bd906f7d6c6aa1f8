//! Configuration types for Blockdraft diagram generation and rendering.
//!
//! All types implement [`serde::Deserialize`] with every field defaulted, so
//! a partial TOML document only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Canvas geometry shared by the layout engine, the
//!   canvas reconciler, and the SVG exporter.
//! - [`ProviderConfig`] - Optional external analysis provider.
//! - [`StyleConfig`] - Colors used by the SVG exporter.
//!
//! # Example
//!
//! ```
//! # use blockdraft::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().section_width(), 280.0);
//! assert!(config.style().block_fill().is_ok());
//! ```

use std::time::Duration;

use serde::Deserialize;

use blockdraft_core::{color::Color, model::SectionKind};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Provider configuration section.
    #[serde(default)]
    provider: ProviderConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, provider: ProviderConfig, style: StyleConfig) -> Self {
        Self {
            layout,
            provider,
            style,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Canvas geometry.
///
/// The canvas is split into one equal-width column per section. Blocks are
/// inset from the column edge by `section_padding + block_inset` and stacked
/// with `block_spacing` between them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    canvas_width: f32,
    canvas_height: f32,
    section_padding: f32,
    block_inset: f32,
    block_height: f32,
    block_spacing: f32,
    /// Vertical position of section headings on the canvas.
    label_offset: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1400.0,
            canvas_height: 900.0,
            section_padding: 10.0,
            block_inset: 5.0,
            block_height: 90.0,
            block_spacing: 12.0,
            label_offset: 45.0,
        }
    }
}

impl LayoutConfig {
    pub fn canvas_width(&self) -> f32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f32 {
        self.canvas_height
    }

    pub fn section_padding(&self) -> f32 {
        self.section_padding
    }

    pub fn block_inset(&self) -> f32 {
        self.block_inset
    }

    pub fn block_height(&self) -> f32 {
        self.block_height
    }

    pub fn block_spacing(&self) -> f32 {
        self.block_spacing
    }

    pub fn label_offset(&self) -> f32 {
        self.label_offset
    }

    /// Width of one section column.
    pub fn section_width(&self) -> f32 {
        self.canvas_width / SectionKind::ALL.len() as f32
    }

    /// Left edge of the column holding `kind`.
    pub fn section_x(&self, kind: SectionKind) -> f32 {
        kind.index() as f32 * self.section_width()
    }

    /// Width of every generated block.
    pub fn block_width(&self) -> f32 {
        self.section_width() - self.section_padding * 2.0 - self.block_inset
    }

    /// Vertical distance between the tops of two stacked blocks.
    pub fn block_pitch(&self) -> f32 {
        self.block_height + self.block_spacing
    }
}

/// Which external provider, if any, to ask before pattern matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    None,
    Gemini,
}

/// External analysis provider settings.
///
/// The API key is never stored in configuration. Only the name of the
/// environment variable holding it is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    kind: ProviderKind,
    model: String,
    endpoint: String,
    api_key_env: String,
    timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::None,
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Visual styling configuration for exported diagrams.
///
/// Every field is a CSS color string. Unset fields fall back to the
/// built-in palette.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    background_color: Option<String>,
    #[serde(default)]
    section_fill: Option<String>,
    #[serde(default)]
    section_stroke: Option<String>,
    #[serde(default)]
    block_fill: Option<String>,
    #[serde(default)]
    block_stroke: Option<String>,
    #[serde(default)]
    connection_stroke: Option<String>,
    #[serde(default)]
    annotation_fill: Option<String>,
    #[serde(default)]
    annotation_stroke: Option<String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    pub fn section_fill(&self) -> Result<Color, String> {
        resolve(&self.section_fill, "#f5f5f5", "section fill")
    }

    pub fn section_stroke(&self) -> Result<Color, String> {
        resolve(&self.section_stroke, "#cccccc", "section stroke")
    }

    pub fn block_fill(&self) -> Result<Color, String> {
        resolve(&self.block_fill, "#e3f2fd", "block fill")
    }

    pub fn block_stroke(&self) -> Result<Color, String> {
        resolve(&self.block_stroke, "#1976d2", "block stroke")
    }

    pub fn connection_stroke(&self) -> Result<Color, String> {
        resolve(&self.connection_stroke, "#666666", "connection stroke")
    }

    pub fn annotation_fill(&self) -> Result<Color, String> {
        resolve(&self.annotation_fill, "#fff3cd", "annotation fill")
    }

    pub fn annotation_stroke(&self) -> Result<Color, String> {
        resolve(&self.annotation_stroke, "#ffc107", "annotation stroke")
    }
}

fn resolve(value: &Option<String>, default: &str, what: &str) -> Result<Color, String> {
    Color::new(value.as_deref().unwrap_or(default))
        .map_err(|err| format!("Invalid {what} color in config: {err}"))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_default_layout_geometry() {
        let layout = LayoutConfig::default();
        assert_approx_eq!(f32, layout.section_width(), 280.0);
        assert_approx_eq!(f32, layout.block_width(), 255.0);
        assert_approx_eq!(f32, layout.block_pitch(), 102.0);
        assert_approx_eq!(f32, layout.section_x(SectionKind::Outputs), 840.0);
    }

    #[test]
    fn test_default_palette_parses() {
        let style = StyleConfig::default();
        assert!(style.section_fill().is_ok());
        assert!(style.section_stroke().is_ok());
        assert!(style.block_fill().is_ok());
        assert!(style.block_stroke().is_ok());
        assert!(style.connection_stroke().is_ok());
        assert!(style.annotation_fill().is_ok());
        assert!(style.annotation_stroke().is_ok());
        assert_eq!(style.background_color(), Ok(None));
    }

    #[test]
    fn test_invalid_color_reports_field() {
        let style = StyleConfig {
            block_fill: Some("not-a-color".to_string()),
            ..StyleConfig::default()
        };
        let err = style.block_fill().unwrap_err();
        assert!(err.contains("block fill"), "{err}");
    }

    #[test]
    fn test_provider_defaults() {
        let provider = ProviderConfig::default();
        assert_eq!(provider.kind(), ProviderKind::None);
        assert_eq!(provider.api_key_env(), "GEMINI_API_KEY");
        assert_eq!(provider.timeout(), Duration::from_secs(30));
    }
}
