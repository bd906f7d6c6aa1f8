//! Blockdraft - editable electronics block diagrams from product descriptions.
//!
//! A free-text description is analyzed into five fixed sections (power,
//! inputs, control, outputs, peripherals), laid out deterministically, and
//! can then be edited on a canvas, persisted, and exported as JSON, SVG, or
//! draw.io XML.

pub mod config;
pub mod export;
pub mod layout;
pub mod provider;
pub mod reconciler;
pub mod service;
pub mod store;

mod error;
mod generator;

pub use blockdraft_core::{color, draw, geometry, model};

pub use error::BlockdraftError;
pub use generator::{DiagramGenerator, pattern_drafts};

use log::{debug, info};

use config::AppConfig;
use export::{ExportArtifact, ExportFormat};
use model::Diagram;

/// Builder for generating and exporting diagrams without a store.
///
/// # Examples
///
/// ```rust
/// use blockdraft::{DiagramBuilder, config::AppConfig, export::ExportFormat};
///
/// let builder = DiagramBuilder::new(AppConfig::default());
///
/// let diagram = builder.generate("Weather station with solar panel and lcd")
///     .expect("Failed to generate");
///
/// let svg = builder.export(&diagram, ExportFormat::VectorImage)
///     .expect("Failed to export");
/// assert_eq!(svg.content_type(), "image/svg+xml");
/// ```
pub struct DiagramBuilder {
    config: AppConfig,
    generator: DiagramGenerator,
}

impl Default for DiagramBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// The generator consults the configured provider when its API key is
    /// set, and pattern matching otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockdraft::{DiagramBuilder, config::AppConfig};
    ///
    /// let builder = DiagramBuilder::new(AppConfig::default());
    /// ```
    pub fn new(config: AppConfig) -> Self {
        let mut generator = DiagramGenerator::new(config.layout().clone());
        if let Some(provider) = provider::from_config(config.provider()) {
            generator = generator.with_provider(provider);
        }
        Self { config, generator }
    }

    /// Replaces the generator, for example to inject a provider.
    pub fn with_generator(mut self, generator: DiagramGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Generate a validated diagram from a description.
    ///
    /// # Errors
    ///
    /// Returns [`BlockdraftError::InputValidation`] for an empty or
    /// whitespace-only description.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockdraft::{DiagramBuilder, model::SectionKind};
    ///
    /// let diagram = DiagramBuilder::default()
    ///     .generate("Drone with gps, camera and lipo battery")
    ///     .expect("Failed to generate");
    ///
    /// assert_eq!(diagram.sections().len(), 5);
    /// assert!(diagram.blocks_in(SectionKind::Inputs).count() >= 1);
    /// ```
    pub fn generate(&self, description: &str) -> Result<Diagram, BlockdraftError> {
        if description.trim().is_empty() {
            return Err(BlockdraftError::InputValidation(
                "description must not be empty".to_string(),
            ));
        }
        info!("Generating diagram");
        let diagram = self.generator.generate(description);
        diagram.validate()?;
        debug!(diagram_id:% = diagram.id(); "Diagram generated successfully");
        Ok(diagram)
    }

    /// Export a diagram in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`BlockdraftError::Export`] if the exporter fails.
    pub fn export(
        &self,
        diagram: &Diagram,
        format: ExportFormat,
    ) -> Result<ExportArtifact, BlockdraftError> {
        info!(format:% = format; "Exporting diagram");
        Ok(export::export(diagram, format, &self.config)?)
    }
}
