//! Export functionality for Blockdraft diagrams.
//!
//! Three independent, stateless backends turn a [`Diagram`] into bytes:
//!
//! - [`json`] - the structured dump, byte-identical to the persisted form
//! - [`svg`] - a vector image drawn with the layout engine's coordinates
//! - [`drawio`] - a node/edge interchange document
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. It converts into
//! [`BlockdraftError::Export`] at the crate boundary.
//!
//! [`BlockdraftError::Export`]: crate::BlockdraftError::Export

pub mod drawio;
pub mod json;
pub mod svg;

use std::{fmt, str::FromStr};

use thiserror::Error;

use blockdraft_core::model::{Diagram, ModelError};

use crate::config::AppConfig;

/// Abstraction for diagram export backends.
pub trait Exporter {
    /// The format this backend produces.
    fn format(&self) -> ExportFormat;

    /// Exports `diagram` to the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the diagram cannot be converted.
    fn export(&self, diagram: &Diagram) -> Result<Vec<u8>, Error>;
}

/// Errors that can occur during diagram export.
#[derive(Debug, Error)]
pub enum Error {
    /// A rendering or conversion failure described by the message.
    #[error("Render error: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] ModelError),
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    StructuredDump,
    VectorImage,
    InterchangeFormat,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::StructuredDump,
        ExportFormat::VectorImage,
        ExportFormat::InterchangeFormat,
    ];

    pub fn content_type(self) -> &'static str {
        match self {
            Self::StructuredDump => "application/json",
            Self::VectorImage => "image/svg+xml",
            Self::InterchangeFormat => "application/xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::StructuredDump => "json",
            Self::VectorImage => "svg",
            Self::InterchangeFormat => "xml",
        }
    }

    fn names(self) -> [&'static str; 2] {
        match self {
            Self::StructuredDump => ["structured-dump", "json"],
            Self::VectorImage => ["vector-image", "svg"],
            Self::InterchangeFormat => ["interchange-format", "drawio"],
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.names()[0])
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.names().contains(&needle.as_str()))
            .ok_or_else(|| {
                format!(
                    "unknown export format `{s}`, expected one of: json, svg, drawio, \
                     structured-dump, vector-image, interchange-format"
                )
            })
    }
}

/// Exported bytes with the metadata a download needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    bytes: Vec<u8>,
    content_type: &'static str,
    file_name: String,
}

impl ExportArtifact {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Suggested file name, `diagram_<id>.<ext>`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Looks up the backend for `format`.
///
/// # Errors
///
/// Returns [`Error::Render`] if the configured style cannot be parsed.
pub fn exporter_for(
    format: ExportFormat,
    config: &AppConfig,
) -> Result<Box<dyn Exporter>, Error> {
    Ok(match format {
        ExportFormat::StructuredDump => Box::new(json::JsonExporter),
        ExportFormat::VectorImage => {
            Box::new(svg::SvgExporter::new(config.layout(), config.style())?)
        }
        ExportFormat::InterchangeFormat => Box::new(drawio::DrawioExporter::new(config.layout())),
    })
}

/// Exports `diagram` as `format`.
///
/// # Errors
///
/// Returns [`Error`] if the backend fails.
pub fn export(
    diagram: &Diagram,
    format: ExportFormat,
    config: &AppConfig,
) -> Result<ExportArtifact, Error> {
    let exporter = exporter_for(format, config)?;
    let bytes = exporter.export(diagram)?;
    Ok(ExportArtifact {
        bytes,
        content_type: format.content_type(),
        file_name: format!("diagram_{}.{}", diagram.id(), format.extension()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_aliases() {
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::StructuredDump));
        assert_eq!("structured-dump".parse::<ExportFormat>(), Ok(ExportFormat::StructuredDump));
        assert_eq!("SVG".parse::<ExportFormat>(), Ok(ExportFormat::VectorImage));
        assert_eq!("vector-image".parse::<ExportFormat>(), Ok(ExportFormat::VectorImage));
        assert_eq!("drawio".parse::<ExportFormat>(), Ok(ExportFormat::InterchangeFormat));
        assert_eq!(
            "interchange-format".parse::<ExportFormat>(),
            Ok(ExportFormat::InterchangeFormat)
        );
        assert!("png".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_format_round_trips_through_display() {
        for format in ExportFormat::ALL {
            assert_eq!(format.to_string().parse::<ExportFormat>(), Ok(format));
        }
    }
}
