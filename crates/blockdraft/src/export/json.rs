//! Structured dump backend.

use blockdraft_core::model::Diagram;

use super::{Error, ExportFormat, Exporter};

/// Emits the canonical JSON form, the same bytes the stores persist.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::StructuredDump
    }

    fn export(&self, diagram: &Diagram) -> Result<Vec<u8>, Error> {
        Ok(diagram.to_json_bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use blockdraft_core::model::{GenerationStrategy, Metadata, Section, SectionKind};

    use super::*;

    #[test]
    fn test_dump_reimports_to_equal_diagram() {
        let strategy = GenerationStrategy::PatternMatching;
        let metadata = Metadata::new("x", chrono::Utc::now(), strategy, "s");
        let sections = SectionKind::ALL.map(Section::with_defaults);
        let diagram = Diagram::new("x", sections, Vec::new(), metadata);

        let bytes = JsonExporter.export(&diagram).unwrap();
        assert_eq!(bytes, diagram.to_json_bytes().unwrap());
        assert_eq!(Diagram::from_json_slice(&bytes).unwrap(), diagram);
    }
}
