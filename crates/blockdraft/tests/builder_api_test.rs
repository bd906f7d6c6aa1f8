//! Integration tests for the DiagramBuilder API
//!
//! These tests verify that the public API works and is usable.

use blockdraft::{
    BlockdraftError, DiagramBuilder, DiagramGenerator,
    config::{AppConfig, LayoutConfig},
    export::ExportFormat,
    model::{Diagram, GenerationStrategy, SectionKind},
    provider::{Provider, ProviderError},
};

const DOORBELL: &str =
    "Smart doorbell with camera, PIR motion sensor, microphone, and cloud connectivity";

#[test]
fn test_builder_api_exists() {
    let _builder = DiagramBuilder::default();
}

#[test]
fn test_generate_yields_five_ordered_sections() {
    let diagram = DiagramBuilder::default()
        .generate(DOORBELL)
        .expect("Failed to generate diagram");

    let kinds: Vec<_> = diagram.sections().iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, SectionKind::ALL);
    for kind in SectionKind::ALL {
        assert!(
            diagram.blocks_in(kind).count() >= 1,
            "Section {kind} should have at least one block"
        );
    }
    assert_eq!(diagram.connections().len(), 6);
}

#[test]
fn test_doorbell_classification() {
    let diagram = DiagramBuilder::default().generate(DOORBELL).unwrap();
    let names = |kind| diagram.section(kind).blocks().to_vec();

    let inputs = names(SectionKind::Inputs);
    for expected in ["Camera", "Microphone", "Motion Sensor"] {
        assert!(inputs.iter().any(|name| name == expected), "missing {expected} in {inputs:?}");
    }
    assert_eq!(names(SectionKind::Peripherals), ["Connectivity"]);
    assert_eq!(names(SectionKind::Power), ["Power Supply"]);
    assert_eq!(names(SectionKind::Outputs), ["Output Interface"]);
}

#[test]
fn test_generate_empty_description_returns_error() {
    let result = DiagramBuilder::default().generate("   ");
    assert!(matches!(result, Err(BlockdraftError::InputValidation(_))));
}

#[test]
fn test_layout_is_deterministic() {
    let builder = DiagramBuilder::default();
    let first = builder.generate(DOORBELL).unwrap();
    let second = builder.generate(DOORBELL).unwrap();

    let geometry = |d: &Diagram| {
        d.blocks()
            .iter()
            .map(|b| (b.id().to_string(), b.bounds()))
            .collect::<Vec<_>>()
    };
    assert_eq!(geometry(&first), geometry(&second));
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_structured_dump_round_trip() {
    let builder = DiagramBuilder::default();
    let diagram = builder.generate(DOORBELL).unwrap();

    let artifact = builder
        .export(&diagram, ExportFormat::StructuredDump)
        .expect("Failed to export");
    assert_eq!(artifact.content_type(), "application/json");

    let restored = Diagram::from_json_slice(artifact.bytes()).expect("Failed to re-import");
    assert_eq!(restored, diagram);
}

#[test]
fn test_export_all_formats() {
    let builder = DiagramBuilder::new(AppConfig::default());
    let diagram = builder.generate("Smart thermostat with display and wifi").unwrap();

    for format in ExportFormat::ALL {
        let artifact = builder.export(&diagram, format).expect("Failed to export");
        assert!(!artifact.bytes().is_empty());
        assert!(artifact.file_name().ends_with(format.extension()));
    }

    let svg = builder.export(&diagram, ExportFormat::VectorImage).unwrap();
    let svg = String::from_utf8(svg.into_bytes()).unwrap();
    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
}

#[test]
fn test_interchange_export_skips_section_connections() {
    let builder = DiagramBuilder::default();
    let diagram = builder.generate(DOORBELL).unwrap();

    let xml = builder.export(&diagram, ExportFormat::InterchangeFormat).unwrap();
    let xml = String::from_utf8(xml.into_bytes()).unwrap();
    assert_eq!(xml.matches("edge=\"1\"").count(), 0);
    assert_eq!(xml.matches("vertex=\"1\"").count(), diagram.blocks().len());
}

#[test]
fn test_builder_reusability() {
    let builder = DiagramBuilder::default();
    for description in ["usb fan", "robot arm with servo motor", "gps tracker"] {
        assert!(builder.generate(description).is_ok());
    }
}

struct Offline;

impl Provider for Offline {
    fn id(&self) -> &str {
        "offline-test"
    }

    fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Status { status: 503 })
    }
}

#[test]
fn test_provider_failure_falls_back_to_pattern_matching() {
    let generator = DiagramGenerator::new(LayoutConfig::default()).with_provider(Box::new(Offline));
    assert_eq!(generator.provider_id(), Some("offline-test"));

    let builder = DiagramBuilder::default().with_generator(generator);
    let diagram = builder.generate(DOORBELL).expect("fallback should never fail");

    assert_eq!(diagram.metadata().generated_by(), &GenerationStrategy::PatternMatching);
    assert_eq!(diagram.section(SectionKind::Peripherals).blocks(), ["Connectivity"]);
}
