//! The generation pipeline: text to a laid-out [`Diagram`].
//!
//! ```text
//! description
//!     ↓ provider (optional, any failure falls through)
//!     ↓ pattern matching (extract → classify)
//! five SectionDrafts
//!     ↓ layout engine
//! Diagram with six section-level connections
//! ```

use chrono::Utc;
use log::{info, warn};

use blockdraft_core::model::{
    DEFAULT_SOLUTION, Diagram, GenerationStrategy, Metadata, Section, SectionKind,
};

use crate::{
    config::LayoutConfig,
    layout::{Engine, SectionDraft},
    provider::{self, Provider},
};

/// Turns descriptions into diagrams. Generation never fails.
pub struct DiagramGenerator {
    engine: Engine,
    provider: Option<Box<dyn Provider>>,
}

impl DiagramGenerator {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            engine: Engine::new(layout),
            provider: None,
        }
    }

    /// Consults `provider` first on every generation.
    pub fn with_provider(mut self, provider: Box<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn provider_id(&self) -> Option<&str> {
        self.provider.as_deref().map(Provider::id)
    }

    /// Generates a diagram for `description`.
    ///
    /// A provider failure of any kind is logged and the deterministic
    /// pattern-matching path runs instead.
    pub fn generate(&self, description: &str) -> Diagram {
        let (drafts, strategy, solution) = self
            .provider
            .as_deref()
            .and_then(|provider| consult(provider, description))
            .unwrap_or_else(|| {
                (
                    pattern_drafts(description),
                    GenerationStrategy::PatternMatching,
                    None,
                )
            });

        let blocks = self.engine.place(&drafts);
        let sections = drafts.map(SectionDraft::into_section);
        let metadata = Metadata::new(
            description,
            Utc::now(),
            strategy,
            solution.unwrap_or_else(|| DEFAULT_SOLUTION.to_string()),
        );
        let diagram = Diagram::new(description, sections, blocks, metadata);

        info!(
            diagram_id:% = diagram.id(),
            strategy:% = diagram.metadata().generated_by(),
            blocks = diagram.blocks().len();
            "Diagram generated"
        );
        diagram
    }
}

type Generated = ([SectionDraft; 5], GenerationStrategy, Option<String>);

fn consult(provider: &dyn Provider, description: &str) -> Option<Generated> {
    match provider::analyze(provider, description) {
        Ok(analysis) => {
            let (drafts, solution) = analysis.into_parts();
            let strategy = GenerationStrategy::Provider(provider.id().to_string());
            Some((drafts, strategy, solution))
        }
        Err(err) => {
            warn!(
                provider = provider.id(),
                description,
                err:%;
                "Provider failed, falling back to pattern matching"
            );
            None
        }
    }
}

/// Drafts produced by the extractor and classifier alone.
pub fn pattern_drafts(description: &str) -> [SectionDraft; 5] {
    let buckets = blockdraft_extract::analyze(description).into_buckets();
    let mut buckets = buckets.into_iter();
    SectionKind::ALL.map(|kind| {
        let blocks = buckets.next().unwrap_or_default();
        SectionDraft::new(Section::new(kind, blocks, kind.default_details()))
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use blockdraft_core::model::Endpoint;

    use super::*;
    use crate::provider::ProviderError;

    struct Canned {
        answer: Option<String>,
    }

    impl Canned {
        fn answering(text: &str) -> Self {
            Self {
                answer: Some(text.to_string()),
            }
        }

        fn failing() -> Self {
            Self { answer: None }
        }
    }

    impl Provider for Canned {
        fn id(&self) -> &str {
            "canned"
        }

        fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.answer.clone().ok_or(ProviderError::EmptyResponse)
        }
    }

    const DOORBELL: &str =
        "Smart doorbell with camera, PIR motion sensor, microphone, and cloud connectivity";

    #[test]
    fn test_pattern_matching_without_provider() {
        let diagram = DiagramGenerator::new(LayoutConfig::default()).generate(DOORBELL);

        assert_eq!(
            diagram.metadata().generated_by(),
            &GenerationStrategy::PatternMatching
        );
        assert_eq!(diagram.metadata().solution(), DEFAULT_SOLUTION);
        assert_eq!(diagram.metadata().original_description(), DOORBELL);
        assert_eq!(
            diagram.section(SectionKind::Inputs).blocks(),
            ["Sensor", "Camera", "Microphone", "Motion Sensor"]
        );
        assert_eq!(diagram.blocks_in(SectionKind::Inputs).count(), 4);
        assert_eq!(diagram.connections().len(), 6);
        assert!(diagram.connections().iter().all(|c| !c.is_bound()));
        assert!(diagram.validate().is_ok());
    }

    #[test]
    fn test_provider_answer_is_used() {
        let sections = SectionKind::ALL
            .into_iter()
            .map(|kind| format!(r#"{{"id": "{kind}", "blocks": ["{kind} chip"]}}"#))
            .collect::<Vec<_>>()
            .join(",");
        let provider = Canned::answering(&format!(
            r#"{{"sections": [{sections}], "solution": "Custom."}}"#
        ));
        let generator =
            DiagramGenerator::new(LayoutConfig::default()).with_provider(Box::new(provider));

        let diagram = generator.generate("anything");
        assert_eq!(
            diagram.metadata().generated_by(),
            &GenerationStrategy::Provider("canned".into())
        );
        assert_eq!(diagram.metadata().solution(), "Custom.");
        assert_eq!(diagram.blocks()[0].name(), "power chip");
    }

    #[test]
    fn test_provider_failure_falls_back() {
        let provider = Box::new(Canned::failing());
        let generator = DiagramGenerator::new(LayoutConfig::default()).with_provider(provider);
        let diagram = generator.generate(DOORBELL);
        assert_eq!(
            diagram.metadata().generated_by(),
            &GenerationStrategy::PatternMatching
        );

        let fallback = DiagramGenerator::new(LayoutConfig::default()).generate(DOORBELL);
        assert_eq!(diagram.sections(), fallback.sections());
        assert_eq!(diagram.blocks(), fallback.blocks());
    }

    #[test]
    fn test_malformed_provider_answer_falls_back() {
        let provider = Canned::answering("```json\n{\"sections\": \"nope\"}\n```");
        let generator =
            DiagramGenerator::new(LayoutConfig::default()).with_provider(Box::new(provider));
        let diagram = generator.generate("desk lamp");
        assert_eq!(
            diagram.metadata().generated_by(),
            &GenerationStrategy::PatternMatching
        );
    }

    #[test]
    fn test_default_connections_reference_sections() {
        let diagram = DiagramGenerator::new(LayoutConfig::default()).generate("lamp");
        let first = &diagram.connections()[0];
        assert_eq!(first.from(), &Endpoint::Section(SectionKind::Power));
        assert_eq!(first.to(), &Endpoint::Section(SectionKind::Control));
        assert_eq!(first.label(), "Power");
    }

    proptest! {
        #[test]
        fn every_generation_has_five_populated_sections(text in "\\PC{0,80}") {
            let diagram = DiagramGenerator::new(LayoutConfig::default()).generate(&text);
            let kinds: Vec<_> = diagram.sections().iter().map(Section::kind).collect();
            prop_assert_eq!(kinds, SectionKind::ALL.to_vec());
            for kind in SectionKind::ALL {
                prop_assert!(diagram.blocks_in(kind).count() >= 1);
            }
            prop_assert!(diagram.validate().is_ok());
        }
    }
}
