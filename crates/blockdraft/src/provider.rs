//! External analysis provider collaborator.
//!
//! A [`Provider`] turns a prompt into raw text. This module builds the
//! prompt, and turns the text back into five [`SectionDraft`]s. Every
//! failure is reported as a [`ProviderError`], which the generator recovers
//! from by falling back to pattern matching.

mod gemini;

pub use gemini::{GEMINI_PROVIDER_ID, GeminiProvider};

use std::env;

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use blockdraft_core::model::{Section, SectionKind};

use crate::{
    config::{ProviderConfig, ProviderKind},
    layout::SectionDraft,
};

/// Number of response characters kept in log lines.
const RESPONSE_SNIPPET_CHARS: usize = 500;

/// Failures while talking to a provider or reading its answer.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}")]
    Status { status: u16 },

    #[error("provider returned no text")]
    EmptyResponse,

    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A text-completion backend.
pub trait Provider: Send + Sync {
    /// Identifier recorded as the diagram's generation strategy.
    fn id(&self) -> &str;

    /// Sends `prompt` and returns the raw completion text.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] for transport failures, non-success
    /// responses, or empty completions.
    fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// A provider answer that passed structural validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAnalysis {
    drafts: [SectionDraft; 5],
    solution: Option<String>,
}

impl ProviderAnalysis {
    pub fn drafts(&self) -> &[SectionDraft; 5] {
        &self.drafts
    }

    pub fn solution(&self) -> Option<&str> {
        self.solution.as_deref()
    }

    pub fn into_parts(self) -> ([SectionDraft; 5], Option<String>) {
        (self.drafts, self.solution)
    }
}

/// Builds the configured provider.
///
/// Returns `None` when no provider is configured, or when the API key
/// variable is unset or empty, in which case a warning is logged.
pub fn from_config(config: &ProviderConfig) -> Option<Box<dyn Provider>> {
    match config.kind() {
        ProviderKind::None => None,
        ProviderKind::Gemini => {
            let key = env::var(config.api_key_env())
                .ok()
                .filter(|key| !key.trim().is_empty());
            let Some(key) = key else {
                warn!(
                    env_var = config.api_key_env();
                    "API key not set, falling back to pattern matching"
                );
                return None;
            };
            match GeminiProvider::new(config, key) {
                Ok(provider) => {
                    info!(model = config.model(); "Using Gemini provider");
                    Some(Box::new(provider))
                }
                Err(err) => {
                    warn!(err:%; "Failed to initialize Gemini provider");
                    None
                }
            }
        }
    }
}

/// Asks `provider` to analyze `description`.
///
/// # Errors
///
/// Returns the provider's own failure, or a parse/validation failure of
/// its answer. The start of an unusable answer is logged.
pub fn analyze(
    provider: &dyn Provider,
    description: &str,
) -> Result<ProviderAnalysis, ProviderError> {
    let prompt = build_prompt(description);
    let text = provider.complete(&prompt)?;
    debug!(provider = provider.id(), chars = text.len(); "Provider answered");

    parse_response(&text).inspect_err(|err| {
        warn!(
            provider = provider.id(),
            err:%,
            response = snippet(&text);
            "Unusable provider response"
        );
    })
}

/// Prompt requesting the five-section schema for `description`.
pub fn build_prompt(description: &str) -> String {
    let schema = SectionKind::ALL
        .into_iter()
        .map(|kind| {
            format!(
                r#"    {{"id": "{id}", "name": "{name}", "blocks": ["Component1"], "blockSpecs": {{"Component1": "Technical specs"}}, "details": "Section details..."}}"#,
                id = kind.id(),
                name = kind.display_name(),
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"You are an electronics engineer. Analyze this product and generate a block diagram in JSON format.

Product: "{description}"

Return ONLY a JSON object (no markdown, no extra text) with 5 sections:
{{
  "sections": [
{schema}
  ],
  "solution": "How components work together..."
}}

IMPORTANT:
- blockSpecs MUST have specific technical details for THIS product (voltage, current, resolution, frequency, etc.)
- Each block must reference actual components used in THIS product
- Do NOT use generic specifications
- Return ONLY valid JSON, nothing else"#
    )
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    sections: Vec<RawSection>,
    #[serde(default)]
    solution: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSection {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    blocks: Vec<String>,
    #[serde(default)]
    block_specs: IndexMap<String, String>,
    #[serde(default)]
    details: Option<String>,
}

impl RawSection {
    fn into_draft(self, kind: SectionKind) -> SectionDraft {
        let mut blocks: Vec<String> = self
            .blocks
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if blocks.is_empty() {
            blocks.push(kind.default_block_name().to_string());
        }
        let details = self
            .details
            .filter(|details| !details.trim().is_empty())
            .unwrap_or_else(|| kind.default_details().to_string());

        let mut section = Section::new(kind, blocks, details);
        if let Some(name) = self.name.filter(|name| !name.trim().is_empty()) {
            section = section.with_name(name);
        }
        SectionDraft::new(section).with_specs(self.block_specs)
    }
}

/// Parses a completion into five drafts in fixed section order.
///
/// Markdown code fences and any text after the last `}` are ignored. All
/// five section ids must be present. Unknown ids are ignored, and the first
/// entry wins for a repeated id.
///
/// # Errors
///
/// Returns [`ProviderError::Json`] for unparseable text and
/// [`ProviderError::Malformed`] when a section is missing.
pub fn parse_response(text: &str) -> Result<ProviderAnalysis, ProviderError> {
    let raw: RawResponse = serde_json::from_str(extract_json(text))?;

    let mut slots: [Option<RawSection>; 5] = Default::default();
    for section in raw.sections {
        match section.id.parse::<SectionKind>() {
            Ok(kind) if slots[kind.index()].is_none() => slots[kind.index()] = Some(section),
            Ok(_) => {}
            Err(_) => debug!(id = section.id.as_str(); "Ignoring unknown section id"),
        }
    }

    let mut drafts = Vec::with_capacity(slots.len());
    for (kind, slot) in SectionKind::ALL.into_iter().zip(slots) {
        let section =
            slot.ok_or_else(|| ProviderError::Malformed(format!("missing section `{kind}`")))?;
        drafts.push(section.into_draft(kind));
    }
    let drafts: [SectionDraft; 5] = drafts
        .try_into()
        .map_err(|_| ProviderError::Malformed("expected five sections".to_string()))?;

    let solution = raw.solution.filter(|s| !s.trim().is_empty());
    Ok(ProviderAnalysis { drafts, solution })
}

fn extract_json(text: &str) -> &str {
    let mut json = text.trim();
    if let Some(rest) = json.strip_prefix("```json") {
        json = rest;
    } else if let Some(rest) = json.strip_prefix("```") {
        json = rest;
    }
    json = json.trim();
    if let Some(rest) = json.strip_suffix("```") {
        json = rest.trim_end();
    }
    if let Some(last) = json.rfind('}') {
        json = &json[..=last];
    }
    json
}

fn snippet(text: &str) -> String {
    text.chars().take(RESPONSE_SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_response() -> String {
        let sections = SectionKind::ALL
            .into_iter()
            .map(|kind| {
                format!(
                    r#"{{"id": "{kind}", "name": "N {kind}", "blocks": ["{kind} part"], "blockSpecs": {{"{kind} part": "spec {kind}"}}, "details": "d {kind}"}}"#
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        format!(r#"{{"sections": [{sections}], "solution": "It works."}}"#)
    }

    #[test]
    fn test_parse_plain_response() {
        let analysis = parse_response(&full_response()).unwrap();
        let inputs = &analysis.drafts()[SectionKind::Inputs.index()];
        assert_eq!(inputs.section().kind(), SectionKind::Inputs);
        assert_eq!(inputs.section().name(), "N inputs");
        assert_eq!(inputs.section().blocks(), ["inputs part"]);
        assert_eq!(inputs.section().details(), "d inputs");
        assert_eq!(inputs.spec_for("inputs part"), Some("spec inputs"));
        assert_eq!(analysis.solution(), Some("It works."));
    }

    #[test]
    fn test_parse_fenced_response_with_trailer() {
        let text = format!("```json\n{}\n```\nHope this helps!", full_response());
        assert!(parse_response(&text).is_ok());

        let text = format!("{} trailing words", full_response());
        assert!(parse_response(&text).is_ok());
    }

    #[test]
    fn test_sections_reordered_and_unknown_ignored() {
        let text = r#"{"sections": [
            {"id": "peripherals", "blocks": ["Wifi"]},
            {"id": "bogus", "blocks": ["X"]},
            {"id": "outputs", "blocks": []},
            {"id": "control", "blocks": ["Esp32"]},
            {"id": "inputs", "blocks": ["Camera"]},
            {"id": "power", "blocks": ["Battery"]}
        ]}"#;
        let analysis = parse_response(text).unwrap();
        let kinds: Vec<_> = analysis.drafts().iter().map(|d| d.section().kind()).collect();
        assert_eq!(kinds, SectionKind::ALL);

        let outputs = analysis.drafts()[SectionKind::Outputs.index()].section();
        assert_eq!(outputs.blocks(), ["Output Interface"]);
        assert_eq!(outputs.details(), SectionKind::Outputs.default_details());
        assert_eq!(outputs.name(), "Outputs Block");
        assert_eq!(analysis.solution(), None);
    }

    #[test]
    fn test_missing_section_is_malformed() {
        let text = r#"{"sections": [{"id": "power", "blocks": ["Battery"]}]}"#;
        assert!(matches!(parse_response(text), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_non_json_is_rejected() {
        assert!(matches!(
            parse_response("I cannot help with that."),
            Err(ProviderError::Json(_))
        ));
    }

    #[test]
    fn test_prompt_mentions_every_section() {
        let prompt = build_prompt("smart lamp");
        assert!(prompt.contains(r#"Product: "smart lamp""#));
        for kind in SectionKind::ALL {
            assert!(prompt.contains(&format!(r#""id": "{kind}""#)));
        }
    }

    #[test]
    fn test_unconfigured_provider_is_none() {
        assert!(from_config(&ProviderConfig::default()).is_none());
    }

    #[test]
    fn test_missing_key_degrades_to_none() {
        let config: ProviderConfig = toml_like_config("BLOCKDRAFT_TEST_UNSET_KEY");
        assert!(from_config(&config).is_none());
    }

    fn toml_like_config(env_var: &str) -> ProviderConfig {
        serde_json::from_value(serde_json::json!({
            "kind": "gemini",
            "api_key_env": env_var,
        }))
        .unwrap()
    }
}
