//! Google Gemini `generateContent` backend.

use std::fmt;

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use super::{Provider, ProviderError};
use crate::config::ProviderConfig;

/// Generation strategy recorded for Gemini-produced diagrams.
pub const GEMINI_PROVIDER_ID: &str = "gemini-api";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Blocking Gemini client. The key travels in a header, never in the URL.
pub struct GeminiProvider {
    client: Client,
    url: String,
    api_key: String,
}

impl GeminiProvider {
    /// Creates a client for the configured endpoint and model.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig, api_key: String) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint().trim_end_matches('/'),
            config.model()
        );
        Ok(Self {
            client,
            url,
            api_key,
        })
    }
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Provider for GeminiProvider {
    fn id(&self) -> &str {
        GEMINI_PROVIDER_ID
    }

    fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(url = self.url.as_str(); "Sending generateContent request");

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        first_text(response.json()?)
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

fn first_text(response: GenerateResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .map(|part| part.text.trim().to_string())
        .find(|text| !text.is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_skips_empty_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "  " }] } },
                { "content": { "parts": [{ "text": " {\"sections\": []} " }] } }
            ]
        }))
        .unwrap();
        assert_eq!(first_text(response).unwrap(), "{\"sections\": []}");
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        let response: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            first_text(response),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn test_url_and_debug_hide_key() {
        let provider =
            GeminiProvider::new(&ProviderConfig::default(), "secret-key".into()).unwrap();
        assert_eq!(
            provider.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        let debug = format!("{provider:?}");
        assert!(!debug.contains("secret-key"));
    }
}
