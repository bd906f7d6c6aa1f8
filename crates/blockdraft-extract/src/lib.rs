//! Component extraction and classification for Blockdraft.
//!
//! Free text goes through two pure, deterministic stages:
//!
//! ```text
//! description
//!     ↓ lower-case
//!     ↓ extract_components   (vocabulary, capitalized phrases, quoted phrases)
//! candidate names
//!     ↓ classify             (first-match-wins vocabulary, stem fallback, defaults)
//! Classification             (five non-empty block-name lists)
//! ```
//!
//! The vocabulary is process-wide immutable data, built once on first use.

mod classifier;
mod extractor;
mod lexer;
mod vocabulary;

pub use classifier::{Classification, classify, classify_candidate, title_case};
pub use extractor::extract_components;
pub use lexer::{Token, capitalized_phrases, quoted_phrases, tokenize};
pub use vocabulary::{CategoryVocabulary, Vocabulary, vocabulary};

use log::{debug, info};

/// Runs the full pattern-matching analysis over a product description.
///
/// The description is lower-cased before extraction, so only vocabulary
/// terms and quoted phrases contribute candidates. Empty input produces a
/// classification made entirely of default blocks.
///
/// # Examples
///
/// ```
/// use blockdraft_core::model::SectionKind;
///
/// let classification = blockdraft_extract::analyze("Desk lamp with a touch button and LED");
/// assert_eq!(classification.blocks(SectionKind::Power), ["Power Supply"]);
/// assert!(classification.blocks(SectionKind::Outputs).contains(&"Led".to_string()));
/// ```
pub fn analyze(description: &str) -> Classification {
    info!(chars = description.chars().count(); "Analyzing description");

    let lowered = description.to_lowercase();
    let candidates = extract_components(&lowered);
    debug!(candidates:? = candidates; "Extracted candidates");

    classify(&candidates)
}
