use blockdraft_core::model::SectionKind;
use blockdraft_extract::{Token, analyze, classify, extract_components, tokenize};

#[test]
fn test_doorbell_description() {
    let classification = analyze(
        "Smart doorbell with camera, PIR motion sensor, microphone, and cloud connectivity",
    );

    assert_eq!(
        classification.blocks(SectionKind::Inputs),
        ["Sensor", "Camera", "Microphone", "Motion Sensor"]
    );
    assert_eq!(classification.blocks(SectionKind::Peripherals), ["Connectivity"]);
    assert_eq!(classification.blocks(SectionKind::Power), ["Power Supply"]);
    assert_eq!(classification.blocks(SectionKind::Outputs), ["Output Interface"]);
    assert_eq!(classification.blocks(SectionKind::Control), ["MCU/Processor"]);
}

#[test]
fn test_analysis_is_case_insensitive() {
    let upper = analyze("BATTERY powered ESP32 with OLED DISPLAY");
    let lower = analyze("battery powered esp32 with oled display");
    assert_eq!(upper, lower);
    assert_eq!(upper.blocks(SectionKind::Power), ["Battery"]);
    assert_eq!(upper.blocks(SectionKind::Control), ["Esp32"]);
    assert_eq!(upper.blocks(SectionKind::Outputs), ["Display", "Oled"]);
}

#[test]
fn test_multi_word_terms_across_whitespace() {
    let found = extract_components("a solar\n   panel on the roof");
    assert_eq!(found, ["solar panel"]);
}

#[test]
fn test_mixed_case_text_keeps_capitalized_and_quoted_phrases() {
    let found = extract_components("Garden Monitor reading a \"soil probe\" over lora");
    assert_eq!(found, ["Garden Monitor", "soil probe"]);

    let classification = classify(&found);
    // Neither phrase hits a vocabulary term or a stem.
    assert_eq!(
        classification.blocks(SectionKind::Peripherals),
        ["Garden Monitor", "Soil Probe"]
    );
}

#[test]
fn test_empty_description_is_all_defaults() {
    let classification = analyze("");
    for (kind, blocks) in classification.iter() {
        assert_eq!(blocks, [kind.default_block_name()]);
    }
}

#[test]
fn test_tokenize_never_loses_text() {
    let text = "µC \"half open, ok?";
    let rebuilt: String = tokenize(text)
        .into_iter()
        .map(|token| match token {
            Token::Word(s) | Token::Space(s) => s.to_string(),
            Token::Quoted(s) => format!("\"{s}\""),
            Token::Symbol(c) => c.to_string(),
        })
        .collect();
    assert_eq!(rebuilt, text);
}

mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn every_section_is_populated(text in "\\PC{0,120}") {
            let classification = analyze(&text);
            for (kind, blocks) in classification.iter() {
                prop_assert!(!blocks.is_empty(), "{kind} has no blocks");
            }
        }

        #[test]
        fn analysis_is_deterministic(text in "[a-zA-Z \"]{0,80}") {
            prop_assert_eq!(analyze(&text), analyze(&text));
        }
    }
}
