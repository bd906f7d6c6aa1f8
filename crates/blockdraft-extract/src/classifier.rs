use log::debug;

use blockdraft_core::model::SectionKind;

use crate::vocabulary::vocabulary;

// Applied in order when no vocabulary matches. Anything left is a peripheral.
const STEM_RULES: &[(&[&str], SectionKind)] = &[
    (&["sensor", "input", "detect"], SectionKind::Inputs),
    (&["display", "output", "show"], SectionKind::Outputs),
    (&["process", "control", "mcu"], SectionKind::Control),
];

/// Block names grouped by section. Every section holds at least one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    buckets: [Vec<String>; 5],
}

impl Classification {
    pub fn blocks(&self, kind: SectionKind) -> &[String] {
        &self.buckets[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &[String])> {
        SectionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.blocks(kind)))
    }

    pub fn into_buckets(self) -> [Vec<String>; 5] {
        self.buckets
    }
}

/// Picks the section for one candidate name.
pub fn classify_candidate(candidate: &str) -> SectionKind {
    let lower = candidate.to_lowercase();
    if let Some(kind) = vocabulary().first_match(&lower) {
        return kind;
    }
    STEM_RULES
        .iter()
        .find(|(stems, _)| stems.iter().any(|stem| lower.contains(stem)))
        .map_or(SectionKind::Peripherals, |(_, kind)| *kind)
}

/// Upper-cases the first character of every space-separated word and
/// lower-cases the rest.
pub fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sorts candidates into the five sections and fills empty sections with
/// their default block name.
///
/// Names are title-cased. A name is kept once per section, at its first
/// position.
pub fn classify(candidates: &[String]) -> Classification {
    let mut buckets: [Vec<String>; 5] = Default::default();

    for candidate in candidates {
        let kind = classify_candidate(candidate);
        let name = title_case(candidate);
        let bucket = &mut buckets[kind.index()];
        if !bucket.contains(&name) {
            bucket.push(name);
        }
    }

    for kind in SectionKind::ALL {
        let bucket = &mut buckets[kind.index()];
        if bucket.is_empty() {
            debug!(section:% = kind; "No candidates, using default block");
            bucket.push(kind.default_block_name().to_string());
        }
    }

    Classification { buckets }
}
