//! Curated component vocabularies, one per section.
//!
//! The vocabulary is an ordered list of `(section, terms, predicate)`
//! entries evaluated in [`SectionKind::ALL`] order. It is built once, read
//! only afterwards, and shared by every thread without locking.

use std::sync::LazyLock;

use regex::Regex;

use blockdraft_core::model::SectionKind;

const POWER_TERMS: &[&str] = &[
    "battery", "power supply", "ac adapter", "usb power", "dc power",
    "voltage regulator", "charger", "power source", "external power",
    "power management", "pmic", "5v", "12v", "3.3v", "lipo", "solar panel",
    "ac power", "power distribution",
];

const INPUT_TERMS: &[&str] = &[
    "sensor", "camera", "microphone", "button", "switch", "motion sensor",
    "temperature sensor", "humidity sensor", "pressure sensor", "accelerometer",
    "gyroscope", "gps", "keypad", "touch", "infrared", "ir receiver",
    "proximity", "light sensor", "photodiode", "encoder", "rotary encoder",
    "pir sensor", "distance sensor", "flow sensor", "optical sensor",
];

const CONTROL_TERMS: &[&str] = &[
    "microcontroller", "mcu", "processor", "cpu", "arduino", "raspberry pi",
    "esp32", "esp8266", "stm32", "arm", "pic", "atmega", "fpga",
    "dsp", "signal processor", "ai processor", "neural network", "control unit",
    "system-on-chip", "soc", "compute module", "processor module",
];

const OUTPUT_TERMS: &[&str] = &[
    "led", "display", "lcd", "oled", "screen", "buzzer", "speaker",
    "motor", "servo", "actuator", "relay", "valve", "indicator",
    "vibrator", "haptic", "printer", "driver", "output device", "notification",
];

const PERIPHERAL_TERMS: &[&str] = &[
    "wifi", "bluetooth", "ethernet", "usb", "uart", "spi", "i2c",
    "memory", "flash", "sd card", "eeprom", "ram", "storage",
    "rtc", "real-time clock", "watchdog", "oscillator", "crystal",
    "antenna", "transceiver", "modem", "gsm", "lte", "radio", "wireless",
    "communication module", "interface", "connectivity", "4g", "5g",
];

static VOCABULARY: LazyLock<Vocabulary> = LazyLock::new(Vocabulary::builtin);

/// Returns the process-wide vocabulary.
pub fn vocabulary() -> &'static Vocabulary {
    &VOCABULARY
}

/// A candidate belongs to a category when either string contains the other.
fn contains_either_way(candidate: &str, term: &str) -> bool {
    candidate.contains(term) || term.contains(candidate)
}

/// Vocabulary of a single section.
#[derive(Debug)]
pub struct CategoryVocabulary {
    kind: SectionKind,
    terms: &'static [&'static str],
    patterns: Vec<Regex>,
    predicate: fn(&str, &str) -> bool,
}

impl CategoryVocabulary {
    fn new(kind: SectionKind, terms: &'static [&'static str]) -> Self {
        let patterns = terms.iter().map(|term| term_pattern(term)).collect();
        Self {
            kind,
            terms,
            patterns,
            predicate: contains_either_way,
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn terms(&self) -> &'static [&'static str] {
        self.terms
    }

    /// Tests an already lower-cased candidate against every term.
    pub fn matches(&self, candidate: &str) -> bool {
        self.terms
            .iter()
            .any(|term| (self.predicate)(candidate, term))
    }

    /// Terms that occur in `text` on word boundaries, in vocabulary order.
    pub fn terms_in<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.terms
            .iter()
            .zip(&self.patterns)
            .filter(move |(_, pattern)| pattern.is_match(text))
            .map(|(term, _)| *term)
    }
}

/// The ordered set of category vocabularies.
#[derive(Debug)]
pub struct Vocabulary {
    categories: Vec<CategoryVocabulary>,
}

impl Vocabulary {
    fn builtin() -> Self {
        let categories = SectionKind::ALL
            .into_iter()
            .map(|kind| {
                let terms = match kind {
                    SectionKind::Power => POWER_TERMS,
                    SectionKind::Inputs => INPUT_TERMS,
                    SectionKind::Control => CONTROL_TERMS,
                    SectionKind::Outputs => OUTPUT_TERMS,
                    SectionKind::Peripherals => PERIPHERAL_TERMS,
                };
                CategoryVocabulary::new(kind, terms)
            })
            .collect();
        Self { categories }
    }

    /// Categories in classification order.
    pub fn categories(&self) -> &[CategoryVocabulary] {
        &self.categories
    }

    /// First category whose vocabulary matches the lower-cased candidate.
    pub fn first_match(&self, candidate: &str) -> Option<SectionKind> {
        self.categories
            .iter()
            .find(|category| category.matches(candidate))
            .map(CategoryVocabulary::kind)
    }
}

/// Compiles a case-insensitive, whitespace-tolerant, word-bounded pattern.
fn term_pattern(term: &str) -> Regex {
    let body = term
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&format!(r"(?i)\b{body}\b")).expect("escaped vocabulary terms are valid regexes")
}
