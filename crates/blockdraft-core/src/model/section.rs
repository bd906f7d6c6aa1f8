//! The five fixed functional sections.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the five functional columns, in layout order.
///
/// The declaration order is the column index and the classification order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Power,
    Inputs,
    Control,
    Outputs,
    Peripherals,
}

impl SectionKind {
    /// All sections in their fixed order.
    pub const ALL: [SectionKind; 5] = [
        Self::Power,
        Self::Inputs,
        Self::Control,
        Self::Outputs,
        Self::Peripherals,
    ];

    /// Stable identifier used in serialized diagrams.
    pub fn id(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Inputs => "inputs",
            Self::Control => "control",
            Self::Outputs => "outputs",
            Self::Peripherals => "peripherals",
        }
    }

    /// Column index of this section.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable section heading.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Power => "Power Supply",
            Self::Inputs => "Inputs Block",
            Self::Control => "Control and Processing Block",
            Self::Outputs => "Outputs Block",
            Self::Peripherals => "Other Peripherals",
        }
    }

    /// Block name used when classification leaves this section empty.
    pub fn default_block_name(self) -> &'static str {
        match self {
            Self::Power => "Power Supply",
            Self::Inputs => "Input Interface",
            Self::Control => "MCU/Processor",
            Self::Outputs => "Output Interface",
            Self::Peripherals => "Peripherals",
        }
    }

    /// Generic description of what the section does.
    pub fn default_details(self) -> &'static str {
        match self {
            Self::Power => {
                "Power supply provides regulated voltage (typically 5V or 3.3V) to all system \
                 components. Power flows from the source through voltage regulators to ensure \
                 stable operation. Current requirements depend on the total load of all \
                 connected components."
            }
            Self::Inputs => {
                "Input block receives signals from sensors and input devices. Signals may be \
                 analog (requiring ADC) or digital. Input voltage levels typically match the \
                 system logic levels (3.3V or 5V). Data is sampled and transmitted to the \
                 control block for processing."
            }
            Self::Control => {
                "Control and processing block contains the main microcontroller or processor. \
                 It processes input data, executes control algorithms, and manages \
                 communication with other blocks. Typical specifications include clock speed, \
                 memory capacity, and I/O capabilities."
            }
            Self::Outputs => {
                "Output block drives actuators, displays, and indicators based on control \
                 signals. Output drivers may be required for high-current devices. Voltage and \
                 current specifications depend on the specific output devices used."
            }
            Self::Peripherals => {
                "Peripheral block handles communication protocols (UART, SPI, I2C, WiFi, \
                 Bluetooth) and storage. Data rates and interface specifications vary based on \
                 the communication standard used. Storage capacity depends on application \
                 requirements."
            }
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| format!("unknown section `{s}`"))
    }
}

/// A functional column with its ordered block names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    id: SectionKind,
    name: String,
    #[serde(default)]
    blocks: Vec<String>,
    #[serde(default)]
    details: String,
}

impl Section {
    /// Creates a section with the standard heading for `kind`.
    pub fn new(kind: SectionKind, blocks: Vec<String>, details: impl Into<String>) -> Self {
        Self {
            id: kind,
            name: kind.display_name().to_string(),
            blocks,
            details: details.into(),
        }
    }

    /// Creates a section holding only the default block and details.
    pub fn with_defaults(kind: SectionKind) -> Self {
        Self::new(
            kind,
            vec![kind.default_block_name().to_string()],
            kind.default_details(),
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn kind(&self) -> SectionKind {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn details(&self) -> &str {
        &self.details
    }
}
