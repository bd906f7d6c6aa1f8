use serde::{Deserialize, Serialize};

use crate::model::SectionKind;

/// One end of a [`Connection`].
///
/// Serialized as `{"kind": "section", "id": "power"}` or
/// `{"kind": "block", "id": "block_power_0"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Endpoint {
    Section(SectionKind),
    Block(String),
}

impl Endpoint {
    /// Returns the block id when this endpoint is bound to a block.
    pub fn block_id(&self) -> Option<&str> {
        match self {
            Self::Block(id) => Some(id),
            Self::Section(_) => None,
        }
    }

    pub fn section(&self) -> Option<SectionKind> {
        match self {
            Self::Section(kind) => Some(*kind),
            Self::Block(_) => None,
        }
    }
}

/// A directed, labeled edge.
///
/// Generated diagrams start with section-level (unbound) connections;
/// rebasing binds both endpoints to blocks. A mixed pair is never produced
/// by this crate but consumers must tolerate one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    id: String,
    from: Endpoint,
    to: Endpoint,
    #[serde(default)]
    label: String,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        from: Endpoint,
        to: Endpoint,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from,
            to,
            label: label.into(),
        }
    }

    /// Creates a connection between two sections.
    pub fn between_sections(
        id: impl Into<String>,
        from: SectionKind,
        to: SectionKind,
        label: impl Into<String>,
    ) -> Self {
        Self::new(id, Endpoint::Section(from), Endpoint::Section(to), label)
    }

    /// Creates a connection between two blocks.
    pub fn between_blocks(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::new(id, Endpoint::Block(from.into()), Endpoint::Block(to.into()), label)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn from(&self) -> &Endpoint {
        &self.from
    }

    pub fn to(&self) -> &Endpoint {
        &self.to
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Returns `(from, to)` block ids when both endpoints are bound to blocks.
    pub fn block_endpoints(&self) -> Option<(&str, &str)> {
        Some((self.from.block_id()?, self.to.block_id()?))
    }

    /// Returns `(from, to)` sections when both endpoints are section-level.
    pub fn section_endpoints(&self) -> Option<(SectionKind, SectionKind)> {
        Some((self.from.section()?, self.to.section()?))
    }

    pub fn is_bound(&self) -> bool {
        self.block_endpoints().is_some()
    }

    /// Returns `true` if either endpoint is bound to `block_id`.
    pub fn touches_block(&self, block_id: &str) -> bool {
        self.from.block_id() == Some(block_id) || self.to.block_id() == Some(block_id)
    }

    pub(crate) fn rebind(&mut self, from_block: &str, to_block: &str) {
        self.from = Endpoint::Block(from_block.to_string());
        self.to = Endpoint::Block(to_block.to_string());
    }
}

/// The six section-level edges every generated diagram starts with.
pub fn default_connections() -> Vec<Connection> {
    use SectionKind::*;

    [
        (Power, Control, "Power"),
        (Inputs, Control, "Data"),
        (Control, Outputs, "Control"),
        (Control, Peripherals, "Interface"),
        (Power, Inputs, "Power"),
        (Power, Outputs, "Power"),
    ]
    .into_iter()
    .enumerate()
    .map(|(idx, (from, to, label))| {
        Connection::between_sections(format!("conn{}", idx + 1), from, to, label)
    })
    .collect()
}
