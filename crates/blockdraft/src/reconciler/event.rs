//! User actions accepted by the reconciler.

use serde::Deserialize;

use blockdraft_core::model::SectionKind;

use super::scene::HandleId;

/// Addresses a visual object, either by its handle or by the id of the
/// entity attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Target {
    Handle(HandleId),
    Entity(String),
}

impl From<HandleId> for Target {
    fn from(handle: HandleId) -> Self {
        Self::Handle(handle)
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Self::Entity(id.to_string())
    }
}

/// One user action. Events are handled to completion, one at a time.
///
/// Deserializes from `{"type": "move", "target": 3, "x": 10, "y": 20}`, so a
/// recorded session can be replayed from a JSON array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    Select {
        target: Target,
    },
    ClearSelection,
    Move {
        target: Target,
        x: f32,
        y: f32,
    },
    Resize {
        target: Target,
        width: f32,
        height: f32,
    },
    EditBlock {
        target: Target,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        section: Option<SectionKind>,
        #[serde(default)]
        specification: Option<String>,
    },
    EditConnection {
        target: Target,
        label: String,
    },
    EditAnnotation {
        target: Target,
        text: String,
    },
    /// Deletes `target`, or the current selection when absent.
    Delete {
        #[serde(default)]
        target: Option<Target>,
    },
    AddBlock {
        section: SectionKind,
        #[serde(default)]
        name: Option<String>,
    },
    AddAnnotation {
        text: String,
        #[serde(default)]
        block: Option<Target>,
    },
    Connect {
        from: Target,
        to: Target,
        #[serde(default)]
        label: String,
    },
    Clear,
}

impl CanvasEvent {
    /// Whether handling this event changes the model.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Select { .. } | Self::ClearSelection)
    }
}
