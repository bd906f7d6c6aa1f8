//! Partial updates with whole-collection replace semantics.

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::{Annotation, Block, Connection};

/// A partial diagram update.
///
/// Each `Some` collection replaces the current collection wholesale; `None`
/// leaves it unchanged. There is no field-level merge, so concurrent editors
/// resolve as last writer wins per collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramUpdate {
    blocks: Option<Vec<Block>>,
    connections: Option<Vec<Connection>>,
    annotations: Option<Vec<Annotation>>,
    title: Option<String>,
}

impl DiagramUpdate {
    /// Builds an update from an untrusted JSON payload.
    ///
    /// - A collection key that is absent, `null`, or not an array is ignored.
    /// - Array elements that are not objects, or that do not deserialize into
    ///   the entity type, are dropped.
    /// - `title` is applied only when it is a non-empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// # use blockdraft_core::model::DiagramUpdate;
    /// let update = DiagramUpdate::from_value(&serde_json::json!({
    ///     "blocks": "not an array",
    ///     "annotations": [[1, 2], {"id": "a", "x": 1.0, "y": 2.0, "text": "note"}],
    /// }));
    /// assert!(update.blocks().is_none());
    /// assert_eq!(update.annotations().map(|a| a.len()), Some(1));
    /// ```
    pub fn from_value(payload: &Value) -> Self {
        let title = payload
            .get("title")
            .and_then(Value::as_str)
            .filter(|title| !title.is_empty())
            .map(str::to_string);

        Self {
            blocks: lenient_collection(payload, "blocks"),
            connections: lenient_collection(payload, "connections"),
            annotations: lenient_collection(payload, "annotations"),
            title,
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = Some(connections);
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn blocks(&self) -> Option<&[Block]> {
        self.blocks.as_deref()
    }

    pub fn connections(&self) -> Option<&[Connection]> {
        self.connections.as_deref()
    }

    pub fn annotations(&self) -> Option<&[Annotation]> {
        self.annotations.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns `true` when applying this update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_none()
            && self.connections.is_none()
            && self.annotations.is_none()
            && self.title.is_none()
    }
}

fn lenient_collection<T: DeserializeOwned>(payload: &Value, key: &'static str) -> Option<Vec<T>> {
    let items = match payload.get(key)? {
        Value::Array(items) => items,
        Value::Null => return None,
        _ => {
            warn!(field = key; "Ignoring non-array collection in update");
            return None;
        }
    };

    let accepted: Vec<T> = items
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| T::deserialize(item).ok())
        .collect();

    let dropped = items.len() - accepted.len();
    if dropped > 0 {
        warn!(field = key, dropped; "Dropped malformed update entries");
    }

    Some(accepted)
}
