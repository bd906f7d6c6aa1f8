use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A free-floating text note, optionally associated with a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    id: String,
    x: f32,
    y: f32,
    text: String,
    #[serde(default)]
    block_id: Option<String>,
}

impl Annotation {
    pub fn new(id: impl Into<String>, position: Point, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: position.x(),
            y: position.y(),
            text: text.into(),
            block_id: None,
        }
    }

    pub fn with_block(mut self, block_id: impl Into<String>) -> Self {
        self.block_id = Some(block_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn block_id(&self) -> Option<&str> {
        self.block_id.as_deref()
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x();
        self.y = position.y();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}
