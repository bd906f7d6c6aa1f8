use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Bounds, Point, Size},
    model::SectionKind,
};

/// Maximum number of characters in a block's display name.
pub const MAX_NAME_CHARS: usize = 20;

/// Truncates `name` to at most [`MAX_NAME_CHARS`] characters.
///
/// # Examples
///
/// ```
/// # use blockdraft_core::model::truncate_name;
/// assert_eq!(truncate_name("Battery"), "Battery");
/// assert_eq!(truncate_name("Very Long Communication Module"), "Very Long Communicat");
/// ```
pub fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_CHARS).collect()
}

/// A placed, named, sized component belonging to exactly one section.
///
/// The id is the join key between the model and the canvas and never
/// changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    id: String,
    section_id: SectionKind,
    name: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    specification: Option<String>,
}

impl Block {
    /// Creates a block occupying `bounds`. The name is truncated to
    /// [`MAX_NAME_CHARS`] characters.
    pub fn new(
        id: impl Into<String>,
        section_id: SectionKind,
        name: &str,
        bounds: Bounds,
    ) -> Self {
        Self {
            id: id.into(),
            section_id,
            name: truncate_name(name),
            x: bounds.min_x(),
            y: bounds.min_y(),
            width: bounds.width(),
            height: bounds.height(),
            specification: None,
        }
    }

    /// Attaches technical specification text; empty text clears it.
    pub fn with_specification(mut self, specification: impl Into<String>) -> Self {
        let specification = specification.into();
        self.specification = (!specification.is_empty()).then_some(specification);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn section_id(&self) -> SectionKind {
        self.section_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specification(&self) -> Option<&str> {
        self.specification.as_deref()
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position(), self.size())
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Renames the block, truncating to [`MAX_NAME_CHARS`] characters.
    pub fn set_name(&mut self, name: &str) {
        self.name = truncate_name(name);
    }

    /// Replaces the specification text; empty text clears it.
    pub fn set_specification(&mut self, specification: impl Into<String>) {
        let specification = specification.into();
        self.specification = (!specification.is_empty()).then_some(specification);
    }

    pub fn set_section(&mut self, section_id: SectionKind) {
        self.section_id = section_id;
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x();
        self.y = position.y();
    }

    /// Resizes the block. Returns `false` and leaves the size unchanged when
    /// `size` is not strictly positive.
    pub fn set_size(&mut self, size: Size) -> bool {
        if !size.is_positive() {
            return false;
        }
        self.width = size.width();
        self.height = size.height();
        true
    }
}
