//! The live scene: visual objects in paint order.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use blockdraft_core::{
    geometry::{Bounds, Point},
    model::{Annotation, Block, Connection, SectionKind},
};

/// Opaque id of a visual object. Never reused within a reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleId(u64);

impl HandleId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-element interaction state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ElementState {
    #[default]
    Unselected,
    Selected,
    /// Terminal. The object is no longer in the scene.
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Block,
    Connection,
    Annotation,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Block, Self::Connection, Self::Annotation];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Block => "block",
            Self::Connection => "connection",
            Self::Annotation => "annotation",
        })
    }
}

/// The model entity a visual object stands for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Block(Block),
    Connection(Connection),
    Annotation(Annotation),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Self::Block(block) => block.id(),
            Self::Connection(connection) => connection.id(),
            Self::Annotation(annotation) => annotation.id(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Block(_) => EntityKind::Block,
            Self::Connection(_) => EntityKind::Connection,
            Self::Annotation(_) => EntityKind::Annotation,
        }
    }

    /// Text shown on the canvas for this entity.
    pub fn caption(&self) -> &str {
        match self {
            Self::Block(block) => block.name(),
            Self::Connection(connection) => connection.label(),
            Self::Annotation(annotation) => annotation.text(),
        }
    }
}

/// Where and how an object is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Rect(Bounds),
    Line { from: Point, to: Point },
    Anchor(Point),
}

impl Geometry {
    /// Top-left corner of a rectangle, start of a line, or the anchor.
    pub fn origin(&self) -> Point {
        match self {
            Self::Rect(bounds) => bounds.min_point(),
            Self::Line { from, .. } => *from,
            Self::Anchor(point) => *point,
        }
    }
}

/// What a visual object is.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// A section heading. Carries no entity.
    SectionLabel(SectionKind, String),
    /// An attached model entity.
    Entity(Entity),
}

/// A drawable element of the live scene.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualObject {
    handle: HandleId,
    geometry: Geometry,
    content: Content,
    state: ElementState,
}

impl VisualObject {
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn state(&self) -> ElementState {
        self.state
    }

    /// The attached entity, `None` for decorations.
    pub fn entity(&self) -> Option<&Entity> {
        match &self.content {
            Content::Entity(entity) => Some(entity),
            Content::SectionLabel(..) => None,
        }
    }

    pub fn caption(&self) -> &str {
        match &self.content {
            Content::SectionLabel(_, text) => text,
            Content::Entity(entity) => entity.caption(),
        }
    }

    pub(super) fn entity_mut(&mut self) -> Option<&mut Entity> {
        match &mut self.content {
            Content::Entity(entity) => Some(entity),
            Content::SectionLabel(..) => None,
        }
    }

    pub(super) fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    pub(super) fn set_state(&mut self, state: ElementState) {
        self.state = state;
    }
}

/// Visual objects keyed by handle, iterated in paint order.
#[derive(Debug, Default)]
pub struct Scene {
    objects: IndexMap<HandleId, VisualObject>,
    next_handle: u64,
}

impl Scene {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, handle: HandleId) -> Option<&VisualObject> {
        self.objects.get(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualObject> {
        self.objects.values()
    }

    pub(super) fn get_mut(&mut self, handle: HandleId) -> Option<&mut VisualObject> {
        self.objects.get_mut(&handle)
    }

    /// Appends an object on top of the scene and returns its new handle.
    pub(super) fn push(&mut self, geometry: Geometry, content: Content) -> HandleId {
        let handle = HandleId(self.next_handle);
        self.next_handle += 1;
        self.objects.insert(
            handle,
            VisualObject {
                handle,
                geometry,
                content,
                state: ElementState::Unselected,
            },
        );
        handle
    }

    /// Takes an object out of the scene, keeping the paint order of the rest.
    pub(super) fn remove(&mut self, handle: HandleId) -> Option<VisualObject> {
        let mut object = self.objects.shift_remove(&handle)?;
        object.set_state(ElementState::Removed);
        Some(object)
    }

    /// Removes every object. Handles keep counting up.
    pub(super) fn clear(&mut self) {
        self.objects.clear();
    }

    /// Removes every object carrying an entity, keeping decorations.
    pub(super) fn retain_decorations(&mut self) -> Vec<HandleId> {
        let removed: Vec<_> = self
            .objects
            .values()
            .filter(|object| object.entity().is_some())
            .map(VisualObject::handle)
            .collect();
        self.objects.retain(|_, object| object.entity().is_none());
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_label(scene: &mut Scene, kind: SectionKind) -> HandleId {
        let content = Content::SectionLabel(kind, kind.to_string());
        scene.push(Geometry::Anchor(Point::default()), content)
    }

    #[test]
    fn test_handles_are_never_reused() {
        let mut scene = Scene::default();
        let first = push_label(&mut scene, SectionKind::Power);
        scene.clear();
        let second = push_label(&mut scene, SectionKind::Power);
        assert_ne!(first, second);
    }

    #[test]
    fn test_remove_marks_removed_and_keeps_order() {
        let mut scene = Scene::default();
        let handles: Vec<_> = (0..3)
            .map(|_| push_label(&mut scene, SectionKind::Inputs))
            .collect();

        let removed = scene.remove(handles[1]).unwrap();
        assert_eq!(removed.state(), ElementState::Removed);
        let remaining: Vec<_> = scene.iter().map(VisualObject::handle).collect();
        assert_eq!(remaining, [handles[0], handles[2]]);
        assert!(scene.remove(handles[1]).is_none());
    }
}
