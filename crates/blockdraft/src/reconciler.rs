//! Canvas reconciler.
//!
//! The reconciler owns the live scene of an editing session. A [`Diagram`] is
//! rendered into visual objects once; after that, user actions arrive as
//! [`CanvasEvent`]s and are handled to completion one at a time. Every
//! committed mutation re-derives the three entity collections from the
//! scene and hands them to the [`ModelSink`] as a [`ModelReplace`].
//!
//! ```text
//! Diagram ──render──▶ Scene ◀──handle(event)── user
//!                       │
//!                  rederive()
//!                       ▼
//!                 ModelReplace ──▶ ModelSink
//! ```
//!
//! Identity is never inferred from geometry or text. Each visual object
//! carries its entity, and the [`IdentityIndex`] maps entity ids to
//! handles and back.

mod event;
mod index;
mod scene;

pub use event::{CanvasEvent, Target};
pub use index::{EntityKey, IdentityIndex};
pub use scene::{Content, ElementState, Entity, EntityKind, Geometry, HandleId, Scene, VisualObject};

use log::{debug, info, trace};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use blockdraft_core::{
    geometry::{Bounds, Point, Size},
    model::{Annotation, Block, Connection, Diagram, DiagramUpdate, Endpoint, SectionKind},
};

use crate::{
    config::LayoutConfig,
    layout::{INSERTED_BLOCK_ORIGIN, INSERTED_BLOCK_SIZE, INSERTED_NOTE_ORIGIN, NOTE_SIZE},
};

/// Name given to inserted blocks when none is supplied.
pub const NEW_BLOCK_NAME: &str = "New Block";

/// Rejected canvas events. The scene is unchanged when one is returned.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("no visual object with handle {0}")]
    UnknownHandle(HandleId),

    #[error("no visual object for entity `{0}`")]
    UnknownEntity(String),

    #[error("nothing is selected")]
    NothingSelected,

    #[error("visual object {0} is a decoration and cannot be selected")]
    NotSelectable(HandleId),

    #[error("visual object {0} cannot be moved; only blocks and annotations move")]
    NotMovable(HandleId),

    #[error("visual object {handle} is not a {expected}")]
    WrongKind { handle: HandleId, expected: EntityKind },

    #[error("size {width}x{height} is not positive")]
    InvalidSize { width: f32, height: f32 },
}

/// Fresh entity collections derived from the live scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelReplace {
    blocks: Vec<Block>,
    connections: Vec<Connection>,
    annotations: Vec<Annotation>,
}

impl ModelReplace {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl From<ModelReplace> for DiagramUpdate {
    fn from(replace: ModelReplace) -> Self {
        DiagramUpdate::default()
            .with_blocks(replace.blocks)
            .with_connections(replace.connections)
            .with_annotations(replace.annotations)
    }
}

/// Receives every committed model replace.
pub trait ModelSink {
    fn submit(&mut self, replace: &ModelReplace);
}

/// Notified when the selection changes.
pub trait SelectionObserver {
    /// `entity` is the full attached payload, specification and label included.
    fn selected(&mut self, handle: HandleId, entity: &Entity);

    fn cleared(&mut self);
}

/// Owns the live scene of one editing session.
pub struct Reconciler {
    layout: LayoutConfig,
    scene: Scene,
    index: IdentityIndex,
    selected: Option<HandleId>,
    observers: Vec<Box<dyn SelectionObserver>>,
    sink: Option<Box<dyn ModelSink>>,
}

impl Reconciler {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            scene: Scene::default(),
            index: IdentityIndex::default(),
            selected: None,
            observers: Vec::new(),
            sink: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn SelectionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn ModelSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn index(&self) -> &IdentityIndex {
        &self.index
    }

    pub fn selected(&self) -> Option<HandleId> {
        self.selected
    }

    pub fn handle_of(&self, kind: EntityKind, id: &str) -> Option<HandleId> {
        self.index.handle_of(kind, id)
    }

    pub fn entity_of(&self, handle: HandleId) -> Option<&Entity> {
        self.scene.get(handle).and_then(VisualObject::entity)
    }

    /// Replaces the scene with a fresh rendering of `diagram`.
    ///
    /// Section labels come first, then blocks, connections, and annotations,
    /// each in model order.
    pub fn render(&mut self, diagram: &Diagram) {
        self.clear_selection();
        self.scene.clear();
        self.index.clear();

        for section in diagram.sections() {
            let origin = Point::new(
                self.layout.section_x(section.kind()) + self.layout.section_padding(),
                self.layout.section_padding(),
            );
            self.scene.push(
                Geometry::Anchor(origin),
                Content::SectionLabel(section.kind(), section.name().to_string()),
            );
        }
        for block in diagram.blocks() {
            self.attach(Geometry::Rect(block.bounds()), Entity::Block(block.clone()));
        }
        for connection in diagram.connections() {
            let geometry = self.connection_geometry(connection);
            self.attach(geometry, Entity::Connection(connection.clone()));
        }
        for annotation in diagram.annotations() {
            let geometry = note_geometry(annotation.position());
            self.attach(geometry, Entity::Annotation(annotation.clone()));
        }

        info!(
            diagram_id:% = diagram.id(),
            objects = self.scene.len(),
            entities = self.index.len();
            "Rendered diagram onto canvas"
        );
    }

    /// Handles one event to completion.
    ///
    /// Returns the model replace for mutations and `None` for pure selection
    /// changes. The sink, if any, receives the same replace.
    ///
    /// # Errors
    ///
    /// Returns a [`ReconcileError`] when the event does not apply to the
    /// current scene. Nothing is changed or submitted in that case.
    pub fn handle(&mut self, event: CanvasEvent) -> Result<Option<ModelReplace>, ReconcileError> {
        debug!(event:?; "Handling canvas event");

        match event {
            CanvasEvent::Select { target } => {
                let handle = self.resolve(&target)?;
                self.select(handle)?;
                return Ok(None);
            }
            CanvasEvent::ClearSelection => {
                self.clear_selection();
                return Ok(None);
            }
            CanvasEvent::Move { target, x, y } => {
                let handle = self.resolve(&target)?;
                self.move_to(handle, Point::new(x, y))?;
                self.select(handle)?;
            }
            CanvasEvent::Resize { target, width, height } => {
                let handle = self.resolve(&target)?;
                self.resize(handle, Size::new(width, height))?;
                self.select(handle)?;
            }
            CanvasEvent::EditBlock {
                target,
                name,
                section,
                specification,
            } => {
                let handle = self.resolve(&target)?;
                let block = self.block_mut(handle)?;
                if let Some(name) = name {
                    block.set_name(&name);
                }
                if let Some(section) = section {
                    block.set_section(section);
                }
                if let Some(specification) = specification {
                    block.set_specification(specification);
                }
                self.select(handle)?;
            }
            CanvasEvent::EditConnection { target, label } => {
                let handle = self.resolve(&target)?;
                self.connection_mut(handle)?.set_label(label);
                self.select(handle)?;
            }
            CanvasEvent::EditAnnotation { target, text } => {
                let handle = self.resolve(&target)?;
                self.annotation_mut(handle)?.set_text(text);
                self.select(handle)?;
            }
            CanvasEvent::Delete { target } => {
                let handle = match target {
                    Some(target) => self.resolve(&target)?,
                    None => self.selected.ok_or(ReconcileError::NothingSelected)?,
                };
                self.delete(handle)?;
            }
            CanvasEvent::AddBlock { section, name } => {
                let handle = self.add_block(section, name.as_deref().unwrap_or(NEW_BLOCK_NAME));
                self.select(handle)?;
            }
            CanvasEvent::AddAnnotation { text, block } => {
                let block_id = match block {
                    Some(target) => {
                        let handle = self.resolve(&target)?;
                        Some(self.block(handle)?.id().to_string())
                    }
                    None => None,
                };
                let handle = self.add_annotation(text, block_id);
                self.select(handle)?;
            }
            CanvasEvent::Connect { from, to, label } => {
                let from = self.resolve(&from)?;
                let to = self.resolve(&to)?;
                let from_id = self.block(from)?.id().to_string();
                let to_id = self.block(to)?.id().to_string();
                let handle = self.connect(&from_id, &to_id, label);
                self.select(handle)?;
            }
            CanvasEvent::Clear => {
                self.clear_selection();
                let removed = self.scene.retain_decorations();
                self.index.clear();
                debug!(removed = removed.len(); "Cleared canvas");
            }
        }

        Ok(Some(self.commit()))
    }

    /// Rebuilds the entity collections from the live scene.
    ///
    /// Geometry is read back from each visual object and merged into a copy
    /// of its attached entity. Objects are visited in paint order, so an
    /// unchanged scene always derives the same collections.
    pub fn rederive(&self) -> ModelReplace {
        let mut replace = ModelReplace::default();
        for object in self.scene.iter() {
            let Some(entity) = object.entity() else {
                continue;
            };
            match (entity, object.geometry()) {
                (Entity::Block(block), Geometry::Rect(bounds)) => {
                    let mut block = block.clone();
                    block.set_position(bounds.min_point());
                    block.set_size(bounds.to_size());
                    replace.blocks.push(block);
                }
                (Entity::Block(block), _) => replace.blocks.push(block.clone()),
                (Entity::Connection(connection), _) => {
                    replace.connections.push(connection.clone());
                }
                (Entity::Annotation(annotation), geometry) => {
                    let mut annotation = annotation.clone();
                    annotation.set_position(geometry.origin());
                    replace.annotations.push(annotation);
                }
            }
        }
        trace!(replace:?; "Re-derived model from scene");
        replace
    }

    fn commit(&mut self) -> ModelReplace {
        let replace = self.rederive();
        debug!(
            blocks = replace.blocks.len(),
            connections = replace.connections.len(),
            annotations = replace.annotations.len();
            "Committing model replace"
        );
        if let Some(sink) = self.sink.as_mut() {
            sink.submit(&replace);
        }
        replace
    }

    fn attach(&mut self, geometry: Geometry, entity: Entity) -> HandleId {
        let key = (entity.kind(), entity.id().to_string());
        let handle = self.scene.push(geometry, Content::Entity(entity));
        self.index.insert(key, handle);
        handle
    }

    fn resolve(&self, target: &Target) -> Result<HandleId, ReconcileError> {
        match target {
            Target::Handle(handle) => self
                .scene
                .get(*handle)
                .map(VisualObject::handle)
                .ok_or(ReconcileError::UnknownHandle(*handle)),
            Target::Entity(id) => EntityKind::ALL
                .into_iter()
                .find_map(|kind| self.index.handle_of(kind, id))
                .ok_or_else(|| ReconcileError::UnknownEntity(id.clone())),
        }
    }

    fn select(&mut self, handle: HandleId) -> Result<(), ReconcileError> {
        let object = self
            .scene
            .get(handle)
            .ok_or(ReconcileError::UnknownHandle(handle))?;
        if object.entity().is_none() {
            return Err(ReconcileError::NotSelectable(handle));
        }

        let previous = self.selected.replace(handle).filter(|previous| *previous != handle);
        if let Some(object) = previous.and_then(|previous| self.scene.get_mut(previous)) {
            object.set_state(ElementState::Unselected);
        }
        if let Some(object) = self.scene.get_mut(handle) {
            object.set_state(ElementState::Selected);
        }

        if let Some(entity) = self.scene.get(handle).and_then(VisualObject::entity) {
            for observer in &mut self.observers {
                observer.selected(handle, entity);
            }
        }
        Ok(())
    }

    fn clear_selection(&mut self) {
        let Some(previous) = self.selected.take() else {
            return;
        };
        if let Some(object) = self.scene.get_mut(previous) {
            object.set_state(ElementState::Unselected);
        }
        for observer in &mut self.observers {
            observer.cleared();
        }
    }

    fn entity_mut(
        &mut self,
        handle: HandleId,
        expected: EntityKind,
    ) -> Result<&mut Entity, ReconcileError> {
        let object = self
            .scene
            .get_mut(handle)
            .ok_or(ReconcileError::UnknownHandle(handle))?;
        object
            .entity_mut()
            .ok_or(ReconcileError::WrongKind { handle, expected })
    }

    fn block(&self, handle: HandleId) -> Result<&Block, ReconcileError> {
        match self.entity_of(handle) {
            Some(Entity::Block(block)) => Ok(block),
            _ if self.scene.get(handle).is_none() => Err(ReconcileError::UnknownHandle(handle)),
            _ => Err(ReconcileError::WrongKind {
                handle,
                expected: EntityKind::Block,
            }),
        }
    }

    fn block_mut(&mut self, handle: HandleId) -> Result<&mut Block, ReconcileError> {
        let expected = EntityKind::Block;
        match self.entity_mut(handle, expected)? {
            Entity::Block(block) => Ok(block),
            _ => Err(ReconcileError::WrongKind { handle, expected }),
        }
    }

    fn connection_mut(&mut self, handle: HandleId) -> Result<&mut Connection, ReconcileError> {
        let expected = EntityKind::Connection;
        match self.entity_mut(handle, expected)? {
            Entity::Connection(connection) => Ok(connection),
            _ => Err(ReconcileError::WrongKind { handle, expected }),
        }
    }

    fn annotation_mut(&mut self, handle: HandleId) -> Result<&mut Annotation, ReconcileError> {
        let expected = EntityKind::Annotation;
        match self.entity_mut(handle, expected)? {
            Entity::Annotation(annotation) => Ok(annotation),
            _ => Err(ReconcileError::WrongKind { handle, expected }),
        }
    }

    fn move_to(&mut self, handle: HandleId, position: Point) -> Result<(), ReconcileError> {
        let object = self
            .scene
            .get_mut(handle)
            .ok_or(ReconcileError::UnknownHandle(handle))?;
        let geometry = object.geometry();
        let moved_block = match object.entity_mut() {
            Some(Entity::Block(block)) => {
                block.set_position(position);
                Some(block.id().to_string())
            }
            Some(Entity::Annotation(annotation)) => {
                annotation.set_position(position);
                None
            }
            _ => return Err(ReconcileError::NotMovable(handle)),
        };
        let geometry = match geometry {
            Geometry::Rect(bounds) => Geometry::Rect(bounds.with_top_left(position)),
            _ => Geometry::Anchor(position),
        };
        object.set_geometry(geometry);

        if let Some(block_id) = moved_block {
            self.reroute(&block_id);
        }
        Ok(())
    }

    fn resize(&mut self, handle: HandleId, size: Size) -> Result<(), ReconcileError> {
        if !size.is_positive() {
            return Err(ReconcileError::InvalidSize {
                width: size.width(),
                height: size.height(),
            });
        }
        let block = self.block_mut(handle)?;
        block.set_size(size);
        let bounds = block.bounds();
        let block_id = block.id().to_string();

        if let Some(object) = self.scene.get_mut(handle) {
            object.set_geometry(Geometry::Rect(bounds));
        }
        self.reroute(&block_id);
        Ok(())
    }

    fn delete(&mut self, handle: HandleId) -> Result<(), ReconcileError> {
        if self.entity_of(handle).is_none() {
            return Err(match self.scene.get(handle) {
                Some(_) => ReconcileError::NotSelectable(handle),
                None => ReconcileError::UnknownHandle(handle),
            });
        }
        if self.selected == Some(handle) {
            self.clear_selection();
        }
        let removed = self.scene.remove(handle);
        let key = self.index.remove_handle(handle);
        debug!(handle:% = handle, key:?, removed = removed.is_some(); "Removed visual object");
        Ok(())
    }

    fn add_block(&mut self, section: SectionKind, name: &str) -> HandleId {
        let block = Block::new(
            format!("block_{}", Uuid::new_v4()),
            section,
            name,
            Bounds::new_from_top_left(INSERTED_BLOCK_ORIGIN, INSERTED_BLOCK_SIZE),
        );
        debug!(block_id = block.id(), section:% = section; "Inserted block");
        self.attach(Geometry::Rect(block.bounds()), Entity::Block(block))
    }

    fn add_annotation(&mut self, text: String, block_id: Option<String>) -> HandleId {
        let id = format!("ann_{}", Uuid::new_v4());
        let mut annotation = Annotation::new(id, INSERTED_NOTE_ORIGIN, text);
        if let Some(block_id) = block_id {
            annotation = annotation.with_block(block_id);
        }
        debug!(annotation_id = annotation.id(); "Inserted annotation");
        self.attach(note_geometry(INSERTED_NOTE_ORIGIN), Entity::Annotation(annotation))
    }

    fn connect(&mut self, from: &str, to: &str, label: String) -> HandleId {
        let id = format!("conn_{}", Uuid::new_v4());
        let connection = Connection::between_blocks(id, from, to, label);
        debug!(connection_id = connection.id(), from, to; "Inserted connection");
        let geometry = self.connection_geometry(&connection);
        self.attach(geometry, Entity::Connection(connection))
    }

    /// Recomputes the lines of every connection touching `block_id`.
    fn reroute(&mut self, block_id: &str) {
        let handles: Vec<HandleId> = self
            .scene
            .iter()
            .filter(|object| {
                matches!(object.entity(), Some(Entity::Connection(c)) if c.touches_block(block_id))
            })
            .map(VisualObject::handle)
            .collect();

        for handle in handles {
            let Some(Entity::Connection(connection)) = self.entity_of(handle) else {
                continue;
            };
            let geometry = self.connection_geometry(connection);
            if let Some(object) = self.scene.get_mut(handle) {
                object.set_geometry(geometry);
            }
        }
    }

    fn connection_geometry(&self, connection: &Connection) -> Geometry {
        Geometry::Line {
            from: self.anchor(connection.from()),
            to: self.anchor(connection.to()),
        }
    }

    /// Section endpoints sit on the column center just below the labels.
    /// Dangling block endpoints collapse to the canvas origin.
    fn anchor(&self, endpoint: &Endpoint) -> Point {
        match endpoint {
            Endpoint::Section(kind) => Point::new(
                self.layout.section_x(*kind) + self.layout.section_width() / 2.0,
                self.layout.label_offset() + self.layout.block_inset(),
            ),
            Endpoint::Block(id) => self
                .index
                .handle_of(EntityKind::Block, id)
                .and_then(|handle| match self.scene.get(handle)?.geometry() {
                    Geometry::Rect(bounds) => Some(bounds.center()),
                    _ => None,
                })
                .unwrap_or_default(),
        }
    }
}

fn note_geometry(position: Point) -> Geometry {
    Geometry::Rect(Bounds::new_from_top_left(position, NOTE_SIZE))
}
