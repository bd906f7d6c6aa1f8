use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    geometry::Point,
    model::{
        Annotation, Block, Connection, DiagramUpdate, MAX_NAME_CHARS, ModelError, Section,
        SectionKind, default_connections,
    },
};

/// Title given to diagrams that were never renamed.
pub const DEFAULT_TITLE: &str = "Untitled Diagram";

/// Narrative used when the generator has nothing more specific to say.
pub const DEFAULT_SOLUTION: &str = "This electronics product integrates various components \
    across five key functional blocks to create a complete system.";

/// Unique identifier of a persisted diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagramId(Uuid);

impl DiagramId {
    /// Generates a fresh random id.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DiagramId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Which path produced a diagram's sections.
///
/// Serialized as `"pattern-matching"` or the provider's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GenerationStrategy {
    PatternMatching,
    Provider(String),
}

impl GenerationStrategy {
    const PATTERN_MATCHING: &'static str = "pattern-matching";

    pub fn as_str(&self) -> &str {
        match self {
            Self::PatternMatching => Self::PATTERN_MATCHING,
            Self::Provider(id) => id,
        }
    }
}

impl From<String> for GenerationStrategy {
    fn from(value: String) -> Self {
        if value == Self::PATTERN_MATCHING {
            Self::PatternMatching
        } else {
            Self::Provider(value)
        }
    }
}

impl From<GenerationStrategy> for String {
    fn from(value: GenerationStrategy) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a generated diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    original_description: String,
    generated_at: DateTime<Utc>,
    generated_by: GenerationStrategy,
    solution: String,
}

impl Metadata {
    pub fn new(
        original_description: impl Into<String>,
        generated_at: DateTime<Utc>,
        generated_by: GenerationStrategy,
        solution: impl Into<String>,
    ) -> Self {
        Self {
            original_description: original_description.into(),
            generated_at,
            generated_by,
            solution: solution.into(),
        }
    }

    pub fn original_description(&self) -> &str {
        &self.original_description
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn generated_by(&self) -> &GenerationStrategy {
        &self.generated_by
    }

    pub fn solution(&self) -> &str {
        &self.solution
    }
}

/// The aggregate root: five sections plus everything placed on the canvas.
///
/// # Examples
///
/// ```
/// use blockdraft_core::model::{
///     Diagram, DiagramUpdate, GenerationStrategy, Metadata, Section, SectionKind,
/// };
///
/// let sections = SectionKind::ALL.map(Section::with_defaults);
/// let strategy = GenerationStrategy::PatternMatching;
/// let metadata = Metadata::new("lamp", chrono::Utc::now(), strategy, "");
/// let mut diagram = Diagram::new("lamp", sections, Vec::new(), metadata);
///
/// let update = DiagramUpdate::from_value(&serde_json::json!({"title": "Desk lamp"}));
/// diagram.apply_update(&update).unwrap();
/// assert_eq!(diagram.title(), "Desk lamp");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    id: DiagramId,
    title: String,
    description: String,
    sections: [Section; 5],
    blocks: Vec<Block>,
    connections: Vec<Connection>,
    annotations: Vec<Annotation>,
    metadata: Metadata,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Diagram {
    /// Creates a diagram with a fresh id, the default title, the six default
    /// section-level connections, and no annotations.
    pub fn new(
        description: impl Into<String>,
        sections: [Section; 5],
        blocks: Vec<Block>,
        metadata: Metadata,
    ) -> Self {
        let now = metadata.generated_at();
        Self {
            id: DiagramId::new_random(),
            title: DEFAULT_TITLE.to_string(),
            description: description.into(),
            sections,
            blocks,
            connections: default_connections(),
            annotations: Vec::new(),
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> DiagramId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn sections(&self) -> &[Section; 5] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> &Section {
        &self.sections[kind.index()]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Blocks in `kind`, in diagram order.
    pub fn blocks_in(&self, kind: SectionKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.section_id() == kind)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Records a modification time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn replace_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
    }

    pub fn replace_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }

    /// Renames a single block.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownBlock`] if no block has this id.
    pub fn rename_block(&mut self, id: &str, name: &str) -> Result<(), ModelError> {
        self.block_mut(id)?.set_name(name);
        Ok(())
    }

    /// Moves a single block to a new top-left position.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownBlock`] if no block has this id.
    pub fn move_block(&mut self, id: &str, position: Point) -> Result<(), ModelError> {
        self.block_mut(id)?.set_position(position);
        Ok(())
    }

    /// Binds both endpoints of a connection to blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownConnection`] or [`ModelError::UnknownBlock`]
    /// when an id does not resolve. The diagram is unchanged on error.
    pub fn rebind_connection(
        &mut self,
        id: &str,
        from_block: &str,
        to_block: &str,
    ) -> Result<(), ModelError> {
        for block_id in [from_block, to_block] {
            if self.block(block_id).is_none() {
                return Err(ModelError::UnknownBlock(block_id.to_string()));
            }
        }
        let connection = self
            .connections
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| ModelError::UnknownConnection(id.to_string()))?;
        connection.rebind(from_block, to_block);
        Ok(())
    }

    /// Binds every section-level connection to the first block of each
    /// endpoint section. Connections whose sections have no block, and
    /// connections that are already bound or mixed, are left as they are.
    ///
    /// Returns the number of connections rebound.
    pub fn rebase_connections(&mut self) -> usize {
        let mut rebound = 0;
        for idx in 0..self.connections.len() {
            let Some((from, to)) = self.connections[idx].section_endpoints() else {
                continue;
            };
            let first = |kind| self.blocks_in(kind).next().map(|b| b.id().to_string());
            if let (Some(from_block), Some(to_block)) = (first(from), first(to)) {
                self.connections[idx].rebind(&from_block, &to_block);
                rebound += 1;
            }
        }
        debug!(diagram_id:% = self.id, rebound; "Rebased section-level connections");
        rebound
    }

    /// Applies a partial update atomically.
    ///
    /// Each supplied collection replaces the current one wholesale; omitted
    /// fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation of the updated diagram. The
    /// diagram is unchanged on error.
    pub fn apply_update(&mut self, update: &DiagramUpdate) -> Result<(), ModelError> {
        let mut next = self.clone();
        if let Some(blocks) = update.blocks() {
            next.blocks = blocks.to_vec();
        }
        if let Some(connections) = update.connections() {
            next.connections = connections.to_vec();
        }
        if let Some(annotations) = update.annotations() {
            next.annotations = annotations.to_vec();
        }
        if let Some(title) = update.title() {
            next.title = title.to_string();
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Checks the invariants not enforced by the type system.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (index, (section, expected)) in self.sections.iter().zip(SectionKind::ALL).enumerate() {
            if section.kind() != expected {
                return Err(ModelError::SectionOrder {
                    index,
                    expected,
                    found: section.kind(),
                });
            }
        }

        ensure_unique("block", self.blocks.iter().map(Block::id))?;
        ensure_unique("connection", self.connections.iter().map(Connection::id))?;
        ensure_unique("annotation", self.annotations.iter().map(Annotation::id))?;

        for block in &self.blocks {
            if !block.size().is_positive() {
                return Err(ModelError::InvalidSize(block.id().to_string()));
            }
            let position = block.position();
            if !position.x().is_finite() || !position.y().is_finite() {
                return Err(ModelError::NonFiniteCoordinate {
                    kind: "block",
                    id: block.id().to_string(),
                });
            }
            let len = block.name().chars().count();
            if len > MAX_NAME_CHARS {
                return Err(ModelError::NameTooLong {
                    id: block.id().to_string(),
                    len,
                });
            }
        }

        for annotation in &self.annotations {
            let position = annotation.position();
            if !position.x().is_finite() || !position.y().is_finite() {
                return Err(ModelError::NonFiniteCoordinate {
                    kind: "annotation",
                    id: annotation.id().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Serializes to the canonical structured dump. These bytes are also the
    /// persisted form.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Json`] if serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ModelError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parses and validates a structured dump.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Json`] for malformed input or any invariant
    /// violation reported by [`Diagram::validate`].
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let diagram: Self = serde_json::from_slice(bytes)?;
        diagram.validate()?;
        Ok(diagram)
    }

    fn block_mut(&mut self, id: &str) -> Result<&mut Block, ModelError> {
        self.blocks
            .iter_mut()
            .find(|b| b.id() == id)
            .ok_or_else(|| ModelError::UnknownBlock(id.to_string()))
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ModelError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::geometry::{Bounds, Size};

    fn block(id: &str, section: SectionKind, x: f32) -> Block {
        Block::new(
            id,
            section,
            "Block",
            Bounds::new_from_top_left(Point::new(x, 100.0), Size::new(100.0, 90.0)),
        )
    }

    fn sample() -> Diagram {
        let sections = SectionKind::ALL.map(Section::with_defaults);
        let blocks = SectionKind::ALL
            .into_iter()
            .map(|kind| block(&format!("block_{kind}_0"), kind, kind.index() as f32 * 280.0))
            .collect();
        let metadata = Metadata::new(
            "test",
            Utc::now(),
            GenerationStrategy::PatternMatching,
            DEFAULT_SOLUTION,
        );
        Diagram::new("test", sections, blocks, metadata)
    }

    #[test]
    fn test_new_diagram_defaults() {
        let diagram = sample();
        assert_eq!(diagram.title(), DEFAULT_TITLE);
        assert_eq!(diagram.connections().len(), 6);
        assert!(diagram.annotations().is_empty());
        assert!(diagram.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_reproduces_equal_diagram() {
        let mut diagram = sample();
        diagram.rebase_connections();
        diagram.replace_annotations(vec![
            Annotation::new("ann_1", Point::new(200.0, 200.0), "check polarity")
                .with_block("block_power_0"),
        ]);

        let bytes = diagram.to_json_bytes().unwrap();
        let restored = Diagram::from_json_slice(&bytes).unwrap();
        assert_eq!(restored, diagram);
        assert_eq!(restored.to_json_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_generation_strategy_serialization() {
        assert_eq!(
            serde_json::to_value(GenerationStrategy::PatternMatching).unwrap(),
            json!("pattern-matching")
        );
        let provider: GenerationStrategy = serde_json::from_value(json!("gemini-api")).unwrap();
        assert_eq!(provider, GenerationStrategy::Provider("gemini-api".into()));
    }

    #[test]
    fn test_rebase_binds_to_first_block_of_each_section() {
        let mut diagram = sample();
        assert_eq!(diagram.rebase_connections(), 6);
        let first = &diagram.connections()[0];
        assert_eq!(
            first.block_endpoints(),
            Some(("block_power_0", "block_control_0"))
        );
        // Second pass finds nothing left to bind
        assert_eq!(diagram.rebase_connections(), 0);
    }

    #[test]
    fn test_rebind_unknown_block_leaves_connection_unbound() {
        let mut diagram = sample();
        let err = diagram
            .rebind_connection("conn1", "block_power_0", "missing")
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownBlock(id) if id == "missing"));
        assert!(!diagram.connections()[0].is_bound());
    }

    #[test]
    fn test_rename_and_move_block() {
        let mut diagram = sample();
        diagram.rename_block("block_power_0", "Li-Ion Battery").unwrap();
        diagram.move_block("block_power_0", Point::new(-20.0, 5.0)).unwrap();
        let block = diagram.block("block_power_0").unwrap();
        assert_eq!(block.name(), "Li-Ion Battery");
        assert_eq!(block.position(), Point::new(-20.0, 5.0));
        assert!(diagram.rename_block("nope", "x").is_err());
    }

    #[test]
    fn test_apply_update_rejects_duplicate_ids_without_partial_write() {
        let mut diagram = sample();
        let before = diagram.clone();
        let dup = block("dup", SectionKind::Power, 0.0);
        let update = DiagramUpdate::default()
            .with_blocks(vec![dup.clone(), dup])
            .with_title("Renamed");

        let err = diagram.apply_update(&update).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId { kind: "block", .. }));
        assert_eq!(diagram, before);
    }

    #[test]
    fn test_from_json_rejects_reordered_sections() {
        let diagram = sample();
        let mut value = serde_json::to_value(&diagram).unwrap();
        value["sections"].as_array_mut().unwrap().swap(0, 1);
        let bytes = serde_json::to_vec(&value).unwrap();

        let err = Diagram::from_json_slice(&bytes).unwrap_err();
        assert!(matches!(err, ModelError::SectionOrder { index: 0, .. }));
    }

    #[test]
    fn test_from_json_rejects_wrong_section_count() {
        let diagram = sample();
        let mut value = serde_json::to_value(&diagram).unwrap();
        value["sections"].as_array_mut().unwrap().pop();
        let bytes = serde_json::to_vec(&value).unwrap();

        assert!(matches!(
            Diagram::from_json_slice(&bytes),
            Err(ModelError::Json(_))
        ));
    }
}
