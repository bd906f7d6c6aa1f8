//! The canonical diagram entity graph.
//!
//! A [`Diagram`] is the aggregate root. It owns exactly five [`Section`]s in
//! the fixed order of [`SectionKind::ALL`], the placed [`Block`]s, the
//! directed [`Connection`]s between sections or blocks, and free-floating
//! [`Annotation`]s.
//!
//! # Invariants
//!
//! - Block, connection, and annotation ids are unique within their collection.
//! - Every block references one of the five sections (enforced by the
//!   [`SectionKind`] type).
//! - Section order never changes.
//! - Block sizes are strictly positive; positions may be negative.
//! - Block names are at most [`MAX_NAME_CHARS`] characters.
//!
//! [`Diagram::validate`] checks the invariants the type system cannot.

mod annotation;
mod block;
mod connection;
mod diagram;
mod section;
mod update;

pub use annotation::Annotation;
pub use block::{Block, MAX_NAME_CHARS, truncate_name};
pub use connection::{Connection, Endpoint, default_connections};
pub use diagram::{
    DEFAULT_SOLUTION, DEFAULT_TITLE, Diagram, DiagramId, GenerationStrategy, Metadata,
};
pub use section::{Section, SectionKind};
pub use update::DiagramUpdate;

use thiserror::Error;

/// Violations of the diagram invariants and serialization failures.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("section at position {index} is `{found}`, expected `{expected}`")]
    SectionOrder {
        index: usize,
        expected: SectionKind,
        found: SectionKind,
    },

    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },

    #[error("block `{0}` must have a positive width and height")]
    InvalidSize(String),

    #[error("{kind} `{id}` has a non-finite coordinate")]
    NonFiniteCoordinate { kind: &'static str, id: String },

    #[error("block `{id}` name is {len} characters, the limit is {MAX_NAME_CHARS}")]
    NameTooLong { id: String, len: usize },

    #[error("unknown block `{0}`")]
    UnknownBlock(String),

    #[error("unknown connection `{0}`")]
    UnknownConnection(String),

    #[error("invalid diagram JSON: {0}")]
    Json(#[from] serde_json::Error),
}
