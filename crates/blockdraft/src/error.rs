//! Error types for Blockdraft operations.
//!
//! [`BlockdraftError`] is what every public operation returns. Provider
//! failures never appear here: the generator recovers from them.

use std::io;

use thiserror::Error;

use blockdraft_core::model::{DiagramId, ModelError};

use crate::{reconciler::ReconcileError, store::StoreError};

/// The main error type for Blockdraft operations.
#[derive(Debug, Error)]
pub enum BlockdraftError {
    /// The request itself is unusable, such as an empty description.
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Diagram not found: {0}")]
    NotFound(DiagramId),

    /// The store failed, or the diagram did not pass save validation.
    /// Nothing was written.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Canvas changes were applied on the canvas but the store refused
    /// `failed` of them.
    #[error("{failed} canvas change(s) to diagram {id} were not saved")]
    UnsavedChanges { id: DiagramId, failed: usize },

    #[error("Invalid diagram: {0}")]
    Model(#[from] ModelError),

    #[error("Canvas error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Export error: {0}")]
    Export(#[from] crate::export::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BlockdraftError {
    /// Wraps a failed save validation as a persistence failure.
    pub fn rejected_save(err: ModelError) -> Self {
        Self::Persistence(StoreError::Validation(err))
    }
}
