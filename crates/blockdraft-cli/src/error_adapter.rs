//! Error adapter for converting BlockdraftError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use blockdraft::{BlockdraftError, store::StoreError};

/// Adapter giving a [`BlockdraftError`] a diagnostic code and help text.
pub struct ErrorAdapter<'a>(pub &'a BlockdraftError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            BlockdraftError::InputValidation(_) => "blockdraft::input",
            BlockdraftError::NotFound(_) => "blockdraft::not_found",
            BlockdraftError::Persistence(_) | BlockdraftError::UnsavedChanges { .. } => {
                "blockdraft::persistence"
            }
            BlockdraftError::Model(_) => "blockdraft::model",
            BlockdraftError::Reconcile(_) => "blockdraft::canvas",
            BlockdraftError::Export(_) => "blockdraft::export",
            BlockdraftError::Io(_) => "blockdraft::io",
            BlockdraftError::Config(_) => "blockdraft::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            BlockdraftError::NotFound(_) => "run `blockdraft list` to see stored diagrams",
            BlockdraftError::Persistence(StoreError::Validation(_)) => {
                "the diagram was not saved; check block ids, sizes, and names"
            }
            BlockdraftError::UnsavedChanges { .. } => {
                "the stored diagram may have been removed or rejected the edit; see the log"
            }
            BlockdraftError::Config(_) => "pass --config or check blockdraft/config.toml",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use blockdraft::model::DiagramId;

    use super::*;

    fn code(err: &BlockdraftError) -> Option<String> {
        ErrorAdapter(err).code().map(|code| code.to_string())
    }

    #[test]
    fn test_codes_per_variant() {
        let not_found = BlockdraftError::NotFound(DiagramId::new_random());
        assert_eq!(code(&not_found).as_deref(), Some("blockdraft::not_found"));
        assert!(ErrorAdapter(&not_found).help().is_some());

        let unavailable = BlockdraftError::Persistence(StoreError::Unavailable("down".into()));
        assert_eq!(code(&unavailable).as_deref(), Some("blockdraft::persistence"));
        assert!(ErrorAdapter(&unavailable).help().is_none());

        let unsaved = BlockdraftError::UnsavedChanges {
            id: DiagramId::new_random(),
            failed: 2,
        };
        assert_eq!(code(&unsaved).as_deref(), Some("blockdraft::persistence"));
        assert!(ErrorAdapter(&unsaved).help().is_some());
    }

    #[test]
    fn test_display_matches_error() {
        let err = BlockdraftError::InputValidation("description must not be empty".into());
        assert_eq!(
            ErrorAdapter(&err).to_string(),
            "Invalid input: description must not be empty"
        );
    }
}
