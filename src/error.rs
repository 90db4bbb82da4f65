//! Error types surfaced to callers of the arrangement pipeline

use thiserror::Error;

use crate::canvas::CanvasError;

/// Errors that abort an arrangement before any element is moved.
///
/// Planning failures and individual mutation failures never show up here:
/// the former are recovered by the deterministic planner, the latter are
/// collected in the batch report.
#[derive(Error, Debug)]
pub enum ArrangeError {
    /// Missing or invalid caller parameter
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Discovery worked but found nothing to arrange
    #[error("no elements found in {scope}: {hint}")]
    DiscoveryEmpty { scope: String, hint: String },

    /// A discovery query itself failed
    #[error("discovery failed: {0}")]
    Discovery(#[from] CanvasError),
}

impl ArrangeError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn discovery_empty(scope: impl Into<String>) -> Self {
        Self::DiscoveryEmpty {
            scope: scope.into(),
            hint: "select the elements to arrange or pass a container that has children"
                .to_string(),
        }
    }

    /// Whether the user can fix this by changing the request
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::DiscoveryEmpty { .. }
        )
    }
}
