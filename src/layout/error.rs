//! Error types for position planning

use thiserror::Error;

/// Reasons a planner could not produce a plan.
///
/// Only the delegated backend fails; the fallback composite turns every
/// variant into a deterministic plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The decision collaborator itself returned an error
    #[error("decision collaborator failed: {0}")]
    Decision(String),

    /// The response did not contain a JSON array of positions
    #[error("unparsable decision response: {reason}")]
    Unparsable { reason: String },

    /// The response parsed but no entry survived validation
    #[error("decision response contained no usable positions ({dropped} entries dropped)")]
    NoUsableEntries { dropped: usize },
}

impl PlanError {
    pub fn unparsable(reason: impl Into<String>) -> Self {
        Self::Unparsable {
            reason: reason.into(),
        }
    }
}
