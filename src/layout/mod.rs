//! Layout inference and arrangement
//!
//! This module takes a flat list of canvas elements and computes where each
//! one should go:
//!
//! 1. [`roles`]: split by kind, tell displays from buttons
//! 2. [`pairing`]: match rectangles with their text labels
//! 3. [`archetype`]: decide what kind of interface this is
//! 4. [`planner`]: compute positions (template or delegated)
//! 5. [`clamp`]: keep elements inside the container horizontally
//! 6. [`lint`]: report overlaps and overflow in the final plan

pub mod archetype;
pub mod canonical;
pub mod clamp;
pub mod config;
pub mod error;
pub mod lint;
pub mod pairing;
pub mod planner;
pub mod roles;
pub mod types;

pub use archetype::classify_ui;
pub use canonical::normalize_label;
pub use clamp::clamp_to_container;
pub use config::{ConfigError, EngineConfig};
pub use error::PlanError;
pub use lint::{LintCategory, LintWarning};
pub use pairing::{pair_elements, Pairing};
pub use planner::{
    DecisionMaker, DelegatedPlanner, FallbackPlanner, FixedResponse, PlanInput, PlanOutcome,
    PlanSource, PositionPlanner, TemplatePlanner,
};
pub use roles::{classify_roles, RolePartition};
pub use types::*;

use std::collections::HashSet;

use tracing::debug;

/// Enforce plan invariants: every id known, none assigned twice.
///
/// The first assignment for an id wins.
pub fn sanitize_plan(
    plan: Vec<PositionAssignment>,
    known_ids: &HashSet<&str>,
) -> Vec<PositionAssignment> {
    let mut seen = HashSet::new();
    let before = plan.len();
    let kept: Vec<PositionAssignment> = plan
        .into_iter()
        .filter(|a| known_ids.contains(a.element_id.as_str()) && seen.insert(a.element_id.clone()))
        .collect();
    if kept.len() != before {
        debug!(dropped = before - kept.len(), "removed duplicate or unknown assignments");
    }
    kept
}
