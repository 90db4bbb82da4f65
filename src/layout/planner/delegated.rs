//! Delegated planning: an external decision process proposes positions
//!
//! The planner renders a reproducible text description of the units and the
//! container, hands it to a [`DecisionMaker`], and validates the JSON array
//! that comes back. [`FallbackPlanner`] wraps it so that any failure ends in
//! the deterministic template plan instead of an error.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::super::canonical::{canonical_table, render_table};
use super::super::error::PlanError;
use super::super::types::PositionAssignment;
use super::template::TemplatePlanner;
use super::{
    centered_label, LayoutUnit, PlanInput, PlanOutcome, PlanSource, PositionPlanner, UnitKind,
};

/// Something that answers a layout question with text, typically a language model
#[async_trait]
pub trait DecisionMaker: Send + Sync {
    async fn decide(&self, prompt: &str) -> Result<String, PlanError>;
}

/// A decision maker that always answers with the same text
#[derive(Debug, Clone)]
pub struct FixedResponse(pub String);

impl FixedResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self(response.into())
    }
}

#[async_trait]
impl DecisionMaker for FixedResponse {
    async fn decide(&self, _prompt: &str) -> Result<String, PlanError> {
        Ok(self.0.clone())
    }
}

fn kind_name(unit: &LayoutUnit) -> &'static str {
    match unit.kind {
        UnitKind::Display => "display",
        UnitKind::Button => "button",
        UnitKind::Loose if unit.element.is_text() => "text",
        UnitKind::Loose => "other",
    }
}

/// Render the layout question. Same input, same text.
pub fn describe(input: &PlanInput) -> String {
    let ctx = &input.context;
    let mut out = String::new();
    let _ = writeln!(out, "Arrange the elements below inside their container.");
    let _ = writeln!(
        out,
        "Container: {}x{}",
        ctx.container_width, ctx.container_height
    );
    let _ = writeln!(
        out,
        "Layout: mode={} columns={} gap={}x{} start=({}, {}) margin={}",
        ctx.layout_mode, ctx.columns, ctx.gap_x, ctx.gap_y, ctx.start_x, ctx.start_y, input.margin
    );
    let _ = writeln!(out, "Interface type: {}", input.ui_type);
    let _ = writeln!(out, "Elements:");
    for unit in input.units() {
        let text = unit
            .text
            .as_ref()
            .map(|t| t.id.as_str())
            .unwrap_or("none");
        let _ = writeln!(
            out,
            "- id={} role={} label={:?} size={}x{} label_element={}",
            unit.id(),
            kind_name(unit),
            unit.label,
            unit.width(),
            unit.height(),
            text
        );
    }

    let table = canonical_table(input.ui_type);
    if table.is_empty() {
        let _ = writeln!(out, "Reference layout: none, use a clean {} flow", ctx.layout_mode);
    } else {
        let _ = writeln!(out, "Reference layout (label@column, +span for wide keys):");
        let _ = writeln!(out, "{}", render_table(table));
    }
    let _ = writeln!(
        out,
        "Position rectangles and standalone elements; paired labels follow their rectangle."
    );
    out.push_str(r#"Respond with a JSON array only: [{"id": "<element id>", "x": <number>, "y": <number>}]"#);
    out
}

/// Extract validated positions from a decision response.
///
/// The JSON array is located between the first `[` and the last `]`. Entries
/// without a string `id` and numeric `x`/`y`, entries for unknown ids and
/// repeated ids are dropped.
pub fn parse_decision(
    response: &str,
    known_ids: &HashSet<&str>,
) -> Result<Vec<PositionAssignment>, PlanError> {
    let start = response
        .find('[')
        .ok_or_else(|| PlanError::unparsable("no JSON array found"))?;
    let end = response
        .rfind(']')
        .filter(|&end| end > start)
        .ok_or_else(|| PlanError::unparsable("unterminated JSON array"))?;

    let entries: Vec<Value> = serde_json::from_str(&response[start..=end])
        .map_err(|e| PlanError::unparsable(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut positions = Vec::new();
    let mut dropped = 0;
    for entry in &entries {
        let id = entry.get("id").and_then(Value::as_str);
        let x = entry.get("x").and_then(Value::as_f64).filter(|v| v.is_finite());
        let y = entry.get("y").and_then(Value::as_f64).filter(|v| v.is_finite());
        match (id, x, y) {
            (Some(id), Some(x), Some(y)) if known_ids.contains(id) && seen.insert(id) => {
                positions.push(PositionAssignment::new(id, x, y));
            }
            _ => dropped += 1,
        }
    }

    if positions.is_empty() {
        return Err(PlanError::NoUsableEntries { dropped });
    }
    if dropped > 0 {
        debug!(dropped, kept = positions.len(), "dropped invalid decision entries");
    }
    Ok(positions)
}

/// Planner that defers the x/y decision to a [`DecisionMaker`]
#[derive(Clone)]
pub struct DelegatedPlanner {
    decision: Arc<dyn DecisionMaker>,
}

impl DelegatedPlanner {
    pub fn new(decision: Arc<dyn DecisionMaker>) -> Self {
        Self { decision }
    }
}

#[async_trait]
impl PositionPlanner for DelegatedPlanner {
    async fn plan(&self, input: &PlanInput) -> Result<Vec<PositionAssignment>, PlanError> {
        let prompt = describe(input);
        let response = self.decision.decide(&prompt).await?;
        parse_decision(&response, &input.element_ids())
    }
}

/// Tries the delegated backend, falls back to the template plan.
///
/// Width overrides always come from the template plan, and any element the
/// decision left out keeps its template position.
#[derive(Clone)]
pub struct FallbackPlanner {
    delegated: DelegatedPlanner,
    template: TemplatePlanner,
}

impl FallbackPlanner {
    pub fn new(decision: Arc<dyn DecisionMaker>) -> Self {
        Self {
            delegated: DelegatedPlanner::new(decision),
            template: TemplatePlanner::new(),
        }
    }

    /// Plan and report which backend the positions came from. Never fails.
    pub async fn plan_outcome(&self, input: &PlanInput) -> PlanOutcome {
        let baseline = self.template.plan_sync(input);
        match self.delegated.plan(input).await {
            Ok(proposed) => {
                info!(proposed = proposed.len(), "using delegated positions");
                PlanOutcome {
                    assignments: merge(input, &baseline, &proposed),
                    source: PlanSource::Delegated,
                }
            }
            Err(e) => {
                warn!(error = %e, "delegated planning failed, using template plan");
                PlanOutcome {
                    assignments: baseline,
                    source: PlanSource::Fallback,
                }
            }
        }
    }
}

#[async_trait]
impl PositionPlanner for FallbackPlanner {
    async fn plan(&self, input: &PlanInput) -> Result<Vec<PositionAssignment>, PlanError> {
        Ok(self.plan_outcome(input).await.assignments)
    }
}

/// Overlay proposed positions on the template plan.
fn merge(
    input: &PlanInput,
    baseline: &[PositionAssignment],
    proposed: &[PositionAssignment],
) -> Vec<PositionAssignment> {
    let base: HashMap<&str, &PositionAssignment> =
        baseline.iter().map(|a| (a.element_id.as_str(), a)).collect();
    let chosen: HashMap<&str, &PositionAssignment> =
        proposed.iter().map(|a| (a.element_id.as_str(), a)).collect();

    let mut merged = Vec::with_capacity(baseline.len());
    for unit in input.units() {
        let width = base.get(unit.id()).and_then(|a| a.width);
        let rect = match chosen.get(unit.id()) {
            Some(p) => PositionAssignment {
                element_id: unit.id().to_string(),
                x: p.x,
                y: p.y,
                width,
            },
            None => match base.get(unit.id()) {
                Some(a) => (*a).clone(),
                None => continue,
            },
        };

        if let Some(text) = &unit.text {
            let label = match chosen.get(text.id.as_str()) {
                Some(p) => Some((*p).clone()),
                None if chosen.contains_key(unit.id()) => {
                    centered_label(unit, rect.x, rect.y, width.unwrap_or(unit.width()))
                }
                None => base.get(text.id.as_str()).map(|a| (*a).clone()),
            };
            merged.push(rect);
            merged.extend(label);
        } else {
            merged.push(rect);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::EngineConfig;
    use crate::layout::pairing::pair_elements;
    use crate::layout::roles::classify_roles;
    use crate::layout::types::{Container, Element, LayoutContext, LayoutParams};

    struct Failing;

    #[async_trait]
    impl DecisionMaker for Failing {
        async fn decide(&self, _prompt: &str) -> Result<String, PlanError> {
            Err(PlanError::Decision("model unavailable".to_string()))
        }
    }

    fn two_buttons() -> PlanInput {
        let elements = vec![
            Element::rect("r1", 0.0, 0.0, 60.0, 40.0),
            Element::text("t1", "Go", 20.0, 13.0, 20.0, 14.0),
            Element::rect("r2", 100.0, 0.0, 60.0, 40.0),
        ];
        let config = EngineConfig::default();
        let partition = classify_roles(&elements, &config.roles);
        let pairing = pair_elements(&partition, &config.pairing);
        let context = LayoutContext::new(&LayoutParams::default(), &Container::new(300.0, 200.0));
        PlanInput::build(&partition, &pairing, context, &config)
    }

    fn known<'a>(ids: &[&'a str]) -> HashSet<&'a str> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_parse_embedded_array() {
        let response = r#"Sure! Here is the layout:
```json
[{"id": "a", "x": 10, "y": 20.5}, {"id": "b", "x": 5, "y": 5}]
```"#;
        let parsed = parse_decision(response, &known(&["a", "b"])).unwrap();
        assert_eq!(
            parsed,
            vec![
                PositionAssignment::new("a", 10.0, 20.5),
                PositionAssignment::new("b", 5.0, 5.0),
            ]
        );
    }

    #[test]
    fn test_parse_drops_invalid_and_unknown_entries() {
        let response = r#"[
            {"id": "a", "x": 1, "y": 2},
            {"id": 7, "x": 1, "y": 2},
            {"id": "b", "x": "left", "y": 2},
            {"id": "ghost", "x": 1, "y": 2},
            {"id": "a", "x": 99, "y": 99},
            {"id": "c", "y": 3}
        ]"#;
        let parsed = parse_decision(response, &known(&["a", "b", "c"])).unwrap();
        assert_eq!(parsed, vec![PositionAssignment::new("a", 1.0, 2.0)]);
    }

    #[test]
    fn test_parse_failures() {
        let ids = known(&["a"]);
        assert!(matches!(
            parse_decision("not json", &ids),
            Err(PlanError::Unparsable { .. })
        ));
        assert!(matches!(
            parse_decision("] oops [", &ids),
            Err(PlanError::Unparsable { .. })
        ));
        assert!(matches!(
            parse_decision("[{\"id\": \"a\", \"x\": 1,]", &ids),
            Err(PlanError::Unparsable { .. })
        ));
        assert!(matches!(
            parse_decision(r#"[{"id": "zzz", "x": 1, "y": 1}]"#, &ids),
            Err(PlanError::NoUsableEntries { dropped: 1 })
        ));
    }

    #[test]
    fn test_description_is_reproducible() {
        let input = two_buttons();
        assert_eq!(describe(&input), describe(&input));
        insta::assert_snapshot!(describe(&input), @r###"
        Arrange the elements below inside their container.
        Container: 300x200
        Layout: mode=grid columns=4 gap=10x10 start=(20, 20) margin=10
        Interface type: generic
        Elements:
        - id=r1 role=button label="Go" size=60x40 label_element=t1
        - id=r2 role=button label="?" size=60x40 label_element=none
        Reference layout: none, use a clean grid flow
        Position rectangles and standalone elements; paired labels follow their rectangle.
        Respond with a JSON array only: [{"id": "<element id>", "x": <number>, "y": <number>}]
        "###);
    }

    #[tokio::test]
    async fn test_fallback_on_unparsable_response() {
        let input = two_buttons();
        let planner = FallbackPlanner::new(Arc::new(FixedResponse::new("not json")));
        let outcome = planner.plan_outcome(&input).await;
        assert_eq!(outcome.source, PlanSource::Fallback);
        assert_eq!(outcome.assignments, TemplatePlanner::new().plan_sync(&input));
    }

    #[tokio::test]
    async fn test_fallback_on_collaborator_error() {
        let input = two_buttons();
        let outcome = FallbackPlanner::new(Arc::new(Failing)).plan_outcome(&input).await;
        assert_eq!(outcome.source, PlanSource::Fallback);
        assert!(!outcome.assignments.is_empty());
    }

    #[tokio::test]
    async fn test_delegated_positions_move_labels_and_fill_gaps() {
        let input = two_buttons();
        let planner = FallbackPlanner::new(Arc::new(FixedResponse::new(
            r#"[{"id": "r1", "x": 100, "y": 50}]"#,
        )));
        let outcome = planner.plan_outcome(&input).await;
        assert_eq!(outcome.source, PlanSource::Delegated);
        assert_eq!(
            outcome.assignments,
            vec![
                PositionAssignment::new("r1", 100.0, 50.0),
                // label centered on the proposed box
                PositionAssignment::new("t1", 120.0, 63.0),
                // r2 was not proposed: template position
                PositionAssignment::new("r2", 90.0, 20.0),
            ]
        );
    }
}
