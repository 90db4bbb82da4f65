//! Arrangement entry points
//!
//! [`Arranger::rearrange`] moves elements that already exist on the canvas:
//! discover, classify, pair, plan, clamp, lint, then apply mutations in
//! batches. [`plan_new_elements`] computes where elements should be created
//! before they exist.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::canvas::{
    execute_batches, BatchReport, CanvasDiscovery, CanvasMutator, CanvasNode, MutationCall,
    DEFAULT_NODE_HEIGHT,
};
use crate::error::ArrangeError;
use crate::layout::config::ExecutionConfig;
use crate::layout::lint::{self, LintWarning};
use crate::layout::planner::{LayoutUnit, UnitKind};
use crate::layout::{
    clamp_to_container, classify_roles, classify_ui, pair_elements, sanitize_plan, Container,
    DecisionMaker, Element, EngineConfig, FallbackPlanner, LayoutContext, LayoutParams, Pair,
    PlanInput, PlanOutcome, PlanSource, PositionAssignment, TemplatePlanner, UiType,
};

/// Which elements to arrange
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    /// Every direct child of a container
    Container(String),
    /// An explicit selection. Without a container, the selection's own
    /// bounding box is used as the frame.
    Elements {
        ids: Vec<String>,
        container: Option<String>,
    },
}

impl Scope {
    fn describe(&self) -> String {
        match self {
            Scope::Container(id) => format!("container '{}'", id),
            Scope::Elements { ids, .. } => format!("selection of {} element(s)", ids.len()),
        }
    }

    /// Same scope with repeated selection ids dropped, first occurrence kept
    fn deduplicated(&self) -> Scope {
        match self {
            Scope::Container(id) => Scope::Container(id.clone()),
            Scope::Elements { ids, container } => {
                let mut seen = HashSet::new();
                let unique: Vec<String> = ids
                    .iter()
                    .filter(|id| seen.insert(id.as_str()))
                    .cloned()
                    .collect();
                if unique.len() < ids.len() {
                    debug!(dropped = ids.len() - unique.len(), "duplicate selection ids");
                }
                Scope::Elements {
                    ids: unique,
                    container: container.clone(),
                }
            }
        }
    }
}

/// One call to [`Arranger::rearrange`]
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangeRequest {
    pub scope: Scope,
    pub params: LayoutParams,
    pub use_delegated_decision: bool,
}

impl ArrangeRequest {
    pub fn container(id: impl Into<String>) -> Self {
        Self {
            scope: Scope::Container(id.into()),
            params: LayoutParams::default(),
            use_delegated_decision: false,
        }
    }

    pub fn elements<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope: Scope::Elements {
                ids: ids.into_iter().map(Into::into).collect(),
                container: None,
            },
            params: LayoutParams::default(),
            use_delegated_decision: false,
        }
    }

    /// Arrange an explicit selection inside a named container
    pub fn within(mut self, container_id: impl Into<String>) -> Self {
        if let Scope::Elements { container, .. } = &mut self.scope {
            *container = Some(container_id.into());
        }
        self
    }

    pub fn with_params(mut self, params: LayoutParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_delegated_decision(mut self, enabled: bool) -> Self {
        self.use_delegated_decision = enabled;
        self
    }
}

/// What an arrangement did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrangeReport {
    pub ui_type: UiType,
    pub source: PlanSource,
    pub element_count: usize,
    pub pairs: Vec<Pair>,
    /// Final container-relative plan, after clamping
    pub assignments: Vec<PositionAssignment>,
    pub batch: BatchReport,
    pub warnings: Vec<LintWarning>,
}

/// Rearranges existing canvas elements
#[derive(Clone)]
pub struct Arranger {
    discovery: Arc<dyn CanvasDiscovery>,
    mutator: Arc<dyn CanvasMutator>,
    decision: Option<Arc<dyn DecisionMaker>>,
    config: EngineConfig,
}

impl Arranger {
    pub fn new(discovery: Arc<dyn CanvasDiscovery>, mutator: Arc<dyn CanvasMutator>) -> Self {
        Self {
            discovery,
            mutator,
            decision: None,
            config: EngineConfig::default(),
        }
    }

    pub fn with_decision_maker(mut self, decision: Arc<dyn DecisionMaker>) -> Self {
        self.decision = Some(decision);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Discover, plan and move. Errors only before the first mutation;
    /// individual mutation failures land in the report.
    pub async fn rearrange(&self, request: &ArrangeRequest) -> Result<ArrangeReport, ArrangeError> {
        let (scope, decision) = self.validate(request)?;
        let (container, elements) = self.discover(&scope).await?;
        info!(
            scope = %scope.describe(),
            elements = elements.len(),
            layout = %request.params.layout,
            "arranging"
        );

        let partition = classify_roles(&elements, &self.config.roles);
        let pairing = pair_elements(&partition, &self.config.pairing);
        let context = LayoutContext::new(&request.params, &container);
        let input = PlanInput::build(&partition, &pairing, context, &self.config);
        debug!(
            ui_type = %input.ui_type,
            displays = input.displays.len(),
            buttons = input.buttons.len(),
            pairs = pairing.pairs.len(),
            "classified"
        );

        let outcome = match decision {
            Some(decision) => FallbackPlanner::new(decision).plan_outcome(&input).await,
            None => PlanOutcome {
                assignments: TemplatePlanner::new().plan_sync(&input),
                source: PlanSource::Template,
            },
        };

        let sizes = input.sizes();
        let plan = sanitize_plan(outcome.assignments, &input.element_ids());
        let plan = clamp_to_container(&plan, &sizes, context.container_width, input.margin);
        let labels: HashSet<&str> = input.label_ids().into_iter().collect();
        let warnings = lint::check(&plan, &sizes, &labels, context.container_height);
        for warning in &warnings {
            debug!(category = %warning.category, "{}", warning.message);
        }

        let calls = mutation_calls(&plan, &input, &container, &self.config.execution);
        let batch_size = match outcome.source {
            PlanSource::Template => self.config.execution.batch_size,
            PlanSource::Delegated | PlanSource::Fallback => {
                self.config.execution.delegated_batch_size
            }
        };
        let batch = execute_batches(self.mutator.as_ref(), &calls, batch_size).await;

        Ok(ArrangeReport {
            ui_type: input.ui_type,
            source: outcome.source,
            element_count: elements.len(),
            pairs: pairing.pairs,
            assignments: plan,
            batch,
            warnings,
        })
    }

    /// Check the request before any remote call. Returns the scope to
    /// discover and the decision maker to consult, if any.
    fn validate(
        &self,
        request: &ArrangeRequest,
    ) -> Result<(Scope, Option<Arc<dyn DecisionMaker>>), ArrangeError> {
        request.params.validate()?;
        match &request.scope {
            Scope::Container(id) if id.trim().is_empty() => {
                return Err(ArrangeError::invalid_input("container id is empty"));
            }
            Scope::Elements { ids, .. } if ids.is_empty() => {
                return Err(ArrangeError::invalid_input("element id list is empty"));
            }
            _ => {}
        }
        let scope = request.scope.deduplicated();
        if !request.use_delegated_decision {
            return Ok((scope, None));
        }
        let decision = self.decision.clone().ok_or_else(|| {
            ArrangeError::invalid_input(
                "delegated decision requested but no decision maker is configured",
            )
        })?;
        Ok((scope, Some(decision)))
    }

    async fn discover(&self, scope: &Scope) -> Result<(Container, Vec<Element>), ArrangeError> {
        let (container, nodes) = match scope {
            Scope::Container(id) => {
                let container = self.discovery.container(id).await?.as_container();
                (container, self.discovery.children(id).await?)
            }
            Scope::Elements { ids, container } => {
                let nodes = self.discovery.nodes(ids).await?;
                let container = match container {
                    Some(id) => Some(self.discovery.container(id).await?.as_container()),
                    None => selection_frame(&nodes),
                };
                match container {
                    Some(container) => (container, nodes),
                    None => return Err(ArrangeError::discovery_empty(scope.describe())),
                }
            }
        };
        if nodes.is_empty() {
            return Err(ArrangeError::discovery_empty(scope.describe()));
        }
        let elements = nodes.iter().map(|n| n.to_element(&container)).collect();
        Ok((container, elements))
    }
}

/// Union bounding box of a selection, as a container
fn selection_frame(nodes: &[CanvasNode]) -> Option<Container> {
    nodes
        .iter()
        .map(CanvasNode::bounds)
        .reduce(|a, b| a.union(&b))
        .map(|b| Container::new(b.width, b.height).with_offset(b.x, b.y))
}

/// Translate a relative plan into absolute canvas calls.
///
/// Resizes come first for each element, labels are raised after every move.
fn mutation_calls(
    plan: &[PositionAssignment],
    input: &PlanInput,
    container: &Container,
    execution: &ExecutionConfig,
) -> Vec<MutationCall> {
    let sizes = input.sizes();
    let buttons: HashSet<&str> = input.buttons.iter().map(LayoutUnit::id).collect();
    let labels: HashSet<&str> = input.label_ids().into_iter().collect();

    let mut calls = Vec::with_capacity(plan.len());
    for assignment in plan {
        let id = assignment.element_id.clone();
        if let Some(width) = assignment.width {
            let height = sizes
                .get(&id)
                .map(|&(_, h)| h)
                .unwrap_or(DEFAULT_NODE_HEIGHT);
            calls.push(MutationCall::Resize {
                element_id: id.clone(),
                width,
                height,
            });
        }
        let (x, y) = container.to_absolute(assignment.x, assignment.y);
        calls.push(MutationCall::Move {
            element_id: id.clone(),
            x,
            y,
        });
        if let Some(radius) = execution.corner_radius {
            if buttons.contains(id.as_str()) {
                calls.push(MutationCall::CornerRadius {
                    element_id: id,
                    radius,
                });
            }
        }
    }
    if execution.raise_labels {
        calls.extend(
            plan.iter()
                .filter(|a| labels.contains(a.element_id.as_str()))
                .map(|a| MutationCall::BringToFront {
                    element_id: a.element_id.clone(),
                }),
        );
    }
    calls
}

/// An element about to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewElementSpec {
    pub id: String,
    pub label: String,
    /// Full-width readout rather than a key
    #[serde(default)]
    pub display: bool,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl NewElementSpec {
    pub fn button(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            display: false,
            width: None,
            height: None,
        }
    }

    pub fn display(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            display: true,
            ..Self::button(id, label)
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Where and how big to create an element, in absolute coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewElementPlacement {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Plan positions for elements that do not exist yet.
///
/// Buttons default to the configured button size, displays to the full
/// available width. Placements come back in planning order.
pub fn plan_new_elements(
    specs: &[NewElementSpec],
    params: &LayoutParams,
    container: &Container,
    config: &EngineConfig,
) -> Result<Vec<NewElementPlacement>, ArrangeError> {
    params.validate()?;
    if specs.is_empty() {
        return Err(ArrangeError::invalid_input("no elements to place"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = specs.iter().find(|s| !seen.insert(s.id.as_str())) {
        return Err(ArrangeError::invalid_input(format!(
            "element id '{}' appears more than once",
            dup.id
        )));
    }

    let context = LayoutContext::new(params, container);
    let margin = config.planner.margin;
    let (button_w, button_h) = config.planner.default_button_size;
    let display_w = (context.container_width - context.start_x - margin).max(button_w);

    let unit = |spec: &NewElementSpec| {
        let (kind, default_w) = if spec.display {
            (UnitKind::Display, display_w)
        } else {
            (UnitKind::Button, button_w)
        };
        let element = Element::rect(
            spec.id.clone(),
            0.0,
            0.0,
            spec.width.unwrap_or(default_w),
            spec.height.unwrap_or(button_h),
        )
        .with_label(spec.label.clone());
        LayoutUnit::new(kind, element, None)
    };
    let (displays, buttons): (Vec<LayoutUnit>, Vec<LayoutUnit>) = specs
        .iter()
        .map(unit)
        .partition(|u| u.kind == UnitKind::Display);

    let labels: Vec<String> = buttons.iter().map(|b| b.label.clone()).collect();
    let ui_type = classify_ui(&labels, displays.len(), &config.archetype);
    let input = PlanInput {
        context,
        ui_type,
        displays,
        buttons,
        loose: Vec::new(),
        margin,
        default_button_size: config.planner.default_button_size,
        bottom_band_factor: config.roles.bottom_band_factor,
    };

    let sizes = input.sizes();
    let plan = TemplatePlanner::new().plan_sync(&input);
    let plan = clamp_to_container(&plan, &sizes, context.container_width, margin);
    let labels: HashMap<&str, &str> = input
        .units()
        .map(|u| (u.id(), u.label.as_str()))
        .collect();
    debug!(ui_type = %ui_type, count = plan.len(), "planned new elements");

    Ok(plan
        .into_iter()
        .filter_map(|a| {
            let &(width, height) = sizes.get(&a.element_id)?;
            let label = labels.get(a.element_id.as_str())?.to_string();
            let (x, y) = container.to_absolute(a.x, a.y);
            Some(NewElementPlacement {
                id: a.element_id,
                label,
                x,
                y,
                width: a.width.unwrap_or(width),
                height,
            })
        })
        .collect())
}
