//! Position planning
//!
//! Planners turn classified, paired elements into a list of
//! [`PositionAssignment`]s. Two backends implement [`PositionPlanner`]:
//!
//! - [`TemplatePlanner`]: deterministic, archetype-driven placement
//! - [`DelegatedPlanner`]: asks an external [`DecisionMaker`] for positions
//!
//! [`FallbackPlanner`] composes them: it tries the delegated backend and
//! falls back to the template plan whenever the decision is unusable, so a
//! plan is never empty.

mod delegated;
mod template;

pub use delegated::{
    describe, parse_decision, DecisionMaker, DelegatedPlanner, FallbackPlanner, FixedResponse,
};
pub use template::TemplatePlanner;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Serialize;

use super::archetype::classify_ui;
use super::config::EngineConfig;
use super::error::PlanError;
use super::pairing::{reading_order, Pairing};
use super::roles::RolePartition;
use super::types::{Element, LayoutContext, PositionAssignment, Role, UiType};

/// Label used when an element has nothing readable
pub const UNKNOWN_LABEL: &str = "?";

/// What a unit is, as far as placement goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Display,
    Button,
    /// Unpaired text or a node that is neither rectangle nor text
    Loose,
}

/// One placeable thing: a rectangle with its label, or a standalone element
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutUnit {
    pub kind: UnitKind,
    pub element: Element,
    /// Paired label, moved along with the rectangle
    pub text: Option<Element>,
    pub label: String,
}

impl LayoutUnit {
    pub fn new(kind: UnitKind, element: Element, text: Option<Element>) -> Self {
        let label = text
            .as_ref()
            .and_then(|t| non_empty(t.label.as_deref()))
            .or_else(|| non_empty(element.label.as_deref()))
            .unwrap_or(UNKNOWN_LABEL)
            .to_string();
        Self {
            kind,
            element,
            text,
            label,
        }
    }

    pub fn id(&self) -> &str {
        &self.element.id
    }

    pub fn width(&self) -> f64 {
        self.element.width
    }

    pub fn height(&self) -> f64 {
        self.element.height
    }

    /// Role of the unit's rectangle, if it has one
    pub fn role(&self) -> Option<Role> {
        match self.kind {
            UnitKind::Display => Some(Role::Display),
            UnitKind::Button => Some(Role::Button),
            UnitKind::Loose => None,
        }
    }
}

fn non_empty(label: Option<&str>) -> Option<&str> {
    label.map(str::trim).filter(|l| !l.is_empty())
}

/// Everything a planner needs, built once per invocation
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub context: LayoutContext,
    pub ui_type: UiType,
    pub displays: Vec<LayoutUnit>,
    pub buttons: Vec<LayoutUnit>,
    pub loose: Vec<LayoutUnit>,
    /// Right-hand margin kept free inside the container
    pub margin: f64,
    /// Button size assumed when there are no buttons to sample
    pub default_button_size: (f64, f64),
    /// Bottom-band factor of the display gate; dashboard panels stay clear of it
    pub bottom_band_factor: f64,
}

impl PlanInput {
    /// Assemble units from the role partition and pairing, and classify the interface.
    pub fn build(
        partition: &RolePartition,
        pairing: &Pairing,
        context: LayoutContext,
        config: &EngineConfig,
    ) -> Self {
        let texts: HashMap<&str, &Element> = partition
            .texts
            .iter()
            .map(|t| (t.id.as_str(), t))
            .collect();
        let row_bucket = config.pairing.row_bucket;

        let rect_units = |rects: &[Element], kind: UnitKind| -> Vec<LayoutUnit> {
            reading_order(rects, row_bucket)
                .into_iter()
                .map(|rect| {
                    let text = pairing
                        .text_for(&rect.id)
                        .and_then(|id| texts.get(id))
                        .map(|t| (*t).clone());
                    LayoutUnit::new(kind, rect, text)
                })
                .collect()
        };
        let displays = rect_units(&partition.displays, UnitKind::Display);
        let buttons = rect_units(&partition.buttons, UnitKind::Button);

        let unpaired: HashSet<&str> = pairing.unpaired_texts.iter().map(String::as_str).collect();
        let mut leftovers: Vec<Element> = partition
            .texts
            .iter()
            .filter(|t| unpaired.contains(t.id.as_str()))
            .cloned()
            .collect();
        leftovers.extend(partition.others.iter().cloned());
        let loose = reading_order(&leftovers, row_bucket)
            .into_iter()
            .map(|e| LayoutUnit::new(UnitKind::Loose, e, None))
            .collect();

        let labels: Vec<String> = buttons.iter().map(|b| b.label.clone()).collect();
        let ui_type = classify_ui(&labels, displays.len(), &config.archetype);

        Self {
            context,
            ui_type,
            displays,
            buttons,
            loose,
            margin: config.planner.margin,
            default_button_size: config.planner.default_button_size,
            bottom_band_factor: config.roles.bottom_band_factor,
        }
    }

    /// All units: displays, buttons, then loose elements
    pub fn units(&self) -> impl Iterator<Item = &LayoutUnit> {
        self.displays
            .iter()
            .chain(self.buttons.iter())
            .chain(self.loose.iter())
    }

    /// Every element id the plan may reference
    pub fn element_ids(&self) -> HashSet<&str> {
        let mut ids = HashSet::new();
        for unit in self.units() {
            ids.insert(unit.id());
            if let Some(text) = &unit.text {
                ids.insert(text.id.as_str());
            }
        }
        ids
    }

    /// Element id to (width, height), for clamping and linting
    pub fn sizes(&self) -> HashMap<String, (f64, f64)> {
        let mut sizes = HashMap::new();
        for unit in self.units() {
            sizes.insert(unit.id().to_string(), (unit.width(), unit.height()));
            if let Some(text) = &unit.text {
                sizes.insert(text.id.clone(), (text.width, text.height));
            }
        }
        sizes
    }

    /// Ids of paired text labels
    pub fn label_ids(&self) -> Vec<&str> {
        self.units()
            .filter_map(|u| u.text.as_ref().map(|t| t.id.as_str()))
            .collect()
    }

    pub fn button_labels(&self) -> Vec<&str> {
        self.buttons.iter().map(|b| b.label.as_str()).collect()
    }

    /// Horizontal space a row of cells may use
    pub fn available_width(&self) -> f64 {
        self.context.container_width - self.context.start_x - self.margin
    }
}

/// Where a plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    Template,
    Delegated,
    /// Delegation was requested but the deterministic plan was used
    Fallback,
}

/// A plan plus its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub assignments: Vec<PositionAssignment>,
    pub source: PlanSource,
}

/// A strategy that computes positions for every unit of a [`PlanInput`]
#[async_trait]
pub trait PositionPlanner: Send + Sync {
    async fn plan(&self, input: &PlanInput) -> Result<Vec<PositionAssignment>, PlanError>;
}

/// Position of a paired label centered inside its rectangle's new box
pub(crate) fn centered_label(
    unit: &LayoutUnit,
    x: f64,
    y: f64,
    width: f64,
) -> Option<PositionAssignment> {
    unit.text.as_ref().map(|text| {
        PositionAssignment::new(
            text.id.clone(),
            x + (width - text.width) / 2.0,
            y + (unit.height() - text.height) / 2.0,
        )
    })
}
