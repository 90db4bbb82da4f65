//! Canvas collaborators: discovery, mutation, and the node wire format
//!
//! The engine never talks to a canvas API directly. Discovery hands it
//! [`CanvasNode`]s; positions go back out as [`MutationCall`]s through a
//! [`CanvasMutator`]. Node coordinates are absolute; [`CanvasNode::to_element`]
//! converts them into the container-relative space the layout code works in.

pub mod batch;
pub mod memory;

pub use batch::{execute_batches, BatchReport, MutationFailure};
pub use memory::{CanvasSnapshot, MemoryCanvas};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::types::{BoundingBox, Container, Element, ElementKind};

/// Width assumed for a node that reports none
pub const DEFAULT_NODE_WIDTH: f64 = 100.0;
/// Height assumed for a node that reports none
pub const DEFAULT_NODE_HEIGHT: f64 = 40.0;

/// Longest node name still treated as a readable label
const MAX_NAME_LABEL_CHARS: usize = 20;

/// Auto-generated layer names that carry no meaning ("Rectangle 12")
const GENERIC_NAMES: &[&str] = &[
    "rectangle", "rect", "text", "frame", "group", "ellipse", "vector", "line", "shape",
];

/// Errors reported by canvas collaborators
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CanvasError {
    #[error("node '{id}' not found")]
    NotFound { id: String },

    #[error("canvas request failed: {message}")]
    Transport { message: String },

    #[error("canvas rejected the change: {message}")]
    Rejected { message: String },
}

impl CanvasError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Nested bounding box encoding used by some canvas APIs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeBounds {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// A node as reported by discovery.
///
/// Geometry may arrive as direct fields or inside a nested bounding box;
/// direct fields win when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(
        default,
        alias = "absoluteBoundingBox",
        skip_serializing_if = "Option::is_none"
    )]
    pub bounding_box: Option<NodeBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
}

impl CanvasNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            ..Self::default()
        }
    }

    /// Set direct geometry fields
    pub fn at(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_characters(mut self, characters: impl Into<String>) -> Self {
        self.characters = Some(characters.into());
        self
    }

    /// Absolute bounds, with defaults for anything missing
    pub fn bounds(&self) -> BoundingBox {
        let nested = self.bounding_box.unwrap_or_default();
        BoundingBox::new(
            self.x.or(nested.x).unwrap_or(0.0),
            self.y.or(nested.y).unwrap_or(0.0),
            self.width.or(nested.width).unwrap_or(DEFAULT_NODE_WIDTH),
            self.height.or(nested.height).unwrap_or(DEFAULT_NODE_HEIGHT),
        )
    }

    pub fn kind(&self) -> ElementKind {
        match self.node_type.to_ascii_uppercase().as_str() {
            "RECTANGLE" | "RECT" | "ROUNDED_RECTANGLE" => ElementKind::Rectangle,
            "TEXT" => ElementKind::Text,
            _ => ElementKind::Other,
        }
    }

    /// Best-effort readable label: text content first, then a meaningful name
    pub fn label(&self) -> Option<String> {
        self.characters
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .or_else(|| meaningful_name(&self.name))
            .map(str::to_string)
    }

    /// Snapshot as a container-relative element
    pub fn to_element(&self, container: &Container) -> Element {
        let bounds = self.bounds();
        let (x, y) = container.to_relative(bounds.x, bounds.y);
        Element {
            id: self.id.clone(),
            kind: self.kind(),
            x,
            y,
            width: bounds.width,
            height: bounds.height,
            label: self.label(),
        }
    }

    /// Treat this node as the container being arranged
    pub fn as_container(&self) -> Container {
        let bounds = self.bounds();
        Container::new(bounds.width, bounds.height).with_offset(bounds.x, bounds.y)
    }

    /// Move the node, keeping whichever geometry encoding it uses
    pub fn set_position(&mut self, x: f64, y: f64) {
        match &mut self.bounding_box {
            Some(nested) if self.x.is_none() => {
                nested.x = Some(x);
                nested.y = Some(y);
            }
            _ => {
                self.x = Some(x);
                self.y = Some(y);
            }
        }
    }

    /// Resize the node, keeping whichever geometry encoding it uses
    pub fn set_size(&mut self, width: f64, height: f64) {
        match &mut self.bounding_box {
            Some(nested) if self.width.is_none() => {
                nested.width = Some(width);
                nested.height = Some(height);
            }
            _ => {
                self.width = Some(width);
                self.height = Some(height);
            }
        }
    }
}

/// A layer name is a label only if a person wrote it
fn meaningful_name(name: &str) -> Option<&str> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LABEL_CHARS {
        return None;
    }
    let mut words = name.split_whitespace();
    let first = words.next()?.to_lowercase();
    let rest_is_number = words.all(|w| w.chars().all(|c| c.is_ascii_digit()));
    if GENERIC_NAMES.contains(&first.as_str()) && rest_is_number {
        return None;
    }
    Some(name)
}

/// One remote mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MutationCall {
    Move {
        element_id: String,
        x: f64,
        y: f64,
    },
    Resize {
        element_id: String,
        width: f64,
        height: f64,
    },
    CornerRadius {
        element_id: String,
        radius: f64,
    },
    BringToFront {
        element_id: String,
    },
}

impl MutationCall {
    pub fn element_id(&self) -> &str {
        match self {
            MutationCall::Move { element_id, .. }
            | MutationCall::Resize { element_id, .. }
            | MutationCall::CornerRadius { element_id, .. }
            | MutationCall::BringToFront { element_id } => element_id,
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            MutationCall::Move { .. } => "move",
            MutationCall::Resize { .. } => "resize",
            MutationCall::CornerRadius { .. } => "corner_radius",
            MutationCall::BringToFront { .. } => "bring_to_front",
        }
    }
}

/// Finds the elements to arrange
#[async_trait]
pub trait CanvasDiscovery: Send + Sync {
    /// The container node itself
    async fn container(&self, container_id: &str) -> Result<CanvasNode, CanvasError>;

    /// Direct children of a container
    async fn children(&self, container_id: &str) -> Result<Vec<CanvasNode>, CanvasError>;

    /// Specific nodes by id; ids that do not exist are skipped
    async fn nodes(&self, ids: &[String]) -> Result<Vec<CanvasNode>, CanvasError>;
}

/// Applies changes to the canvas. Any call may fail independently.
#[async_trait]
pub trait CanvasMutator: Send + Sync {
    async fn apply(&self, call: &MutationCall) -> Result<(), CanvasError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_field_encoding() {
        let node: CanvasNode = serde_json::from_str(
            r#"{"id": "1:2", "name": "Rectangle 4", "type": "RECTANGLE",
                "x": 10, "y": 20, "width": 60, "height": 60}"#,
        )
        .unwrap();
        assert_eq!(node.bounds(), BoundingBox::new(10.0, 20.0, 60.0, 60.0));
        assert_eq!(node.kind(), ElementKind::Rectangle);
        assert_eq!(node.label(), None);
    }

    #[test]
    fn test_nested_bounding_box_encoding() {
        let node: CanvasNode = serde_json::from_str(
            r#"{"id": "1:3", "name": "seven", "type": "TEXT", "characters": "7",
                "absoluteBoundingBox": {"x": 30, "y": 40, "width": 12, "height": 18}}"#,
        )
        .unwrap();
        assert_eq!(node.bounds(), BoundingBox::new(30.0, 40.0, 12.0, 18.0));
        assert_eq!(node.kind(), ElementKind::Text);
        assert_eq!(node.label(), Some("7".to_string()));
    }

    #[test]
    fn test_missing_size_defaults() {
        let node: CanvasNode = serde_json::from_str(r#"{"id": "x", "type": "FRAME"}"#).unwrap();
        assert_eq!(
            node.bounds(),
            BoundingBox::new(0.0, 0.0, DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)
        );
        assert_eq!(node.kind(), ElementKind::Other);
    }

    #[test]
    fn test_label_falls_back_to_meaningful_name() {
        let named = CanvasNode::new("a", "RECTANGLE").named("Submit");
        assert_eq!(named.label(), Some("Submit".to_string()));
        let generic = CanvasNode::new("b", "RECTANGLE").named("Text 12");
        assert_eq!(generic.label(), None);
        let long = CanvasNode::new("c", "RECTANGLE").named("A very long descriptive layer name");
        assert_eq!(long.label(), None);
        let blank_text = CanvasNode::new("d", "TEXT")
            .named("Equals")
            .with_characters("  ");
        assert_eq!(blank_text.label(), Some("Equals".to_string()));
    }

    #[test]
    fn test_to_element_is_container_relative() {
        let container = CanvasNode::new("frame", "FRAME")
            .at(100.0, 50.0, 300.0, 450.0)
            .as_container();
        let element = CanvasNode::new("k", "RECTANGLE")
            .at(120.0, 130.0, 60.0, 60.0)
            .to_element(&container);
        assert_eq!((element.x, element.y), (20.0, 80.0));
    }

    #[test]
    fn test_set_position_keeps_encoding() {
        let mut nested: CanvasNode = serde_json::from_str(
            r#"{"id": "n", "type": "TEXT", "boundingBox": {"x": 1, "y": 2, "width": 3, "height": 4}}"#,
        )
        .unwrap();
        nested.set_position(50.0, 60.0);
        assert_eq!(nested.x, None);
        assert_eq!(nested.bounds().x, 50.0);

        let mut direct = CanvasNode::new("d", "RECTANGLE").at(0.0, 0.0, 10.0, 10.0);
        direct.set_size(20.0, 10.0);
        assert_eq!(direct.width, Some(20.0));
    }

    #[test]
    fn test_mutation_call_accessors() {
        let call = MutationCall::BringToFront {
            element_id: "t1".to_string(),
        };
        assert_eq!(call.element_id(), "t1");
        assert_eq!(call.op_name(), "bring_to_front");
    }
}
