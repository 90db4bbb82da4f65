//! Core types for the arrangement engine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArrangeError;

/// A 2D point in container-relative coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A bounding box representing the spatial extent of an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Check if this bounding box contains a point (edges inclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Check if this bounding box intersects another
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Grow the box on each side by the given horizontal and vertical tolerance
    pub fn expand(&self, dx: f64, dy: f64) -> BoundingBox {
        BoundingBox::new(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }
}

/// Kind of canvas node as far as the engine cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Text,
    Other,
}

/// An immutable snapshot of one canvas element.
///
/// Coordinates are relative to the container being arranged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Element {
    pub fn new(
        id: impl Into<String>,
        kind: ElementKind,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            x,
            y,
            width,
            height,
            label: None,
        }
    }

    /// Shorthand for a rectangle element
    pub fn rect(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(id, ElementKind::Rectangle, x, y, width, height)
    }

    /// Shorthand for a text element carrying its content as label
    pub fn text(
        id: impl Into<String>,
        content: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self::new(id, ElementKind::Text, x, y, width, height).with_label(content)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn is_rectangle(&self) -> bool {
        self.kind == ElementKind::Rectangle
    }

    pub fn is_text(&self) -> bool {
        self.kind == ElementKind::Text
    }
}

/// Derived classification of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Display,
    Button,
}

/// A rectangle matched with its text label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pair {
    pub rectangle_id: String,
    pub text_id: String,
}

/// The frame that elements are arranged inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub width: f64,
    pub height: f64,
    /// Position of the container in the outer (absolute) coordinate space
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Container {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// Convert a container-relative position to absolute coordinates
    pub fn to_absolute(&self, x: f64, y: f64) -> (f64, f64) {
        (x + self.offset_x, y + self.offset_y)
    }

    /// Convert an absolute position to container-relative coordinates
    pub fn to_relative(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.offset_x, y - self.offset_y)
    }
}

/// Flow direction requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Grid,
    Row,
    Column,
}

impl FromStr for LayoutMode {
    type Err = ArrangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(LayoutMode::Grid),
            "row" => Ok(LayoutMode::Row),
            "column" | "col" => Ok(LayoutMode::Column),
            other => Err(ArrangeError::invalid_input(format!(
                "unknown layout mode '{}' (expected grid, row or column)",
                other
            ))),
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Grid => write!(f, "grid"),
            LayoutMode::Row => write!(f, "row"),
            LayoutMode::Column => write!(f, "column"),
        }
    }
}

/// Caller-supplied layout parameters, before the container is known
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    pub layout: LayoutMode,
    pub columns: usize,
    pub gap_x: f64,
    pub gap_y: f64,
    pub start_x: f64,
    pub start_y: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Grid,
            columns: 4,
            gap_x: 10.0,
            gap_y: 10.0,
            start_x: 20.0,
            start_y: 20.0,
        }
    }
}

impl LayoutParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_gap(mut self, gap_x: f64, gap_y: f64) -> Self {
        self.gap_x = gap_x;
        self.gap_y = gap_y;
        self
    }

    pub fn with_start(mut self, start_x: f64, start_y: f64) -> Self {
        self.start_x = start_x;
        self.start_y = start_y;
        self
    }

    /// Reject parameters no layout can honor
    pub fn validate(&self) -> Result<(), ArrangeError> {
        if self.columns == 0 {
            return Err(ArrangeError::invalid_input("columns must be at least 1"));
        }
        let numbers = [
            ("gapX", self.gap_x),
            ("gapY", self.gap_y),
            ("startX", self.start_x),
            ("startY", self.start_y),
        ];
        for (name, value) in numbers {
            if !value.is_finite() || value < 0.0 {
                return Err(ArrangeError::invalid_input(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Per-invocation layout configuration. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    pub layout_mode: LayoutMode,
    pub columns: usize,
    pub gap_x: f64,
    pub gap_y: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub container_width: f64,
    pub container_height: f64,
}

impl LayoutContext {
    pub fn new(params: &LayoutParams, container: &Container) -> Self {
        Self {
            layout_mode: params.layout,
            columns: params.columns.max(1),
            gap_x: params.gap_x,
            gap_y: params.gap_y,
            start_x: params.start_x,
            start_y: params.start_y,
            container_width: container.width,
            container_height: container.height,
        }
    }
}

/// Interface archetype governing which placement template applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UiType {
    Calculator,
    Form,
    Menu,
    Dashboard,
    Generic,
}

impl fmt::Display for UiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiType::Calculator => write!(f, "calculator"),
            UiType::Form => write!(f, "form"),
            UiType::Menu => write!(f, "menu"),
            UiType::Dashboard => write!(f, "dashboard"),
            UiType::Generic => write!(f, "generic"),
        }
    }
}

/// Planned position for one element.
///
/// `width` is only set when the element's effective width must change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAssignment {
    pub element_id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl PositionAssignment {
    pub fn new(element_id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            element_id: element_id.into(),
            x,
            y,
            width: None,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_edges() {
        let bb = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bb.right(), 110.0);
        assert_eq!(bb.bottom(), 70.0);
        assert_eq!(bb.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_bounding_box_contains_edges() {
        let bb = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        assert!(bb.contains(Point::new(0.0, 0.0)));
        assert!(bb.contains(Point::new(100.0, 100.0)));
        assert!(!bb.contains(Point::new(-1.0, 50.0)));
    }

    #[test]
    fn test_bounding_box_expand() {
        let bb = BoundingBox::new(10.0, 10.0, 20.0, 20.0).expand(5.0, 2.0);
        assert_eq!(bb, BoundingBox::new(5.0, 8.0, 30.0, 24.0));
    }

    #[test]
    fn test_bounding_box_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let b = BoundingBox::new(50.0, 50.0, 100.0, 100.0);
        let touching = BoundingBox::new(100.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&touching));
    }

    #[test]
    fn test_layout_mode_parse() {
        assert_eq!("Grid".parse::<LayoutMode>().unwrap(), LayoutMode::Grid);
        assert_eq!("col".parse::<LayoutMode>().unwrap(), LayoutMode::Column);
        assert!("diagonal".parse::<LayoutMode>().is_err());
    }

    #[test]
    fn test_params_validation() {
        assert!(LayoutParams::default().validate().is_ok());
        assert!(LayoutParams::default().with_columns(0).validate().is_err());
        assert!(LayoutParams::default()
            .with_gap(-1.0, 10.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_container_coordinates() {
        let c = Container::new(300.0, 450.0).with_offset(100.0, 50.0);
        assert_eq!(c.to_absolute(20.0, 80.0), (120.0, 130.0));
        assert_eq!(c.to_relative(120.0, 130.0), (20.0, 80.0));
    }

    #[test]
    fn test_assignment_serialization_omits_width() {
        let json = serde_json::to_string(&PositionAssignment::new("a", 1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"element_id":"a","x":1.0,"y":2.0}"#);
    }
}
