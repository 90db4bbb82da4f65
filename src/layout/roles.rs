//! Role classification: splits raw elements by kind and tells displays from buttons
//!
//! Roles come from population statistics only. A rectangle is a display when
//! it sits in the top band, is not in the bottom band, and is either much
//! wider than average or strongly landscape. The bottom-band gate keeps a
//! double-width key in the last row (the "0" of a calculator) from being
//! taken for a display.

use tracing::debug;

use super::config::RoleThresholds;
use super::types::{Element, ElementKind, Role};

/// Elements partitioned by kind and, for rectangles, by role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolePartition {
    pub displays: Vec<Element>,
    pub buttons: Vec<Element>,
    pub texts: Vec<Element>,
    pub others: Vec<Element>,
}

impl RolePartition {
    /// Role of a rectangle, if it is one
    pub fn role_of(&self, id: &str) -> Option<Role> {
        if self.displays.iter().any(|e| e.id == id) {
            Some(Role::Display)
        } else if self.buttons.iter().any(|e| e.id == id) {
            Some(Role::Button)
        } else {
            None
        }
    }

    pub fn rectangle_count(&self) -> usize {
        self.displays.len() + self.buttons.len()
    }
}

/// Rectangle population statistics the role gates are computed from
#[derive(Debug, Clone, Copy, PartialEq)]
struct RectStats {
    avg_width: f64,
    avg_height: f64,
    min_y: f64,
    max_y: f64,
}

impl RectStats {
    fn compute(rects: &[&Element]) -> Option<Self> {
        if rects.is_empty() {
            return None;
        }
        let n = rects.len() as f64;
        let avg_width = rects.iter().map(|r| r.width).sum::<f64>() / n;
        let avg_height = rects.iter().map(|r| r.height).sum::<f64>() / n;
        let min_y = rects.iter().map(|r| r.y).fold(f64::INFINITY, f64::min);
        let max_y = rects.iter().map(|r| r.y).fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            avg_width,
            avg_height,
            min_y,
            max_y,
        })
    }
}

fn is_display(rect: &Element, stats: &RectStats, thresholds: &RoleThresholds) -> bool {
    let in_top_band = rect.y <= stats.min_y + stats.avg_height;
    let in_bottom_band = rect.y >= stats.max_y - thresholds.bottom_band_factor * stats.avg_height;
    let wide = rect.width > thresholds.display_width_factor * stats.avg_width;
    let landscape = rect.height > 0.0 && rect.width / rect.height > thresholds.display_aspect_ratio;
    in_top_band && !in_bottom_band && (wide || landscape)
}

/// Partition elements into displays, buttons, texts and everything else.
///
/// Input order is preserved inside each group.
pub fn classify_roles(elements: &[Element], thresholds: &RoleThresholds) -> RolePartition {
    let rects: Vec<&Element> = elements.iter().filter(|e| e.is_rectangle()).collect();
    let stats = RectStats::compute(&rects);

    let mut partition = RolePartition::default();
    for element in elements {
        match element.kind {
            ElementKind::Rectangle => {
                let display = stats
                    .as_ref()
                    .is_some_and(|s| is_display(element, s, thresholds));
                if display {
                    partition.displays.push(element.clone());
                } else {
                    partition.buttons.push(element.clone());
                }
            }
            ElementKind::Text => partition.texts.push(element.clone()),
            ElementKind::Other => partition.others.push(element.clone()),
        }
    }

    debug!(
        displays = partition.displays.len(),
        buttons = partition.buttons.len(),
        texts = partition.texts.len(),
        others = partition.others.len(),
        "classified element roles"
    );
    partition
}
