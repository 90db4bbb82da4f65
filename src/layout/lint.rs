//! Lint checks for a finished plan.
//!
//! Runs after clamping to flag mechanical issues that are accepted rather
//! than fixed: overlapping boxes and vertical overflow (y is never clamped).
//! Lint never changes the plan.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::types::{BoundingBox, PositionAssignment};

/// A lint warning about a plan defect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintCategory {
    Overlap,
    Overflow,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Overlap => write!(f, "overlap"),
            LintCategory::Overflow => write!(f, "overflow"),
        }
    }
}

/// Run all lint checks on a plan.
///
/// `labels` are the ids of paired text labels; a label sitting on its
/// rectangle is not an overlap.
pub fn check(
    plan: &[PositionAssignment],
    sizes: &HashMap<String, (f64, f64)>,
    labels: &HashSet<&str>,
    container_height: f64,
) -> Vec<LintWarning> {
    let boxes: Vec<(&str, BoundingBox)> = plan
        .iter()
        .filter(|a| !labels.contains(a.element_id.as_str()))
        .filter_map(|a| {
            sizes.get(&a.element_id).map(|&(w, h)| {
                (
                    a.element_id.as_str(),
                    BoundingBox::new(a.x, a.y, a.width.unwrap_or(w), h),
                )
            })
        })
        .collect();

    let mut warnings = Vec::new();
    check_overlaps(&boxes, &mut warnings);
    check_overflow(&boxes, container_height, &mut warnings);
    warnings
}

fn check_overlaps(boxes: &[(&str, BoundingBox)], warnings: &mut Vec<LintWarning>) {
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            let (name_a, a) = boxes[i];
            let (name_b, b) = boxes[j];
            if a.intersects(&b) {
                let overlap_w = a.right().min(b.right()) - a.x.max(b.x);
                let overlap_h = a.bottom().min(b.bottom()) - a.y.max(b.y);
                warnings.push(LintWarning {
                    category: LintCategory::Overlap,
                    message: format!(
                        "elements \"{}\" and \"{}\" overlap by {:.0}x{:.0}px",
                        name_a, name_b, overlap_w, overlap_h
                    ),
                });
            }
        }
    }
}

fn check_overflow(
    boxes: &[(&str, BoundingBox)],
    container_height: f64,
    warnings: &mut Vec<LintWarning>,
) {
    for (name, bounds) in boxes {
        if bounds.bottom() > container_height {
            warnings.push(LintWarning {
                category: LintCategory::Overflow,
                message: format!(
                    "element \"{}\" extends {:.0}px past bottom edge of container",
                    name,
                    bounds.bottom() - container_height
                ),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(entries: &[(&str, f64, f64)]) -> HashMap<String, (f64, f64)> {
        entries
            .iter()
            .map(|(id, w, h)| (id.to_string(), (*w, *h)))
            .collect()
    }

    #[test]
    fn test_overlap_detected() {
        let plan = vec![
            PositionAssignment::new("a", 0.0, 0.0),
            PositionAssignment::new("b", 50.0, 10.0),
        ];
        let warnings = check(
            &plan,
            &sizes(&[("a", 60.0, 60.0), ("b", 60.0, 60.0)]),
            &HashSet::new(),
            500.0,
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category, LintCategory::Overlap);
        assert!(warnings[0].message.contains("10x50px"));
    }

    #[test]
    fn test_label_on_rectangle_is_not_overlap() {
        let plan = vec![
            PositionAssignment::new("r", 0.0, 0.0),
            PositionAssignment::new("t", 20.0, 20.0),
        ];
        let labels: HashSet<&str> = ["t"].into_iter().collect();
        let warnings = check(
            &plan,
            &sizes(&[("r", 60.0, 60.0), ("t", 10.0, 10.0)]),
            &labels,
            500.0,
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_vertical_overflow_reported() {
        let plan = vec![PositionAssignment::new("low", 0.0, 430.0)];
        let warnings = check(&plan, &sizes(&[("low", 60.0, 60.0)]), &HashSet::new(), 450.0);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category.to_string(), "overflow");
        assert!(warnings[0].message.contains("40px"));
    }

    #[test]
    fn test_width_override_used_for_overlap() {
        let plan = vec![
            PositionAssignment::new("zero", 0.0, 0.0).with_width(130.0),
            PositionAssignment::new("dot", 140.0, 0.0),
        ];
        let warnings = check(
            &plan,
            &sizes(&[("zero", 60.0, 60.0), ("dot", 60.0, 60.0)]),
            &HashSet::new(),
            500.0,
        );
        assert!(warnings.is_empty());
    }
}
