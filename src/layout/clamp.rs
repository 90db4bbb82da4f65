//! Horizontal boundary clamping
//!
//! Only x is clamped. Vertical overflow is accepted: squeezing rows together
//! to fit would make elements overlap, which looks worse than running past
//! the bottom edge.

use std::collections::HashMap;

use super::types::PositionAssignment;

/// Keep every element with a known size inside `[margin, container_width - margin]`.
///
/// The width used is the assignment's override if present, else the looked-up
/// width. Elements missing from `sizes` pass through unchanged.
pub fn clamp_to_container(
    plan: &[PositionAssignment],
    sizes: &HashMap<String, (f64, f64)>,
    container_width: f64,
    margin: f64,
) -> Vec<PositionAssignment> {
    plan.iter()
        .map(|assignment| match sizes.get(&assignment.element_id) {
            Some(&(width, _)) => {
                let width = assignment.width.unwrap_or(width);
                let max_x = container_width - width - margin;
                PositionAssignment {
                    x: assignment.x.min(max_x).max(margin),
                    ..assignment.clone()
                }
            }
            None => assignment.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes() -> HashMap<String, (f64, f64)> {
        [("a", (60.0, 60.0)), ("wide", (60.0, 60.0))]
            .into_iter()
            .map(|(id, size)| (id.to_string(), size))
            .collect()
    }

    #[test]
    fn test_right_overflow_pulled_in() {
        let out = clamp_to_container(
            &[PositionAssignment::new("a", 280.0, 10.0)],
            &sizes(),
            300.0,
            10.0,
        );
        assert_eq!(out, vec![PositionAssignment::new("a", 230.0, 10.0)]);
    }

    #[test]
    fn test_left_overflow_pushed_to_margin() {
        let out = clamp_to_container(
            &[PositionAssignment::new("a", -40.0, 10.0)],
            &sizes(),
            300.0,
            10.0,
        );
        assert_eq!(out[0].x, 10.0);
    }

    #[test]
    fn test_y_never_changes() {
        let out = clamp_to_container(
            &[PositionAssignment::new("a", 20.0, 9000.0)],
            &sizes(),
            300.0,
            10.0,
        );
        assert_eq!(out[0].y, 9000.0);
    }

    #[test]
    fn test_width_override_is_respected() {
        let out = clamp_to_container(
            &[PositionAssignment::new("wide", 200.0, 0.0).with_width(130.0)],
            &sizes(),
            300.0,
            10.0,
        );
        assert_eq!(out[0], PositionAssignment::new("wide", 160.0, 0.0).with_width(130.0));
    }

    #[test]
    fn test_unknown_ids_pass_through() {
        let input = [PositionAssignment::new("ghost", 999.0, -5.0)];
        assert_eq!(clamp_to_container(&input, &sizes(), 300.0, 10.0), input.to_vec());
    }
}
