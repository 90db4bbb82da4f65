//! Interface archetype detection from button labels
//!
//! A pure function of the button label multiset and the display count:
//! the same inputs always give the same [`UiType`].

use tracing::debug;

use super::canonical::normalize_label;
use super::config::ArchetypeThresholds;
use super::types::UiType;

const OPERATORS: &[&str] = &["+", "-", "×", "÷", "="];
const CLEAR_KEYS: &[&str] = &["C"];

/// Action keywords that mark a form, English and Chinese
const FORM_KEYWORDS: &[&str] = &[
    "submit", "cancel", "save", "reset", "add", "delete", "提交", "取消", "保存", "重置", "添加",
    "删除",
];

fn is_digit_label(label: &str) -> bool {
    let mut chars = label.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit())
}

/// Whether a label names a form action
pub fn is_form_action(label: &str) -> bool {
    let lower = label.to_lowercase();
    FORM_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn looks_like_calculator(labels: &[String], thresholds: &ArchetypeThresholds) -> bool {
    if labels.len() < thresholds.calculator_min_buttons {
        return false;
    }
    let normalized: Vec<String> = labels.iter().map(|l| normalize_label(l)).collect();
    let has_digit = normalized.iter().any(|l| is_digit_label(l));
    let has_operator = normalized
        .iter()
        .any(|l| OPERATORS.contains(&l.as_str()) || CLEAR_KEYS.contains(&l.as_str()));
    has_digit && has_operator
}

fn mean_label_len(labels: &[String]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total: usize = labels.iter().map(|l| l.trim().chars().count()).sum();
    total as f64 / labels.len() as f64
}

/// Pick the interface archetype. First matching rule wins:
/// calculator, form, menu, dashboard, generic.
pub fn classify_ui(
    button_labels: &[String],
    display_count: usize,
    thresholds: &ArchetypeThresholds,
) -> UiType {
    let ui_type = if looks_like_calculator(button_labels, thresholds) {
        UiType::Calculator
    } else if button_labels.iter().any(|l| is_form_action(l)) {
        UiType::Form
    } else if button_labels.len() >= thresholds.menu_min_buttons
        && display_count == 0
        && mean_label_len(button_labels) > thresholds.menu_min_mean_label_len
    {
        UiType::Menu
    } else if display_count >= thresholds.dashboard_min_displays {
        UiType::Dashboard
    } else {
        UiType::Generic
    };
    debug!(%ui_type, buttons = button_labels.len(), displays = display_count, "classified interface");
    ui_type
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn classify(raw: &[&str], displays: usize) -> UiType {
        classify_ui(&labels(raw), displays, &ArchetypeThresholds::default())
    }

    #[test]
    fn test_calculator() {
        let keys = [
            "AC", "+/-", "%", "/", "7", "8", "9", "*", "4", "5", "6", "-", "1", "2", "3", "+",
            "0", ".", "=",
        ];
        assert_eq!(classify(&keys, 1), UiType::Calculator);
    }

    #[test]
    fn test_calculator_needs_ten_buttons() {
        assert_eq!(classify(&["1", "2", "+", "="], 1), UiType::Generic);
    }

    #[test]
    fn test_clear_key_counts_as_operator() {
        let keys = ["CLR", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
        assert_eq!(classify(&keys, 0), UiType::Calculator);
    }

    #[test]
    fn test_form_keywords_bilingual() {
        assert_eq!(classify(&["Name", "Email", "Submit"], 0), UiType::Form);
        assert_eq!(classify(&["姓名", "提交"], 0), UiType::Form);
        assert_eq!(classify(&["DELETE ACCOUNT"], 0), UiType::Form);
    }

    #[test]
    fn test_menu() {
        let items = ["Home", "Products", "Pricing", "About us"];
        assert_eq!(classify(&items, 0), UiType::Menu);
        // a display rules out a menu
        assert_eq!(classify(&items, 1), UiType::Generic);
    }

    #[test]
    fn test_short_labels_are_not_a_menu() {
        assert_eq!(classify(&["A", "B", "C", "D"], 0), UiType::Generic);
    }

    #[test]
    fn test_dashboard() {
        assert_eq!(classify(&["Refresh"], 2), UiType::Dashboard);
        assert_eq!(classify(&[], 3), UiType::Dashboard);
    }

    #[test]
    fn test_classification_is_pure() {
        let keys = labels(&["Save", "Load", "Quit", "Help"]);
        let thresholds = ArchetypeThresholds::default();
        let first = classify_ui(&keys, 0, &thresholds);
        let second = classify_ui(&keys, 0, &thresholds);
        assert_eq!(first, second);
        assert_eq!(first, UiType::Form);
    }
}
