//! Label normalization and canonical placement tables
//!
//! Equivalent glyphs are collapsed to one canonical label before any table
//! lookup, so `*`, `x` and `X` all land on the `×` slot.

use super::types::UiType;

/// Canonical label for the backspace key
pub const BACKSPACE: &str = "⌫";

/// One cell of a canonical table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSlot {
    pub label: &'static str,
    pub row: usize,
    pub col: usize,
    /// Number of grid columns the key covers
    pub span: usize,
}

const fn slot(label: &'static str, row: usize, col: usize) -> TemplateSlot {
    TemplateSlot {
        label,
        row,
        col,
        span: 1,
    }
}

const fn wide(label: &'static str, row: usize, col: usize, span: usize) -> TemplateSlot {
    TemplateSlot {
        label,
        row,
        col,
        span,
    }
}

/// Function row, three digit rows with an operator each, then a bottom row
/// whose zero key covers two columns.
const CALCULATOR_TABLE: &[TemplateSlot] = &[
    slot("C", 0, 0),
    slot("±", 0, 1),
    slot("%", 0, 2),
    slot("÷", 0, 3),
    slot("7", 1, 0),
    slot("8", 1, 1),
    slot("9", 1, 2),
    slot("×", 1, 3),
    slot("4", 2, 0),
    slot("5", 2, 1),
    slot("6", 2, 2),
    slot("-", 2, 3),
    slot("1", 3, 0),
    slot("2", 3, 1),
    slot("3", 3, 2),
    slot("+", 3, 3),
    wide("0", 4, 0, 2),
    slot(".", 4, 2),
    slot("=", 4, 3),
];

/// Map a raw label to its canonical form. Unknown labels come back trimmed.
pub fn normalize_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let canonical = match trimmed {
        "*" | "x" | "X" | "✕" | "✖" => "×",
        "/" | "∕" => "÷",
        "−" | "–" | "—" => "-",
        "+/-" | "+-" | "±" => "±",
        "⌫" | "←" | "⬅" => BACKSPACE,
        _ => match trimmed.to_ascii_uppercase().as_str() {
            "C" | "AC" | "CE" | "CLR" => "C",
            "DEL" | "BACKSPACE" => BACKSPACE,
            _ => return trimmed.to_string(),
        },
    };
    canonical.to_string()
}

/// Canonical table for an archetype.
///
/// Only the calculator has a label-driven table; the other archetypes use
/// flow placement and get an empty table.
pub fn canonical_table(ui_type: UiType) -> &'static [TemplateSlot] {
    match ui_type {
        UiType::Calculator => CALCULATOR_TABLE,
        UiType::Form | UiType::Menu | UiType::Dashboard | UiType::Generic => &[],
    }
}

/// Rows and columns covered by a table
pub fn table_extent(table: &[TemplateSlot]) -> (usize, usize) {
    let rows = table.iter().map(|s| s.row + 1).max().unwrap_or(0);
    let cols = table.iter().map(|s| s.col + s.span).max().unwrap_or(0);
    (rows, cols)
}

/// Render a table as plain text, one line per row.
pub fn render_table(table: &[TemplateSlot]) -> String {
    let (rows, _) = table_extent(table);
    let mut lines = Vec::with_capacity(rows);
    for row in 0..rows {
        let cells: Vec<String> = table
            .iter()
            .filter(|s| s.row == row)
            .map(|s| {
                if s.span > 1 {
                    format!("{}@{}+{}", s.label, s.col, s.span)
                } else {
                    format!("{}@{}", s.label, s.col)
                }
            })
            .collect();
        lines.push(format!("row {}: {}", row, cells.join(" ")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_synonyms() {
        assert_eq!(normalize_label("*"), "×");
        assert_eq!(normalize_label("x"), "×");
        assert_eq!(normalize_label("X"), "×");
        assert_eq!(normalize_label("/"), "÷");
        assert_eq!(normalize_label("−"), "-");
    }

    #[test]
    fn test_clear_and_backspace_synonyms() {
        for raw in ["AC", "CE", "CLR", "c", " C "] {
            assert_eq!(normalize_label(raw), "C", "raw label {:?}", raw);
        }
        for raw in ["⌫", "DEL", "del", "←"] {
            assert_eq!(normalize_label(raw), BACKSPACE, "raw label {:?}", raw);
        }
        assert_eq!(normalize_label("+/-"), "±");
        assert_eq!(normalize_label("+-"), "±");
    }

    #[test]
    fn test_unknown_labels_pass_through() {
        assert_eq!(normalize_label(" Submit "), "Submit");
        assert_eq!(normalize_label("7"), "7");
    }

    #[test]
    fn test_calculator_extent() {
        assert_eq!(table_extent(canonical_table(UiType::Calculator)), (5, 4));
        assert_eq!(table_extent(canonical_table(UiType::Menu)), (0, 0));
    }

    #[test]
    fn test_every_calculator_label_is_canonical() {
        for slot in canonical_table(UiType::Calculator) {
            assert_eq!(normalize_label(slot.label), slot.label);
        }
    }
}
