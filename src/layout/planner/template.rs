//! Deterministic, archetype-driven placement
//!
//! Displays always come first, stacked at the start position. Buttons are
//! then placed by the archetype's strategy:
//!
//! - **calculator**: canonical table walk, then row-major overflow
//! - **form**: fields stacked vertically, action buttons on a final row
//! - **menu**: column-major flow
//! - **dashboard**: two-column display grid plus control rows
//! - **generic**: grid, single row or single column per layout mode

use async_trait::async_trait;

use super::super::archetype::is_form_action;
use super::super::canonical::{canonical_table, normalize_label, table_extent};
use super::super::error::PlanError;
use super::super::types::{LayoutMode, PositionAssignment, UiType};
use super::{centered_label, LayoutUnit, PlanInput, PositionPlanner, UnitKind};

/// Widths closer than this are treated as equal
const WIDTH_EPSILON: f64 = 0.5;

/// Deterministic planner: same input, same plan
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePlanner;

#[async_trait]
impl PositionPlanner for TemplatePlanner {
    async fn plan(&self, input: &PlanInput) -> Result<Vec<PositionAssignment>, PlanError> {
        Ok(self.plan_sync(input))
    }
}

/// Cell geometry shared by grid-style placements
#[derive(Debug, Clone, Copy, PartialEq)]
struct Grid {
    origin_x: f64,
    origin_y: f64,
    cell_width: f64,
    cell_height: f64,
    gap_x: f64,
    gap_y: f64,
}

impl Grid {
    fn x(&self, col: usize) -> f64 {
        self.origin_x + col as f64 * (self.cell_width + self.gap_x)
    }

    fn y(&self, row: usize) -> f64 {
        self.origin_y + row as f64 * (self.cell_height + self.gap_y)
    }

    /// Rows a unit of `height` covers, at least one
    fn rows_spanned(&self, height: f64) -> usize {
        let pitch = self.cell_height + self.gap_y;
        if pitch <= 0.0 {
            return 1;
        }
        (((height + self.gap_y) / pitch).ceil() as usize).max(1)
    }

    /// Width of a cell spanning `span` columns, gaps included
    fn span_width(&self, span: usize) -> f64 {
        let span = span.max(1) as f64;
        span * self.cell_width + (span - 1.0) * self.gap_x
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Output accumulator that places a unit and its label together
struct Placer {
    out: Vec<PositionAssignment>,
}

impl Placer {
    fn new() -> Self {
        Self { out: Vec::new() }
    }

    /// Place a unit in a box of `box_width`. Only spanning boxes and
    /// buttons too wide for their cell are resized.
    fn place_in_cell(&mut self, unit: &LayoutUnit, x: f64, y: f64, box_width: f64, span: usize) {
        let override_width = if span > 1 {
            ((box_width - unit.width()).abs() > WIDTH_EPSILON).then_some(box_width)
        } else {
            (unit.kind == UnitKind::Button && unit.width() > box_width + WIDTH_EPSILON)
                .then_some(box_width)
        };
        self.place(unit, x, y, override_width);
    }

    /// Place a unit and force its width to `width` when it differs
    fn place_with_width(&mut self, unit: &LayoutUnit, x: f64, y: f64, width: f64) {
        let override_width = ((width - unit.width()).abs() > WIDTH_EPSILON).then_some(width);
        self.place(unit, x, y, override_width);
    }

    fn place(&mut self, unit: &LayoutUnit, x: f64, y: f64, width: Option<f64>) {
        let mut assignment = PositionAssignment::new(unit.id(), x, y);
        assignment.width = width;
        self.out.push(assignment);
        let effective_width = width.unwrap_or(unit.width());
        if let Some(label) = centered_label(unit, x, y, effective_width) {
            self.out.push(label);
        }
    }

    fn finish(self) -> Vec<PositionAssignment> {
        self.out
    }
}

impl TemplatePlanner {
    pub fn new() -> Self {
        Self
    }

    /// Compute the plan synchronously. Used directly as the fallback path.
    pub fn plan_sync(&self, input: &PlanInput) -> Vec<PositionAssignment> {
        let mut placer = Placer::new();
        match input.ui_type {
            UiType::Calculator => {
                let y0 = stack_displays(input, &mut placer);
                place_calculator(input, y0, &mut placer);
            }
            UiType::Form => {
                let y0 = stack_displays(input, &mut placer);
                place_form(input, y0, &mut placer);
            }
            UiType::Menu => {
                let y0 = stack_displays(input, &mut placer);
                place_menu(input, y0, &mut placer);
            }
            UiType::Dashboard => place_dashboard(input, &mut placer),
            UiType::Generic => {
                let y0 = stack_displays(input, &mut placer);
                place_generic(input, y0, &mut placer);
            }
        }
        placer.finish()
    }
}

/// Typical button size, sampled once from the buttons themselves
fn typical_size(input: &PlanInput) -> (f64, f64) {
    let (default_w, default_h) = input.default_button_size;
    let width = median(input.buttons.iter().map(|b| b.width()).collect()).unwrap_or(default_w);
    let height = median(input.buttons.iter().map(|b| b.height()).collect()).unwrap_or(default_h);
    (width, height)
}

/// Shrink (never grow) the cell width so `columns` cells and their gaps fit.
fn fit_cell_width(width: f64, columns: usize, gap_x: f64, available: f64) -> f64 {
    let cols = columns.max(1) as f64;
    let needed = cols * width + (cols - 1.0) * gap_x;
    if needed <= available || available <= 0.0 {
        return width;
    }
    ((available - (cols - 1.0) * gap_x) / cols).max(1.0).min(width)
}

fn grid_for(input: &PlanInput, columns: usize, origin_y: f64) -> Grid {
    let ctx = &input.context;
    let (width, height) = typical_size(input);
    Grid {
        origin_x: ctx.start_x,
        origin_y,
        cell_width: fit_cell_width(width, columns, ctx.gap_x, input.available_width()),
        cell_height: height,
        gap_x: ctx.gap_x,
        gap_y: ctx.gap_y,
    }
}

/// Stack displays full-width from the start position. Returns the y where
/// buttons begin.
fn stack_displays(input: &PlanInput, placer: &mut Placer) -> f64 {
    let ctx = &input.context;
    let width = input.available_width();
    let mut y = ctx.start_y;
    for display in &input.displays {
        placer.place_with_width(display, ctx.start_x, y, width);
        y += display.height() + ctx.gap_y;
    }
    y
}

/// Fill cells row-major starting at `first_row`, wrapping at `columns`.
///
/// A non-button unit wider than a cell keeps its size and gets rows of its
/// own; the next unit starts below it.
fn pack_row_major<'a>(
    units: impl IntoIterator<Item = &'a LayoutUnit>,
    grid: &Grid,
    first_row: usize,
    columns: usize,
    placer: &mut Placer,
) {
    let columns = columns.max(1);
    let mut row = first_row;
    let mut col = 0;
    for unit in units {
        if unit.kind != UnitKind::Button && unit.width() > grid.cell_width + WIDTH_EPSILON {
            if col > 0 {
                row += 1;
                col = 0;
            }
            placer.place(unit, grid.x(0), grid.y(row), None);
            row += grid.rows_spanned(unit.height());
            continue;
        }
        placer.place_in_cell(unit, grid.x(col), grid.y(row), grid.cell_width, 1);
        col += 1;
        if col == columns {
            col = 0;
            row += 1;
        }
    }
}

fn place_calculator(input: &PlanInput, y0: f64, placer: &mut Placer) {
    let table = canonical_table(UiType::Calculator);
    let (table_rows, table_cols) = table_extent(table);
    let grid = grid_for(input, table_cols, y0);

    let normalized: Vec<String> = input
        .buttons
        .iter()
        .map(|b| normalize_label(&b.label))
        .collect();
    let mut claimed = vec![false; input.buttons.len()];

    // Pass 1: one button per canonical slot; empty slots keep their cell.
    for slot in table {
        let found = (0..input.buttons.len()).find(|&i| !claimed[i] && normalized[i] == slot.label);
        if let Some(i) = found {
            claimed[i] = true;
            placer.place_in_cell(
                &input.buttons[i],
                grid.x(slot.col),
                grid.y(slot.row),
                grid.span_width(slot.span),
                slot.span,
            );
        }
    }

    // Pass 2: everything unclaimed goes after the templated rows.
    let leftovers = input
        .buttons
        .iter()
        .zip(claimed.iter())
        .filter(|(_, claimed)| !**claimed)
        .map(|(b, _)| b)
        .chain(input.loose.iter());
    pack_row_major(leftovers, &grid, table_rows, input.context.columns, placer);
}

fn place_form(input: &PlanInput, y0: f64, placer: &mut Placer) {
    let ctx = &input.context;
    let (actions, fields): (Vec<&LayoutUnit>, Vec<&LayoutUnit>) = input
        .buttons
        .iter()
        .chain(input.loose.iter())
        .partition(|u| is_form_action(&u.label));

    let mut y = y0;
    for field in fields {
        placer.place(field, ctx.start_x, y, None);
        y += field.height() + ctx.gap_y;
    }

    // Actions share rows, wrapping after `columns` buttons.
    let columns = ctx.columns.max(1);
    for row in actions.chunks(columns) {
        let mut x = ctx.start_x;
        let mut row_height: f64 = 0.0;
        for action in row {
            placer.place(action, x, y, None);
            x += action.width() + ctx.gap_x;
            row_height = row_height.max(action.height());
        }
        y += row_height + ctx.gap_y;
    }
}

fn place_menu(input: &PlanInput, y0: f64, placer: &mut Placer) {
    let ctx = &input.context;
    let items: Vec<&LayoutUnit> = input.buttons.iter().chain(input.loose.iter()).collect();
    if items.is_empty() {
        return;
    }
    let (_, row_height) = typical_size(input);
    let row_pitch = row_height + ctx.gap_y;
    let per_column = if row_pitch > 0.0 {
        ((ctx.container_height / row_pitch).ceil() as usize).max(1)
    } else {
        items.len()
    };
    let column_width = items.iter().map(|u| u.width()).fold(0.0, f64::max);
    let column_pitch = column_width + ctx.gap_x;

    for (i, item) in items.iter().enumerate() {
        let col = i / per_column;
        let row = i % per_column;
        placer.place(
            item,
            ctx.start_x + col as f64 * column_pitch,
            y0 + row as f64 * row_pitch,
            None,
        );
    }
}

/// Panels two per row at their own width, columns pitched by the widest
/// panel. Controls start below the bottom band measured from the last panel
/// row, so the panels are still displays when the result is classified again.
fn place_dashboard(input: &PlanInput, placer: &mut Placer) {
    let ctx = &input.context;
    let widest = input.displays.iter().map(|d| d.width()).fold(0.0, f64::max);
    let pitch = widest + ctx.gap_x;

    let mut y = ctx.start_y;
    let mut last_row_y = y;
    for row in input.displays.chunks(2) {
        let mut row_height: f64 = 0.0;
        for (col, display) in row.iter().enumerate() {
            placer.place(display, ctx.start_x + col as f64 * pitch, y, None);
            row_height = row_height.max(display.height());
        }
        last_row_y = y;
        y += row_height + ctx.gap_y;
    }

    let heights: Vec<f64> = input
        .displays
        .iter()
        .chain(input.buttons.iter())
        .map(|u| u.height())
        .collect();
    let avg_height = heights.iter().sum::<f64>() / heights.len().max(1) as f64;
    let band_clear = last_row_y + input.bottom_band_factor * avg_height + 1.0;

    let grid = grid_for(input, ctx.columns, y.max(band_clear));
    let controls = input.buttons.iter().chain(input.loose.iter());
    pack_row_major(controls, &grid, 0, ctx.columns, placer);
}

fn place_generic(input: &PlanInput, y0: f64, placer: &mut Placer) {
    let ctx = &input.context;
    let units = input.buttons.iter().chain(input.loose.iter());
    match ctx.layout_mode {
        LayoutMode::Grid => {
            let grid = grid_for(input, ctx.columns, y0);
            pack_row_major(units, &grid, 0, ctx.columns, placer);
        }
        LayoutMode::Row => {
            let mut x = ctx.start_x;
            for unit in units {
                placer.place(unit, x, y0, None);
                x += unit.width() + ctx.gap_x;
            }
        }
        LayoutMode::Column => {
            let mut y = y0;
            for unit in units {
                placer.place(unit, ctx.start_x, y, None);
                y += unit.height() + ctx.gap_y;
            }
        }
    }
}
