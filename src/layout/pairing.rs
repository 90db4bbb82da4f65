//! Spatial pairing of rectangles with their text labels
//!
//! Each rectangle, visited in reading order, claims at most one unclaimed
//! text through three passes of widening tolerance:
//!
//! 1. **Tight**: the text's center lies inside the rectangle grown by a small
//!    fixed tolerance.
//! 2. **Expanded**: the tolerance scales with the rectangle's own size, for
//!    labels placed off-center.
//! 3. **Nearest**: the closest remaining text whose center distance is below
//!    a multiple of the rectangle's larger side.
//!
//! Displays are paired before buttons, so a display's label can never be
//! claimed by a key. Pairing never fails; whatever is left over becomes
//! standalone.

use tracing::debug;

use super::config::PairingThresholds;
use super::roles::RolePartition;
use super::types::{Element, Pair};

/// Outcome of pairing: a partial matching plus the leftovers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pairing {
    pub pairs: Vec<Pair>,
    /// Rectangles (displays and buttons) that found no label
    pub unpaired_rectangles: Vec<String>,
    /// Texts no rectangle claimed
    pub unpaired_texts: Vec<String>,
}

impl Pairing {
    /// The text paired with a rectangle
    pub fn text_for(&self, rectangle_id: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.rectangle_id == rectangle_id)
            .map(|p| p.text_id.as_str())
    }
}

/// Which pass produced a match, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchPass {
    Tight,
    Expanded,
    Nearest,
}

/// Sort key that orders elements top-to-bottom, then left-to-right
fn reading_key(element: &Element, row_bucket: f64) -> (i64, f64) {
    let bucket = if row_bucket > 0.0 {
        (element.y / row_bucket).floor() as i64
    } else {
        element.y.floor() as i64
    };
    (bucket, element.x)
}

/// Sort elements into reading order. Stable for ties.
pub fn reading_order(elements: &[Element], row_bucket: f64) -> Vec<Element> {
    let mut sorted = elements.to_vec();
    sorted.sort_by(|a, b| {
        let (ra, xa) = reading_key(a, row_bucket);
        let (rb, xb) = reading_key(b, row_bucket);
        ra.cmp(&rb).then(xa.total_cmp(&xb))
    });
    sorted
}

fn find_within(rect: &Element, pool: &[&Element], dx: f64, dy: f64) -> Option<usize> {
    let zone = rect.bounds().expand(dx, dy);
    pool.iter().position(|text| zone.contains(text.center()))
}

fn find_nearest(rect: &Element, pool: &[&Element], factor: f64) -> Option<usize> {
    let center = rect.center();
    let limit = factor * rect.width.max(rect.height);
    let mut best: Option<(usize, f64)> = None;
    for (i, text) in pool.iter().enumerate() {
        let distance = center.distance(text.center());
        if distance >= limit {
            continue;
        }
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

fn claim(rect: &Element, pool: &[&Element], t: &PairingThresholds) -> Option<(usize, MatchPass)> {
    if let Some(i) = find_within(rect, pool, t.tight_tolerance, t.tight_tolerance) {
        return Some((i, MatchPass::Tight));
    }
    let dx = (rect.width * t.expanded_fraction).max(t.expanded_floor);
    let dy = (rect.height * t.expanded_fraction).max(t.expanded_floor);
    if let Some(i) = find_within(rect, pool, dx, dy) {
        return Some((i, MatchPass::Expanded));
    }
    find_nearest(rect, pool, t.nearest_factor).map(|i| (i, MatchPass::Nearest))
}

/// Pair every display, then every button, with at most one text label.
pub fn pair_elements(partition: &RolePartition, thresholds: &PairingThresholds) -> Pairing {
    let mut pool: Vec<&Element> = partition.texts.iter().collect();
    let mut pairing = Pairing::default();

    let displays = reading_order(&partition.displays, thresholds.row_bucket);
    let buttons = reading_order(&partition.buttons, thresholds.row_bucket);

    for rect in displays.iter().chain(buttons.iter()) {
        match claim(rect, &pool, thresholds) {
            Some((index, pass)) => {
                let text = pool.remove(index);
                debug!(rect = %rect.id, text = %text.id, ?pass, "paired label");
                pairing.pairs.push(Pair {
                    rectangle_id: rect.id.clone(),
                    text_id: text.id.clone(),
                });
            }
            None => pairing.unpaired_rectangles.push(rect.id.clone()),
        }
    }

    pairing.unpaired_texts = pool.iter().map(|t| t.id.clone()).collect();
    debug!(
        pairs = pairing.pairs.len(),
        unpaired_rectangles = pairing.unpaired_rectangles.len(),
        unpaired_texts = pairing.unpaired_texts.len(),
        "pairing finished"
    );
    pairing
}
