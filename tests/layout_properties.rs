//! Properties that hold for every scene, checked over hand-built and
//! generated inputs

use std::collections::HashSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use canvas_arranger::layout::{
    clamp_to_container, classify_roles, pair_elements, sanitize_plan, Container, Element,
    ElementKind, EngineConfig, LayoutContext, LayoutMode, LayoutParams, PlanInput,
    TemplatePlanner,
};
use canvas_arranger::{
    ArrangeReport, ArrangeRequest, Arranger, CanvasNode, CanvasSnapshot, MemoryCanvas,
    MutationCall, UiType,
};

/// Tiny deterministic generator so scenes are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (self.next() % 1000) as f64 / 1000.0 * (hi - lo)
    }
}

fn calculator_elements() -> (Vec<Element>, Container) {
    let snapshot: CanvasSnapshot =
        serde_json::from_str(include_str!("fixtures/calculator.json")).expect("fixture");
    let container = snapshot.container.as_container();
    let elements = snapshot
        .nodes
        .iter()
        .map(|n| n.to_element(&container))
        .collect();
    (elements, container)
}

fn form_elements() -> Vec<Element> {
    vec![
        Element::rect("name", 20.0, 20.0, 90.0, 30.0),
        Element::text("name-label", "Name", 30.0, 25.0, 40.0, 16.0),
        Element::rect("email", 20.0, 70.0, 90.0, 30.0),
        Element::text("email-label", "Email", 30.0, 75.0, 40.0, 16.0),
        Element::rect("ok", 20.0, 150.0, 80.0, 30.0),
        Element::text("ok-label", "Submit", 30.0, 155.0, 50.0, 16.0),
        Element::rect("no", 120.0, 150.0, 80.0, 30.0),
        Element::text("no-label", "Cancel", 130.0, 155.0, 50.0, 16.0),
    ]
}

fn menu_elements() -> Vec<Element> {
    ["Open file", "Recent files", "Settings", "Export", "Quit now", "Help"]
        .iter()
        .enumerate()
        .map(|(i, label)| {
            Element::rect(format!("item-{}", i), 10.0, 10.0 + i as f64 * 45.0, 120.0, 40.0)
                .with_label(*label)
        })
        .collect()
}

fn dashboard_elements() -> Vec<Element> {
    vec![
        Element::rect("chart-a", 10.0, 10.0, 200.0, 50.0),
        Element::rect("chart-b", 220.0, 10.0, 200.0, 50.0),
        Element::rect("refresh", 10.0, 300.0, 60.0, 40.0),
        Element::rect("filter", 80.0, 300.0, 60.0, 40.0),
        Element::rect("share", 150.0, 300.0, 60.0, 40.0),
    ]
}

fn scattered_elements(seed: u64) -> Vec<Element> {
    let mut rng = Lcg(seed);
    let mut elements = Vec::new();
    for i in 0..(6 + seed as usize % 10) {
        let x = rng.range(-50.0, 400.0);
        let y = rng.range(0.0, 500.0);
        let w = rng.range(30.0, 90.0);
        let h = rng.range(30.0, 70.0);
        elements.push(Element::rect(format!("r{}", i), x, y, w, h));
        if rng.next() % 3 != 0 {
            let dx = rng.range(-40.0, w + 40.0);
            let dy = rng.range(-40.0, h + 40.0);
            elements.push(Element::text(
                format!("t{}", i),
                format!("{}", i),
                x + dx,
                y + dy,
                12.0,
                16.0,
            ));
        }
    }
    elements.push(Element::new("icon", ElementKind::Other, 5.0, 5.0, 16.0, 16.0));
    elements
}

/// Every scene under test, each with the container it lives in
fn scenes() -> Vec<(String, Vec<Element>, Container)> {
    let default_frame = Container::new(320.0, 480.0);
    let (calculator, calculator_frame) = calculator_elements();
    let mut scenes = vec![
        ("calculator".to_string(), calculator, calculator_frame),
        ("form".to_string(), form_elements(), default_frame),
        ("menu".to_string(), menu_elements(), default_frame),
        ("dashboard".to_string(), dashboard_elements(), Container::new(440.0, 400.0)),
    ];
    for seed in 1..=12 {
        scenes.push((
            format!("scattered-{}", seed),
            scattered_elements(seed),
            default_frame,
        ));
    }
    scenes
}

fn plan_input(elements: &[Element], container: &Container, params: &LayoutParams) -> PlanInput {
    let config = EngineConfig::default();
    let partition = classify_roles(elements, &config.roles);
    let pairing = pair_elements(&partition, &config.pairing);
    PlanInput::build(
        &partition,
        &pairing,
        LayoutContext::new(params, container),
        &config,
    )
}

#[test]
fn test_pairing_is_injective() {
    let config = EngineConfig::default();
    for (name, elements, _) in scenes() {
        let partition = classify_roles(&elements, &config.roles);
        let pairing = pair_elements(&partition, &config.pairing);

        let rects: HashSet<&str> = pairing.pairs.iter().map(|p| p.rectangle_id.as_str()).collect();
        let texts: HashSet<&str> = pairing.pairs.iter().map(|p| p.text_id.as_str()).collect();
        assert_eq!(rects.len(), pairing.pairs.len(), "{}: rectangle paired twice", name);
        assert_eq!(texts.len(), pairing.pairs.len(), "{}: text paired twice", name);
        assert_eq!(
            pairing.pairs.len() + pairing.unpaired_rectangles.len(),
            partition.rectangle_count(),
            "{}: rectangles lost during pairing",
            name
        );
        assert_eq!(
            pairing.pairs.len() + pairing.unpaired_texts.len(),
            partition.texts.len(),
            "{}: texts lost during pairing",
            name
        );
    }
}

#[test]
fn test_template_plan_covers_every_element_once() {
    for mode in [LayoutMode::Grid, LayoutMode::Row, LayoutMode::Column] {
        let params = LayoutParams::default().with_layout(mode);
        for (name, elements, container) in scenes() {
            let input = plan_input(&elements, &container, &params);
            let plan = TemplatePlanner::new().plan_sync(&input);

            let ids: Vec<&str> = plan.iter().map(|a| a.element_id.as_str()).collect();
            let unique: HashSet<&str> = ids.iter().copied().collect();
            assert_eq!(ids.len(), unique.len(), "{} ({}): duplicate ids", name, mode);

            let expected: HashSet<&str> = elements.iter().map(|e| e.id.as_str()).collect();
            assert_eq!(unique, expected, "{} ({}): coverage mismatch", name, mode);

            // Nothing for sanitizing to remove
            assert_eq!(sanitize_plan(plan.clone(), &input.element_ids()), plan);
        }
    }
}

#[test]
fn test_clamped_plan_stays_inside_horizontally() {
    let margin = EngineConfig::default().planner.margin;
    let params = LayoutParams::default().with_layout(LayoutMode::Row);
    for (name, elements, container) in scenes() {
        let input = plan_input(&elements, &container, &params);
        let sizes = input.sizes();
        let plan = TemplatePlanner::new().plan_sync(&input);
        let clamped = clamp_to_container(&plan, &sizes, container.width, margin);

        for (before, after) in plan.iter().zip(&clamped) {
            assert_eq!(before.y, after.y, "{}: clamp moved y", name);
            let width = after.width.unwrap_or(sizes[&after.element_id].0);
            if width <= container.width - 2.0 * margin {
                assert!(
                    after.x >= margin && after.x + width <= container.width - margin + 1e-9,
                    "{}: {} at x={} (w={}) escapes the container",
                    name,
                    after.element_id,
                    after.x,
                    width
                );
            }
        }
    }
}

#[test]
fn test_classification_and_planning_are_pure() {
    let params = LayoutParams::default();
    for (name, elements, container) in scenes() {
        let first = plan_input(&elements, &container, &params);
        let second = plan_input(&elements, &container, &params);
        assert_eq!(first, second, "{}: classification differs between runs", name);
        assert_eq!(
            TemplatePlanner::new().plan_sync(&first),
            TemplatePlanner::new().plan_sync(&second),
            "{}: plan differs between runs",
            name
        );
    }
}

/// Canvas node standing in for an element, inside a frame at the origin
fn node_for(element: &Element) -> CanvasNode {
    let node_type = match element.kind {
        ElementKind::Rectangle => "RECTANGLE",
        ElementKind::Text => "TEXT",
        ElementKind::Other => "VECTOR",
    };
    let node = CanvasNode::new(&element.id, node_type).at(
        element.x,
        element.y,
        element.width,
        element.height,
    );
    match (&element.kind, &element.label) {
        (ElementKind::Text, Some(label)) => node.with_characters(label),
        (_, Some(label)) => node.named(label),
        (_, None) => node,
    }
}

fn canvas_for(elements: &[Element], container: &Container) -> MemoryCanvas {
    MemoryCanvas::new(
        CanvasNode::new("frame", "FRAME").at(0.0, 0.0, container.width, container.height),
        elements.iter().map(node_for).collect(),
    )
}

/// Two panels too wide to sit side by side, over a single row of keys
fn crowded_dashboard_elements() -> Vec<Element> {
    let mut elements = vec![
        Element::rect("p1", 0.0, 0.0, 300.0, 80.0),
        Element::rect("p2", 320.0, 0.0, 300.0, 80.0),
    ];
    for i in 0..3 {
        elements.push(Element::rect(
            format!("b{}", i),
            i as f64 * 70.0,
            300.0,
            60.0,
            40.0,
        ));
    }
    elements
}

fn generic_elements() -> Vec<Element> {
    vec![
        Element::rect("a", 0.0, 0.0, 60.0, 60.0),
        Element::rect("b", 300.0, 0.0, 60.0, 60.0),
        Element::rect("c", 0.0, 200.0, 60.0, 60.0),
        Element::new("icon", ElementKind::Other, 250.0, 400.0, 16.0, 16.0),
    ]
}

/// One canvas per interface archetype, with the parameters to arrange it by
fn archetype_canvases() -> Vec<(UiType, MemoryCanvas, ArrangeRequest)> {
    let snapshot: CanvasSnapshot =
        serde_json::from_str(include_str!("fixtures/calculator.json")).expect("fixture");
    let default_frame = Container::new(320.0, 480.0);
    let frame = |params: LayoutParams| ArrangeRequest::container("frame").with_params(params);
    vec![
        (
            UiType::Calculator,
            MemoryCanvas::from_snapshot(snapshot),
            ArrangeRequest::container("calculator")
                .with_params(LayoutParams::default().with_start(20.0, 80.0)),
        ),
        (
            UiType::Form,
            canvas_for(&form_elements(), &default_frame),
            frame(LayoutParams::default()),
        ),
        (
            UiType::Menu,
            canvas_for(&menu_elements(), &default_frame),
            frame(LayoutParams::default()),
        ),
        (
            UiType::Dashboard,
            canvas_for(&crowded_dashboard_elements(), &Container::new(430.0, 500.0)),
            frame(LayoutParams::default()),
        ),
        (
            UiType::Generic,
            canvas_for(&generic_elements(), &default_frame),
            frame(LayoutParams::default()),
        ),
    ]
}

fn positions(report: &ArrangeReport) -> Vec<(String, f64, f64, Option<f64>)> {
    let mut out: Vec<(String, f64, f64, Option<f64>)> = report
        .assignments
        .iter()
        .map(|a| (a.element_id.clone(), a.x, a.y, a.width))
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

#[tokio::test]
async fn test_rearranging_twice_is_stable() {
    for (expected, canvas, request) in archetype_canvases() {
        let canvas = Arc::new(canvas);
        let arranger = Arranger::new(canvas.clone(), canvas.clone());

        let first = arranger.rearrange(&request).await.expect("first pass");
        let after_first = canvas.snapshot();
        let second = arranger.rearrange(&request).await.expect("second pass");

        assert_eq!(first.ui_type, expected, "first pass classified differently");
        assert_eq!(second.ui_type, expected, "{}: second pass reclassified", expected);
        assert_eq!(positions(&first), positions(&second), "{}: plan moved", expected);
        assert_eq!(canvas.snapshot(), after_first, "{}: canvas moved", expected);
    }
}

#[tokio::test]
async fn test_crowded_dashboard_keeps_panel_widths() {
    let canvas = Arc::new(canvas_for(
        &crowded_dashboard_elements(),
        &Container::new(430.0, 500.0),
    ));
    let report = Arranger::new(canvas.clone(), canvas.clone())
        .rearrange(&ArrangeRequest::container("frame"))
        .await
        .expect("dashboard arrangement");

    assert_eq!(report.ui_type, UiType::Dashboard);
    assert!(canvas
        .applied_calls()
        .iter()
        .all(|c| matches!(c, MutationCall::Move { .. })));
    for id in ["p1", "p2"] {
        assert_eq!(canvas.node(id).and_then(|n| n.width), Some(300.0));
    }
    // The second panel is pulled back inside the frame, the keys sit clear
    // of the panels' bottom band
    let at = |id: &str| canvas.node(id).map(|n| (n.bounds().x, n.bounds().y));
    assert_eq!(at("p2"), Some((120.0, 20.0)));
    assert_eq!(at("b0"), Some((20.0, 133.0)));
    assert!(!report.warnings.is_empty(), "overlapping panels should be reported");
}
