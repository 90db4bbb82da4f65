//! Canvas Arranger - layout inference and arrangement for design canvases
//!
//! Given the rectangles and text labels inside a frame, this library works
//! out which rectangles are displays and which are buttons, pairs each
//! rectangle with its label, recognises the kind of interface (calculator,
//! form, menu, dashboard) and computes a tidy arrangement, either from a
//! canonical template or from an external decision maker.
//!
//! # Example
//!
//! ```rust
//! use canvas_arranger::{plan_new_elements, Container, EngineConfig, LayoutParams, NewElementSpec};
//!
//! let keys: Vec<NewElementSpec> = ["7", "8", "9", "×", "4", "5", "6", "-", "1", "2", "3", "+"]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, label)| NewElementSpec::button(format!("key-{}", i), *label))
//!     .collect();
//! let placed = plan_new_elements(
//!     &keys,
//!     &LayoutParams::default(),
//!     &Container::new(300.0, 450.0),
//!     &EngineConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(placed.len(), keys.len());
//! ```

pub mod arrange;
pub mod canvas;
pub mod error;
pub mod layout;

pub use arrange::{
    plan_new_elements, ArrangeReport, ArrangeRequest, Arranger, NewElementPlacement,
    NewElementSpec, Scope,
};
pub use canvas::{
    BatchReport, CanvasDiscovery, CanvasError, CanvasMutator, CanvasNode, CanvasSnapshot,
    MemoryCanvas, MutationCall,
};
pub use error::ArrangeError;
pub use layout::{
    Container, DecisionMaker, Element, ElementKind, EngineConfig, LayoutMode, LayoutParams,
    PlanError, PlanSource, PositionAssignment, UiType,
};
