//! Core of the orbital project map.
//!
//! Nodes (initiatives, projects, sub-tasks) form a solar system: one sun,
//! planets orbiting it, moons orbiting planets or other moons. This crate
//! computes where every body sits, decides how a drag-and-drop reparents a
//! node, rolls task progress up into its node, and exposes all of it to the
//! React frontend through wasm-bindgen.

pub mod error;
pub mod layout;
pub mod logging;
pub mod model;
pub mod output;
pub mod progress;
pub mod reparent;
pub mod session;
mod wasm;

pub use error::{OrbitError, Result};
pub use layout::{compute_position, layout_nodes, Frame, LayoutConfig, LayoutResult, Viewport};
pub use model::{load_seed, Node, NodeId, NodeKind, NodeSet, ParentRef, PointF};
pub use reparent::{preview_reparenting, resolve_reparenting, Mutation, SnapPreview};
pub use session::{DragState, MapSession};
pub use wasm::{compute_layout, init_logging, resolve_drop, viewport_from_window, OrbitalMap};
