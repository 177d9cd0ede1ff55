//! WASM bindings for the orbital-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Everything crosses the boundary as JSON strings; failures come back as
//! `{ "error": { "message": ... } }` and are echoed to the console.

use log::error;
use serde::Serialize;
use serde_json::{to_string, Value};
use wasm_bindgen::prelude::*;

use crate::error::{OrbitError, Result};
use crate::layout::{layout_nodes, Frame, LayoutConfig, Viewport};
use crate::logging;
use crate::model::{load_seed, Node, NodeId, NodeSet, PointF, Status};
use crate::output::MapOutput;
use crate::progress::TaskDraft;
use crate::reparent::resolve_reparenting;
use crate::session::MapSession;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

fn error_json(e: &OrbitError) -> String {
    error!("{e}");
    to_string(&MapOutput::from_error(e.to_string()))
        .unwrap_or_else(|_| r#"{"error":{"message":"serialization failed"}}"#.to_string())
}

fn to_json<T: Serialize>(value: &T) -> String {
    match to_string(value) {
        Ok(s) => s,
        Err(e) => error_json(&OrbitError::from(e)),
    }
}

/// Empty input means "all defaults".
fn parse_config(config: &str) -> Result<LayoutConfig> {
    if config.trim().is_empty() {
        return Ok(LayoutConfig::default());
    }
    let config: LayoutConfig = serde_json::from_str(config)?;
    config.validate()?;
    Ok(config)
}

fn build_session(seed: &str, config: &str, width: f64, height: f64) -> Result<MapSession> {
    let nodes = load_seed(seed)?;
    let config = parse_config(config)?;
    MapSession::new(nodes, Viewport::new(width, height), config)
}

/// Current browser window size, if there is a window.
fn window_viewport() -> Option<Viewport> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(Viewport::new(width, height))
}

/// One orbital map: the seed node set plus viewport, zoom, selection and drag.
#[wasm_bindgen]
pub struct OrbitalMap {
    session: MapSession,
}

#[wasm_bindgen]
impl OrbitalMap {
    /// Build from a seed JSON array and an optional config object (`""` for defaults).
    /// Throws the error JSON when the seed is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: &str, config: &str, width: f64, height: f64) -> std::result::Result<OrbitalMap, JsValue> {
        match build_session(seed, config, width, height) {
            Ok(session) => Ok(OrbitalMap { session }),
            Err(e) => Err(JsValue::from_str(&error_json(&e))),
        }
    }

    /// Full render snapshot as JSON.
    pub fn snapshot(&self) -> String {
        to_json(&self.session.snapshot())
    }

    /// The committed node set, e.g. for the host to persist.
    pub fn nodes(&self) -> String {
        to_json(&self.session.nodes().nodes())
    }

    pub fn resize(&mut self, width: f64, height: f64) -> String {
        self.session.resize(width, height);
        self.snapshot()
    }

    /// Resize to the browser window; a no-op outside a browser.
    pub fn fit_window(&mut self) -> String {
        if let Some(vp) = window_viewport() {
            self.session.resize(vp.width, vp.height);
        }
        self.snapshot()
    }

    pub fn zoom_in(&mut self) -> String {
        self.session.zoom_in();
        self.snapshot()
    }

    pub fn zoom_out(&mut self) -> String {
        self.session.zoom_out();
        self.snapshot()
    }

    /// Select a node by id; an empty id clears the selection.
    pub fn select(&mut self, id: &str) -> String {
        let id = (!id.is_empty()).then(|| NodeId::from(id));
        let result = self.session.select(id.as_ref());
        self.render(result)
    }

    pub fn pointer_down(&mut self, id: &str) -> String {
        let result = self.session.pointer_down(&NodeId::from(id));
        self.render(result)
    }

    /// Snapshot with the dragged node under the cursor and the snap preview.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        self.session.pointer_move(PointF::new(x, y));
        self.snapshot()
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> String {
        let result = self.session.pointer_up(PointF::new(x, y)).map(|_| ());
        self.render(result)
    }

    pub fn cancel_drag(&mut self) -> String {
        self.session.cancel_drag();
        self.snapshot()
    }

    /// Replace a whole node (JSON object in seed shape).
    pub fn update_node(&mut self, node: &str) -> String {
        let result = serde_json::from_str::<Node>(node)
            .map_err(OrbitError::from)
            .and_then(|n| self.session.update_node(n));
        self.render(result)
    }

    /// Add a task to the selected node, or overwrite task `editing` when non-empty.
    pub fn save_task(&mut self, draft: &str, editing: &str) -> String {
        let editing = (!editing.is_empty()).then_some(editing);
        let result = serde_json::from_str::<TaskDraft>(draft)
            .map_err(OrbitError::from)
            .and_then(|d| self.session.save_task(d, editing));
        self.render(result)
    }

    pub fn remove_task(&mut self, task_id: &str) -> String {
        let result = self.session.remove_task(task_id);
        self.render(result)
    }

    pub fn set_progress(&mut self, value: f64) -> String {
        let result = self.session.set_progress(value);
        self.render(result)
    }

    pub fn set_spent(&mut self, value: f64) -> String {
        let result = self.session.set_spent(value);
        self.render(result)
    }

    /// `status` is one of `on-track`, `at-risk`, `delayed`.
    pub fn set_status(&mut self, status: &str) -> String {
        let result = serde_json::from_value::<Status>(Value::String(status.to_string()))
            .map_err(OrbitError::from)
            .and_then(|s| self.session.set_status(s));
        self.render(result)
    }

    pub fn link_selected(&mut self, parent_id: &str) -> String {
        let result = self.session.link_selected(&NodeId::from(parent_id)).map(|_| ());
        self.render(result)
    }

    pub fn unlink_selected(&mut self) -> String {
        let result = self.session.unlink_selected().map(|_| ());
        self.render(result)
    }

    pub fn delete_node(&mut self, id: &str) -> String {
        let result = self.session.delete_node(&NodeId::from(id)).map(|_| ());
        self.render(result)
    }
}

impl OrbitalMap {
    /// Snapshot after an edit. A rejected edit leaves the map as it was and
    /// carries the error alongside.
    fn render(&self, result: Result<()>) -> String {
        let mut output = self.session.snapshot();
        if let Err(e) = result {
            error!("{e}");
            output.error = MapOutput::from_error(e.to_string()).error;
        }
        to_json(&output)
    }
}

/// Positions, ring anchors and radii for a node array, without a session.
/// `frame` is `{ "center": {x, y}, "scale": s, "phase"?: radians }`.
#[wasm_bindgen]
pub fn compute_layout(nodes: &str, frame: &str, config: &str) -> String {
    let compute = || -> Result<String> {
        let nodes = NodeSet::from_nodes(serde_json::from_str(nodes)?);
        let frame: Frame = serde_json::from_str(frame)?;
        let config = parse_config(config)?;
        Ok(to_json(&layout_nodes(&nodes, &frame, &config)))
    };
    compute().unwrap_or_else(|e| error_json(&e))
}

/// Mutation JSON for dropping `node_id` at (x, y), or `null` when nothing changes.
#[wasm_bindgen]
pub fn resolve_drop(nodes: &str, node_id: &str, x: f64, y: f64, frame: &str, config: &str) -> String {
    let resolve = || -> Result<String> {
        let nodes = NodeSet::from_nodes(serde_json::from_str(nodes)?);
        let frame: Frame = serde_json::from_str(frame)?;
        let config = parse_config(config)?;
        let id = NodeId::from(node_id);
        let dragged = nodes.get(&id).ok_or(OrbitError::UnknownNode(id.clone()))?;
        let mutation = resolve_reparenting(dragged, PointF::new(x, y), &nodes, &frame, &config);
        Ok(to_json(&mutation))
    };
    resolve().unwrap_or_else(|e| error_json(&e))
}

/// Route `log` records to the browser console. `level` is a `log` level name
/// (`error` .. `trace`, or `off`).
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    logging::init(logging::parse_level(level));
}

/// `{ "width", "height" }` of the browser window, or the default viewport
/// when there is none.
#[wasm_bindgen]
pub fn viewport_from_window() -> String {
    to_json(&window_viewport().unwrap_or_default())
}
