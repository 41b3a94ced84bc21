//! Incremental graph renderer.
//!
//! Consumes position updates from either layout path and redraws a memory
//! graph onto a host-provided surface: edges first, then per-node filled
//! circles with a strength-scaled glow, then labels for the strongest nodes.
//! Hit-testing and hover/click interaction are exposed back to the host.
//!
//! The drawing backend is abstracted behind [`DrawSurface`]; the crate ships
//! [`RecordingSurface`], a draw-command log that tests assert against and
//! that hosts can replay into a platform canvas.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::camera::{Bounds, Camera};
use crate::cluster::ClusterGroup;
use crate::model::{colors, node_radius, Edge, MemoryNode, PositionedNode};

/// Nodes stronger than this get a visible text label
const LABEL_STRENGTH_THRESHOLD: f32 = 0.5;

/// Character budget for node labels
const LABEL_MAX_CHARS: usize = 18;

/// Label font size in pixels
const LABEL_SIZE: f32 = 11.0;

/// Radius multiplier while hovered
const HOVER_SCALE: f32 = 1.3;

/// Alpha multiplier for non-highlighted nodes while a highlight is active
const DIM_FACTOR: f32 = 0.25;

/// Glow disc radius relative to the node body
const GLOW_SCALE: f32 = 1.8;

/// Renderer misuse errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// An operation that draws was called before `init` (or after `destroy`)
    #[error("renderer is not initialized")]
    NotInitialized,
}

/// One recorded drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: [f32; 4],
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: [f32; 4],
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: [f32; 4],
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: [f32; 4],
    },
}

/// Drawing backend owned by the renderer.
///
/// Implementations wrap whatever the host actually draws with. `clear`
/// begins a new frame; the other calls paint in order within that frame.
pub trait DrawSurface {
    fn clear(&mut self, color: [f32; 4]);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: [f32; 4]);
    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: [f32; 4]);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: [f32; 4]);
}

/// A [`DrawSurface`] that records the current frame's commands.
///
/// `clear` starts a fresh frame, so after any redraw the log holds exactly
/// one frame's worth of commands.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the most recent frame, in draw order
    pub fn frame(&self) -> &[DrawCommand] {
        &self.commands
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self, color: [f32; 4]) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: [f32; 4]) {
        self.commands.push(DrawCommand::Circle { x, y, radius, color });
    }

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: [f32; 4]) {
        self.commands.push(DrawCommand::Line { x1, y1, x2, y2, width, color });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: [f32; 4]) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            size,
            color,
        });
    }
}

/// Callback invoked with a node id on pointer-down over that node
pub type NodeClickHandler = Box<dyn FnMut(&str) + Send>;

/// Per-node drawable state, updated in place across ticks
#[derive(Debug, Clone)]
struct NodeDrawable {
    x: f32,
    y: f32,
    radius: f32,
    color: [f32; 4],
    label: String,
    strength: f32,
    /// Set once a layout pass has placed this node; undrawn until then
    positioned: bool,
}

/// Incremental renderer for a memory graph.
///
/// Owns its surface and drawable handles exclusively; no other component
/// mutates them. `destroy` releases the surface, after which `init` may be
/// called again.
pub struct GraphRenderer<S: DrawSurface> {
    surface: Option<S>,
    camera: Camera,
    edges: Vec<Edge>,
    /// Id-keyed drawable arena; entries live from `set_data` to the next
    /// `set_data` or `destroy`
    drawables: HashMap<String, NodeDrawable>,
    /// Stable draw order (input order), since the map iterates arbitrarily
    draw_order: Vec<String>,
    highlighted: Option<String>,
    hovered: Option<String>,
    on_node_click: Option<NodeClickHandler>,
}

impl<S: DrawSurface> GraphRenderer<S> {
    /// Renderer with no surface attached; call [`GraphRenderer::init`] next
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            surface: None,
            camera: Camera::new(width, height),
            edges: Vec::new(),
            drawables: HashMap::new(),
            draw_order: Vec::new(),
            highlighted: None,
            hovered: None,
            on_node_click: None,
        }
    }

    /// Attach a drawing surface and click callback.
    ///
    /// Safe to call again after [`GraphRenderer::destroy`].
    pub fn init(&mut self, surface: S, on_node_click: NodeClickHandler) {
        self.surface = Some(surface);
        self.on_node_click = Some(on_node_click);
        debug!("renderer initialized");
    }

    /// Release the surface and all drawable handles.
    pub fn destroy(&mut self) {
        self.surface = None;
        self.on_node_click = None;
        self.drawables.clear();
        self.draw_order.clear();
        self.edges.clear();
        self.highlighted = None;
        self.hovered = None;
        debug!("renderer destroyed");
    }

    /// Whether a surface is currently attached
    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    /// Borrow the attached surface (tests read recorded frames through this)
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Replace the node/edge set, rebuilding the drawable arena.
    ///
    /// Drawables start unpositioned and are not drawn until the first
    /// position update places them. Colors default to the layer encoding.
    pub fn set_data(&mut self, nodes: &[MemoryNode], edges: &[Edge]) {
        self.drawables.clear();
        self.draw_order.clear();
        for node in nodes {
            self.drawables.insert(
                node.id.clone(),
                NodeDrawable {
                    x: 0.0,
                    y: 0.0,
                    radius: node_radius(node.strength),
                    color: node.layer.color(),
                    label: truncate_label(&node.label),
                    strength: node.strength,
                    positioned: false,
                },
            );
            self.draw_order.push(node.id.clone());
        }
        self.edges = edges.to_vec();
        self.highlighted = None;
        self.hovered = None;
        debug!(nodes = nodes.len(), edges = edges.len(), "renderer data set");
    }

    /// Recolor drawables by cluster assignment (clustering mode)
    pub fn apply_cluster_colors(&mut self, clusters: &[ClusterGroup]) {
        for cluster in clusters {
            for id in &cluster.members {
                if let Some(drawable) = self.drawables.get_mut(id) {
                    drawable.color = cluster.color;
                }
            }
        }
    }

    /// Apply a position snapshot and redraw.
    ///
    /// Each snapshot is authoritative: it fully replaces prior positions for
    /// the ids it carries. Ids not in the current data set are ignored.
    pub fn update_positions(&mut self, positions: &[PositionedNode]) -> Result<(), RenderError> {
        for pos in positions {
            if let Some(drawable) = self.drawables.get_mut(&pos.id) {
                drawable.x = pos.x;
                drawable.y = pos.y;
                drawable.positioned = true;
            }
        }
        self.redraw()
    }

    /// Set or clear the highlighted node and redraw
    pub fn highlight_node(&mut self, id: Option<&str>) -> Result<(), RenderError> {
        self.highlighted = id.map(str::to_string);
        self.redraw()
    }

    /// Pointer press at canvas coordinates.
    ///
    /// If a node is hit, the click callback fires with its id and `true` is
    /// returned so the host does not also treat this as a background click
    /// (background clicks typically deselect).
    pub fn pointer_down(&mut self, canvas_x: f32, canvas_y: f32) -> bool {
        let Some(id) = self.node_at(canvas_x, canvas_y) else {
            return false;
        };
        if let Some(handler) = self.on_node_click.as_mut() {
            handler(&id);
        }
        true
    }

    /// Pointer motion at canvas coordinates; updates hover emphasis
    pub fn pointer_move(&mut self, canvas_x: f32, canvas_y: f32) -> Result<(), RenderError> {
        let hit = self.node_at(canvas_x, canvas_y);
        if hit != self.hovered {
            self.hovered = hit;
            self.redraw()?;
        }
        Ok(())
    }

    /// Topmost positioned node under the given canvas point
    pub fn node_at(&self, canvas_x: f32, canvas_y: f32) -> Option<String> {
        let (x, y) = self.camera.to_layout(canvas_x, canvas_y);
        // Later nodes draw on top, so hit-test in reverse draw order
        for id in self.draw_order.iter().rev() {
            let drawable = &self.drawables[id];
            if !drawable.positioned {
                continue;
            }
            let dx = x - drawable.x;
            let dy = y - drawable.y;
            if dx * dx + dy * dy <= drawable.radius * drawable.radius {
                return Some(id.clone());
            }
        }
        None
    }

    /// Track a canvas size change; the host follows up with a fresh layout
    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    /// Pan the view and redraw
    pub fn pan(&mut self, dx: f32, dy: f32) -> Result<(), RenderError> {
        self.camera.pan(dx, dy);
        self.redraw()
    }

    /// Zoom the view and redraw
    pub fn zoom(&mut self, factor: f32) -> Result<(), RenderError> {
        self.camera.zoom_by(factor);
        self.redraw()
    }

    /// Start an animated fit of all positioned nodes into view
    pub fn fit_to_nodes(&mut self, padding: f32) {
        let mut bounds = Bounds::empty();
        for drawable in self.drawables.values() {
            if drawable.positioned {
                bounds.include_circle(drawable.x, drawable.y, drawable.radius);
            }
        }
        self.camera.fit_to_bounds(&bounds, padding);
    }

    /// Advance the fit animation and redraw if it moved; returns true while
    /// animating
    pub fn step_animation(&mut self) -> Result<bool, RenderError> {
        if self.camera.step_animation() {
            self.redraw()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Repaint the whole frame from current drawable state.
    ///
    /// With no positioned nodes this paints the cleared background only — a
    /// neutral "nothing to display" frame, never an error.
    pub fn redraw(&mut self) -> Result<(), RenderError> {
        let surface = self.surface.as_mut().ok_or(RenderError::NotInitialized)?;
        surface.clear(colors::BACKGROUND);

        // Edges behind nodes; skip any with an unplaced or unknown endpoint
        for edge in &self.edges {
            let (Some(source), Some(target)) =
                (self.drawables.get(&edge.source), self.drawables.get(&edge.target))
            else {
                continue;
            };
            if !source.positioned || !target.positioned {
                continue;
            }
            let (x1, y1) = self.camera.to_canvas(source.x, source.y);
            let (x2, y2) = self.camera.to_canvas(target.x, target.y);
            surface.stroke_line(x1, y1, x2, y2, 1.0, edge.kind.color());
        }

        // Node bodies with glow, then labels on top
        for id in &self.draw_order {
            let drawable = &self.drawables[id];
            if !drawable.positioned {
                continue;
            }
            let (cx, cy) = self.camera.to_canvas(drawable.x, drawable.y);
            let mut radius = drawable.radius * self.camera.zoom;
            if self.hovered.as_deref() == Some(id.as_str()) {
                radius *= HOVER_SCALE;
            }

            let dimmed = self
                .highlighted
                .as_deref()
                .is_some_and(|h| h != id.as_str());
            let alpha = if dimmed { DIM_FACTOR } else { 1.0 };

            let mut glow = drawable.color;
            glow[3] *= 0.3 * drawable.strength.clamp(0.0, 1.0) * alpha;
            surface.fill_circle(cx, cy, radius * GLOW_SCALE, glow);

            let mut body = drawable.color;
            body[3] *= alpha;
            surface.fill_circle(cx, cy, radius, body);
        }

        for id in &self.draw_order {
            let drawable = &self.drawables[id];
            if !drawable.positioned
                || drawable.label.is_empty()
                || drawable.strength <= LABEL_STRENGTH_THRESHOLD
            {
                continue;
            }
            let (cx, cy) = self.camera.to_canvas(drawable.x, drawable.y);
            let radius = drawable.radius * self.camera.zoom;
            surface.fill_text(
                &drawable.label,
                cx + radius + 4.0,
                cy,
                LABEL_SIZE,
                [1.0, 1.0, 1.0, 0.9],
            );
        }

        Ok(())
    }
}

/// Clip a label to the display character budget
fn truncate_label(label: &str) -> String {
    if label.chars().count() <= LABEL_MAX_CHARS {
        label.to_string()
    } else {
        let mut clipped: String = label.chars().take(LABEL_MAX_CHARS - 1).collect();
        clipped.push('…');
        clipped
    }
}
