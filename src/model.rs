//! Core data model for the memory graph.
//!
//! These types are the interchange boundary with the host UI: node and edge
//! records arrive from the backend fetch layer, and positioned nodes flow
//! back out of the layout engines. Everything here is serde-derived so the
//! host can pass records through verbatim.

use serde::{Deserialize, Serialize};

/// Minimum visual node radius (strength 0.0)
pub const NODE_RADIUS_MIN: f32 = 4.0;

/// Maximum visual node radius (strength 1.0)
pub const NODE_RADIUS_MAX: f32 = 14.0;

/// Visual radius for a node of the given strength.
///
/// Monotonic in strength; strength is clamped to `[0, 1]` first so malformed
/// backend values cannot produce negative or runaway radii.
pub fn node_radius(strength: f32) -> f32 {
    let s = if strength.is_nan() { 0.0 } else { strength.clamp(0.0, 1.0) };
    NODE_RADIUS_MIN + s * (NODE_RADIUS_MAX - NODE_RADIUS_MIN)
}

/// Color constants (RGBA, normalized 0.0-1.0)
pub mod colors {
    /// Background fill
    pub const BACKGROUND: [f32; 4] = [0.102, 0.102, 0.180, 1.0];

    /// Short-term memory nodes: Amber (#F0A030)
    pub const LAYER_SHORT_TERM: [f32; 4] = [0.941, 0.627, 0.188, 1.0];

    /// Long-term memory nodes: Blue (#4A90D9)
    pub const LAYER_LONG_TERM: [f32; 4] = [0.290, 0.565, 0.851, 1.0];

    /// Scene edges: slate
    pub const EDGE_SCENE: [f32; 4] = [0.392, 0.392, 0.471, 0.5];

    /// Category edges: green
    pub const EDGE_CATEGORY: [f32; 4] = [0.314, 0.784, 0.471, 0.5];

    /// Entity edges: purple
    pub const EDGE_ENTITY: [f32; 4] = [0.608, 0.349, 0.714, 0.5];

    /// Cycling palette for cluster coloring
    pub const CLUSTER_PALETTE: [[f32; 4]; 8] = [
        [0.290, 0.565, 0.851, 1.0], // blue
        [0.314, 0.784, 0.471, 1.0], // green
        [0.608, 0.349, 0.714, 1.0], // purple
        [0.902, 0.494, 0.133, 1.0], // orange
        [0.906, 0.298, 0.235, 1.0], // red
        [0.102, 0.737, 0.612, 1.0], // teal
        [0.945, 0.769, 0.059, 1.0], // yellow
        [0.557, 0.267, 0.678, 1.0], // violet
    ];
}

/// Coarse memory classification: fast-decaying short-term vs slow-decaying
/// long-term. Wire values match the backend ("sml"/"lml"), with the spelled
/// out forms accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    #[serde(rename = "sml", alias = "short-term")]
    ShortTerm,
    #[serde(rename = "lml", alias = "long-term")]
    LongTerm,
}

impl Layer {
    /// Display label for grouping and legends
    pub fn label(&self) -> &'static str {
        match self {
            Layer::ShortTerm => "Short-term",
            Layer::LongTerm => "Long-term",
        }
    }

    /// Node fill color for layer-keyed rendering
    pub fn color(&self) -> [f32; 4] {
        match self {
            Layer::ShortTerm => colors::LAYER_SHORT_TERM,
            Layer::LongTerm => colors::LAYER_LONG_TERM,
        }
    }
}

/// Relation kind between two memories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Memories from the same scene/session
    Scene,
    /// Memories sharing a category
    Category,
    /// Memories linked through an extracted entity
    Entity,
}

impl EdgeKind {
    /// Stroke color for edge-kind-keyed rendering
    pub fn color(&self) -> [f32; 4] {
        match self {
            EdgeKind::Scene => colors::EDGE_SCENE,
            EdgeKind::Category => colors::EDGE_CATEGORY,
            EdgeKind::Entity => colors::EDGE_ENTITY,
        }
    }
}

/// A memory record as handed over by the fetch layer.
///
/// Immutable input to the layout engines; `strength` and `layer` come from
/// the backend and are never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryNode {
    /// Unique identifier
    pub id: String,

    /// Short-term vs long-term classification
    pub layer: Layer,

    /// Normalized [0,1] retrievability/salience
    pub strength: f32,

    /// Human-readable label for display
    #[serde(default)]
    pub label: String,

    /// Primary category, if assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Free-form memory type (e.g. "fact", "preference")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Times this memory has been retrieved
    #[serde(default)]
    pub access_count: u32,

    /// Days since creation, for age bucketing
    #[serde(default)]
    pub age_days: f32,
}

/// An undirected relation between two memories.
///
/// Direction is irrelevant for layout; `weight` is carried through for hosts
/// that scale stroke width but is unused by the engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Source node ID
    pub source: String,

    /// Target node ID
    pub target: String,

    /// Relation kind (wire field name is "type")
    #[serde(rename = "type")]
    pub kind: EdgeKind,

    /// Optional relation weight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

/// A node position produced by a layout pass or simulation tick.
///
/// The only engine-owned mutable state; produced fresh on every emission and
/// fully replacing any prior position for the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

/// A 2D point, used for cluster centers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_radius_encodes_strength() {
        assert_eq!(node_radius(0.0), 4.0);
        assert_eq!(node_radius(1.0), 14.0);
        assert_eq!(node_radius(0.5), 9.0);
    }

    #[test]
    fn node_radius_clamps_degenerate_strength() {
        assert_eq!(node_radius(-1.0), NODE_RADIUS_MIN);
        assert_eq!(node_radius(2.0), NODE_RADIUS_MAX);
        assert_eq!(node_radius(f32::NAN), NODE_RADIUS_MIN);
    }

    #[test]
    fn node_radius_is_monotonic() {
        let mut prev = node_radius(0.0);
        for i in 1..=10 {
            let r = node_radius(i as f32 / 10.0);
            assert!(r >= prev);
            prev = r;
        }
    }

    #[test]
    fn layer_deserializes_wire_and_alias_forms() {
        let short: Layer = serde_json::from_str("\"sml\"").unwrap();
        assert_eq!(short, Layer::ShortTerm);
        let long: Layer = serde_json::from_str("\"long-term\"").unwrap();
        assert_eq!(long, Layer::LongTerm);
    }

    #[test]
    fn edge_kind_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&EdgeKind::Scene).unwrap(), "\"scene\"");
        let kind: EdgeKind = serde_json::from_str("\"entity\"").unwrap();
        assert_eq!(kind, EdgeKind::Entity);
    }

    #[test]
    fn memory_node_accepts_minimal_record() {
        // The fetch layer may omit everything but id, layer and strength
        let node: MemoryNode =
            serde_json::from_str(r#"{"id":"a","layer":"sml","strength":0.2}"#).unwrap();
        assert_eq!(node.id, "a");
        assert_eq!(node.access_count, 0);
        assert!(node.category.is_none());
    }

    #[test]
    fn edge_wire_field_is_type() {
        let edge: Edge =
            serde_json::from_str(r#"{"source":"a","target":"b","type":"scene"}"#).unwrap();
        assert_eq!(edge.kind, EdgeKind::Scene);
        assert!(edge.weight.is_none());
    }
}
