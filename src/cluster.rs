//! Deterministic clustered layout.
//!
//! Groups memory nodes along a chosen dimension and computes a static 2D
//! placement: clusters arranged on a circle around the viewport center,
//! members scattered area-uniformly inside each cluster's disc. The whole
//! pass is synchronous and stateless; only the member scatter involves
//! randomness, and the RNG is injectable so tests can seed it.

use std::collections::HashMap;

use rand::Rng;
use serde::Serialize;

use crate::model::{colors, MemoryNode, Point, PositionedNode};

/// Ring radius as a fraction of the smaller viewport dimension
const RING_RADIUS_FACTOR: f32 = 0.35;

/// Fraction of the cluster radius used for member scatter
const SCATTER_FACTOR: f32 = 0.7;

/// Dimension along which memories are grouped.
///
/// A closed enum: every variant carries its own key extraction, so an
/// unsupported dimension is unrepresentable rather than a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDimension {
    /// First category, or "Uncategorized"
    Category,
    /// Memory type, or "General"
    Kind,
    /// Short-term vs long-term layer
    Layer,
    /// Relative age bucket: Today / This Week / This Month / Older
    Age,
    /// Strength bucket: Weak / Moderate / Strong
    Strength,
}

impl GroupDimension {
    /// Grouping key for a node under this dimension
    pub fn key_of(&self, node: &MemoryNode) -> String {
        match self {
            GroupDimension::Category => node
                .category
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_string()),
            GroupDimension::Kind => {
                node.kind.clone().unwrap_or_else(|| "General".to_string())
            }
            GroupDimension::Layer => node.layer.label().to_string(),
            GroupDimension::Age => age_bucket(node.age_days).to_string(),
            GroupDimension::Strength => strength_bucket(node.strength).to_string(),
        }
    }
}

fn age_bucket(age_days: f32) -> &'static str {
    if age_days < 1.0 {
        "Today"
    } else if age_days < 7.0 {
        "This Week"
    } else if age_days < 30.0 {
        "This Month"
    } else {
        "Older"
    }
}

fn strength_bucket(strength: f32) -> &'static str {
    if strength < 0.3 {
        "Weak"
    } else if strength < 0.7 {
        "Moderate"
    } else {
        "Strong"
    }
}

/// A labeled circular region of nodes sharing one grouping-key value
#[derive(Debug, Clone, Serialize)]
pub struct ClusterGroup {
    /// Stable identifier (the grouping-key value)
    pub id: String,
    /// Display label
    pub label: String,
    /// Member node ids, in input order
    pub members: Vec<String>,
    /// Assigned palette color
    pub color: [f32; 4],
    /// Disc center in viewport coordinates
    pub center: Point,
    /// Disc radius
    pub radius: f32,
}

/// Result of a clustered layout pass
#[derive(Debug, Clone, Serialize)]
pub struct ClusterLayout {
    /// Clusters sorted by descending member count (draw order)
    pub clusters: Vec<ClusterGroup>,
    /// One position per input node
    pub positions: Vec<PositionedNode>,
}

/// Cluster disc radius for a given member count.
///
/// `max(40, sqrt(n) * 20)` — area scales roughly linearly with population.
pub fn cluster_radius(member_count: usize) -> f32 {
    ((member_count as f32).sqrt() * 20.0).max(40.0)
}

/// Compute a clustered layout with an unseeded thread-local RNG.
///
/// Cluster membership, ordering, centers and radii are fully determined by
/// the input; only the within-cluster scatter varies between calls. Use
/// [`compute_cluster_layout_with_rng`] with a seeded generator when
/// reproducible scatter is needed.
pub fn compute_cluster_layout(
    nodes: &[MemoryNode],
    dimension: GroupDimension,
    width: f32,
    height: f32,
) -> ClusterLayout {
    compute_cluster_layout_with_rng(nodes, dimension, width, height, &mut rand::rng())
}

/// Compute a clustered layout using the caller's RNG for member scatter
pub fn compute_cluster_layout_with_rng<R: Rng + ?Sized>(
    nodes: &[MemoryNode],
    dimension: GroupDimension,
    width: f32,
    height: f32,
    rng: &mut R,
) -> ClusterLayout {
    if nodes.is_empty() {
        return ClusterLayout {
            clusters: Vec::new(),
            positions: Vec::new(),
        };
    }

    // Group node indices by key, remembering first-seen order for stable ties
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for (i, node) in nodes.iter().enumerate() {
        let key = dimension.key_of(node);
        first_seen.entry(key.clone()).or_insert(i);
        groups.entry(key).or_default().push(i);
    }

    // Largest cluster first; ties broken by first appearance in the input
    let mut ordered: Vec<(String, Vec<usize>)> = groups.into_iter().collect();
    ordered.sort_by_key(|(key, members)| (std::cmp::Reverse(members.len()), first_seen[key]));

    let cx = width / 2.0;
    let cy = height / 2.0;
    let ring_radius = RING_RADIUS_FACTOR * width.min(height);
    let cluster_count = ordered.len();

    let mut clusters = Vec::with_capacity(cluster_count);
    let mut positions = Vec::with_capacity(nodes.len());

    for (ci, (key, members)) in ordered.into_iter().enumerate() {
        // A lone cluster sits exactly on the viewport center
        let center = if cluster_count == 1 {
            Point { x: cx, y: cy }
        } else {
            let angle = std::f32::consts::TAU * (ci as f32) / (cluster_count as f32);
            Point {
                x: cx + ring_radius * angle.cos(),
                y: cy + ring_radius * angle.sin(),
            }
        };
        let radius = cluster_radius(members.len());

        for (mi, &node_index) in members.iter().enumerate() {
            // Area-uniform disc sampling: radius via sqrt of a uniform draw,
            // angle evenly spaced by member index
            let r = radius * SCATTER_FACTOR * rng.random::<f32>().sqrt();
            let theta = std::f32::consts::TAU * (mi as f32) / (members.len() as f32);
            positions.push(PositionedNode {
                id: nodes[node_index].id.clone(),
                x: center.x + r * theta.cos(),
                y: center.y + r * theta.sin(),
            });
        }

        clusters.push(ClusterGroup {
            label: key.clone(),
            id: key,
            members: members.iter().map(|&i| nodes[i].id.clone()).collect(),
            color: colors::CLUSTER_PALETTE[ci % colors::CLUSTER_PALETTE.len()],
            center,
            radius,
        });
    }

    tracing::debug!(
        clusters = clusters.len(),
        nodes = nodes.len(),
        ?dimension,
        "computed cluster layout"
    );

    ClusterLayout { clusters, positions }
}
