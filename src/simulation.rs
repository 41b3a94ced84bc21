//! Iterative force-directed layout.
//!
//! A CPU particle integrator over an arena of plain structs: each tick
//! applies link attraction, many-body repulsion, a weak centering pull toward
//! the viewport center, and hard collision separation, then integrates
//! velocities scaled by a decaying `alpha`. The simulation is converged once
//! alpha falls below its floor or the tick cap is reached.
//!
//! The simulation exclusively owns node position/velocity state; consumers
//! only ever receive snapshots via [`ForceSimulation::positions`].

use std::collections::HashMap;

use crate::model::{Edge, MemoryNode, PositionedNode};

/// Many-body repulsion strength (negative = repulsion)
pub const DEFAULT_CHARGE: f32 = -90.0;

/// Link rest length
pub const DEFAULT_LINK_DISTANCE: f32 = 70.0;

/// Link spring strength
pub const DEFAULT_LINK_STRENGTH: f32 = 0.25;

/// Centering pull toward the viewport center
pub const DEFAULT_CENTER_STRENGTH: f32 = 0.05;

/// Hard separation radius for the collide force
pub const DEFAULT_COLLIDE_RADIUS: f32 = 13.0;

/// Velocity decay factor (friction), applied each tick
pub const DEFAULT_VELOCITY_DECAY: f32 = 0.6;

/// Velocity magnitude cap, prevents numerical explosion
pub const DEFAULT_MAX_VELOCITY: f32 = 100.0;

/// Alpha floor: the simulation is converged below this
pub const DEFAULT_ALPHA_MIN: f32 = 0.005;

/// Nominal tick count over which alpha decays to its floor
pub const ALPHA_DECAY_TICKS: f32 = 300.0;

/// Safety cap on iterations, independent of alpha
pub const MAX_TICKS: usize = 300;

/// Minimum pair distance used in force math (avoids singularities)
const DISTANCE_MIN: f32 = 1.0;

/// Tunable force parameters and alpha schedule
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Repulsion strength (negative = repulsion)
    pub charge: f32,
    /// Link rest length
    pub link_distance: f32,
    /// Link spring strength
    pub link_strength: f32,
    /// Centering pull strength
    pub center_strength: f32,
    /// Hard separation radius
    pub collide_radius: f32,
    /// Velocity decay (friction)
    pub velocity_decay: f32,
    /// Velocity magnitude cap
    pub max_velocity: f32,
    /// Current alpha (simulation temperature)
    pub alpha: f32,
    /// Alpha floor
    pub alpha_min: f32,
    /// Per-tick exponential alpha decay
    pub alpha_decay: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            charge: DEFAULT_CHARGE,
            link_distance: DEFAULT_LINK_DISTANCE,
            link_strength: DEFAULT_LINK_STRENGTH,
            center_strength: DEFAULT_CENTER_STRENGTH,
            collide_radius: DEFAULT_COLLIDE_RADIUS,
            velocity_decay: DEFAULT_VELOCITY_DECAY,
            max_velocity: DEFAULT_MAX_VELOCITY,
            alpha: 1.0,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: 1.0 - DEFAULT_ALPHA_MIN.powf(1.0 / ALPHA_DECAY_TICKS),
        }
    }
}

/// A particle in the simulation arena
#[derive(Debug, Clone)]
pub struct SimNode {
    /// Node ID (from the input record)
    pub id: String,
    /// Position
    pub x: f32,
    pub y: f32,
    /// Velocity
    pub vx: f32,
    pub vy: f32,
}

impl SimNode {
    /// Seed a particle on a ring around the viewport center, spaced by index
    fn seeded(node: &MemoryNode, index: usize, total: usize, cx: f32, cy: f32) -> Self {
        let angle = std::f32::consts::TAU * (index as f32) / (total.max(1) as f32);
        let ring = 100.0;
        Self {
            id: node.id.clone(),
            x: cx + ring * angle.cos(),
            y: cy + ring * angle.sin(),
            vx: 0.0,
            vy: 0.0,
        }
    }
}

/// An edge resolved to indices into the node arena
#[derive(Debug, Clone, Copy)]
struct SimEdge {
    source: usize,
    target: usize,
}

/// Force-directed layout over a memory node/edge set.
pub struct ForceSimulation {
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
    config: SimulationConfig,
    center_x: f32,
    center_y: f32,
    ticks: usize,
}

impl ForceSimulation {
    /// Build a simulation for the given records and viewport.
    ///
    /// Edges whose endpoints are not in the node set are dropped here;
    /// disconnected nodes still participate in charge/center/collide.
    pub fn new(nodes: &[MemoryNode], edges: &[Edge], width: f32, height: f32) -> Self {
        Self::with_config(nodes, edges, width, height, SimulationConfig::default())
    }

    /// Build a simulation with explicit force parameters
    pub fn with_config(
        nodes: &[MemoryNode],
        edges: &[Edge],
        width: f32,
        height: f32,
        config: SimulationConfig,
    ) -> Self {
        let center_x = width / 2.0;
        let center_y = height / 2.0;
        let total = nodes.len();

        let sim_nodes: Vec<SimNode> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| SimNode::seeded(n, i, total, center_x, center_y))
            .collect();

        let index_of: HashMap<&str, usize> = sim_nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let sim_edges: Vec<SimEdge> = edges
            .iter()
            .filter_map(|e| {
                Some(SimEdge {
                    source: *index_of.get(e.source.as_str())?,
                    target: *index_of.get(e.target.as_str())?,
                })
            })
            .collect();

        Self {
            nodes: sim_nodes,
            edges: sim_edges,
            config,
            center_x,
            center_y,
            ticks: 0,
        }
    }

    /// Whether the simulation has any particles at all
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of resolved edges (malformed input edges are already dropped)
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Current alpha
    pub fn alpha(&self) -> f32 {
        self.config.alpha
    }

    /// Ticks run so far
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Whether the simulation still has work to do: a non-empty arena that
    /// has neither converged nor hit the tick cap
    pub fn is_running(&self) -> bool {
        !self.nodes.is_empty()
            && self.config.alpha >= self.config.alpha_min
            && self.ticks < MAX_TICKS
    }

    /// Run one iteration: accumulate forces, integrate, decay alpha
    pub fn tick(&mut self) {
        if !self.is_running() {
            return;
        }

        self.apply_charge_force();
        self.apply_link_force();
        self.apply_center_force();
        self.apply_collide_force();

        let decay = self.config.velocity_decay;
        let cap = self.config.max_velocity;
        let alpha = self.config.alpha;
        for node in &mut self.nodes {
            node.vx = (node.vx * decay).clamp(-cap, cap);
            node.vy = (node.vy * decay).clamp(-cap, cap);
            node.x += node.vx * alpha;
            node.y += node.vy * alpha;
        }

        // Exponential decay toward zero; strictly decreasing while running
        self.config.alpha += (self.config.alpha_decay - 1.0) * self.config.alpha;
        self.ticks += 1;
    }

    /// Mutual repulsion between all node pairs (inverse-square falloff)
    fn apply_charge_force(&mut self) {
        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = self.nodes[j].x - self.nodes[i].x;
                let dy = self.nodes[j].y - self.nodes[i].y;
                let dist_sq = (dx * dx + dy * dy).max(DISTANCE_MIN);
                let dist = dist_sq.sqrt();

                let force = self.config.charge / dist_sq;
                let fx = force * dx / dist;
                let fy = force * dy / dist;

                self.nodes[i].vx -= fx;
                self.nodes[i].vy -= fy;
                self.nodes[j].vx += fx;
                self.nodes[j].vy += fy;
            }
        }
    }

    /// Spring attraction along edges toward the rest length
    fn apply_link_force(&mut self) {
        for edge in &self.edges {
            let (source, target) = (edge.source, edge.target);
            let dx = self.nodes[target].x - self.nodes[source].x;
            let dy = self.nodes[target].y - self.nodes[source].y;
            let dist = (dx * dx + dy * dy).sqrt().max(DISTANCE_MIN);

            let stretch = dist - self.config.link_distance;
            let force = self.config.link_strength * stretch / dist;
            let fx = force * dx;
            let fy = force * dy;

            self.nodes[source].vx += fx;
            self.nodes[source].vy += fy;
            self.nodes[target].vx -= fx;
            self.nodes[target].vy -= fy;
        }
    }

    /// Weak pull toward the viewport center
    fn apply_center_force(&mut self) {
        let strength = self.config.center_strength;
        for node in &mut self.nodes {
            node.vx += (self.center_x - node.x) * strength;
            node.vy += (self.center_y - node.y) * strength;
        }
    }

    /// Hard separation: overlapping pairs are pushed apart by half the
    /// overlap each
    fn apply_collide_force(&mut self) {
        let min_dist = self.config.collide_radius * 2.0;
        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = self.nodes[j].x - self.nodes[i].x;
                let dy = self.nodes[j].y - self.nodes[i].y;
                let dist = (dx * dx + dy * dy).sqrt().max(DISTANCE_MIN);
                if dist >= min_dist {
                    continue;
                }

                let push = (min_dist - dist) / dist * 0.5;
                let fx = dx * push;
                let fy = dy * push;

                self.nodes[i].vx -= fx;
                self.nodes[i].vy -= fy;
                self.nodes[j].vx += fx;
                self.nodes[j].vy += fy;
            }
        }
    }

    /// Snapshot of current positions, one entry per input node.
    ///
    /// Always freshly allocated; callers never see references into the
    /// live arena.
    pub fn positions(&self) -> Vec<PositionedNode> {
        self.nodes
            .iter()
            .map(|n| PositionedNode {
                id: n.id.clone(),
                x: n.x,
                y: n.y,
            })
            .collect()
    }

    /// Tick until convergence or the iteration cap; returns ticks run
    pub fn run_to_convergence(&mut self) -> usize {
        let start = self.ticks;
        while self.is_running() {
            self.tick();
        }
        self.ticks - start
    }
}
