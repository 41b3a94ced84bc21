//! memograph - layout engine and renderer for memory-graph visualization.
//!
//! Turns memory records and their relations into 2D positions: either a
//! deterministic clustered layout ([`cluster`]) or an iterative force
//! simulation run off the main thread ([`worker`]), streaming position
//! snapshots to an incremental renderer ([`render`]). The [`decay`] module
//! mirrors the backend's strength-decay formula for projection charts.
//!
//! Typical simulation flow:
//!
//! ```rust,ignore
//! use memograph::{GraphRenderer, LayoutWorker, RecordingSurface, WorkerInit};
//!
//! let mut renderer = GraphRenderer::new(800.0, 600.0);
//! renderer.init(RecordingSurface::new(), Box::new(|id| println!("clicked {id}")));
//! renderer.set_data(&nodes, &edges);
//!
//! let mut worker = LayoutWorker::spawn(WorkerInit {
//!     nodes,
//!     edges,
//!     width: 800.0,
//!     height: 600.0,
//! })
//! .await?;
//! while let Some(update) = worker.recv().await {
//!     renderer.update_positions(update.nodes())?;
//! }
//! ```

pub mod camera;
pub mod cluster;
pub mod decay;
pub mod model;
pub mod render;
pub mod simulation;
pub mod worker;

pub use cluster::{compute_cluster_layout, ClusterGroup, ClusterLayout, GroupDimension};
pub use decay::{decay_projection_series, project_decay, DecayPoint, DecayProjection};
pub use model::{Edge, EdgeKind, Layer, MemoryNode, PositionedNode};
pub use render::{DrawCommand, DrawSurface, GraphRenderer, RecordingSurface, RenderError};
pub use simulation::{ForceSimulation, SimulationConfig};
pub use worker::{LayoutUpdate, LayoutWorker, WorkerError, WorkerInit};
