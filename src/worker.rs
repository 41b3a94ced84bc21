//! Background layout worker.
//!
//! Runs a [`ForceSimulation`] off the main thread and streams position
//! snapshots back to the host over an ordered channel: a `Tick` per
//! iteration, then exactly one terminal `End`. The host awaits only the
//! one-time spawn handshake; everything after is event-driven via
//! [`LayoutWorker::recv`].
//!
//! Node and edge arrays are moved into the worker at spawn: the simulation
//! exclusively owns all mutable position/velocity state, and the host only
//! ever sees snapshot copies.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::model::{Edge, MemoryNode, PositionedNode};
use crate::simulation::{ForceSimulation, SimulationConfig};

/// Host → worker payload: the full input set for one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerInit {
    pub nodes: Vec<MemoryNode>,
    pub edges: Vec<Edge>,
    pub width: f32,
    pub height: f32,
}

/// Worker → host position update.
///
/// Each message carries a full snapshot: a later update supersedes all
/// earlier positions for the same ids, never partially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutUpdate {
    /// One simulation iteration's positions
    Tick { nodes: Vec<PositionedNode> },
    /// Final settled positions; terminal, emitted exactly once
    End { nodes: Vec<PositionedNode> },
}

impl LayoutUpdate {
    /// The positions carried by this update
    pub fn nodes(&self) -> &[PositionedNode] {
        match self {
            LayoutUpdate::Tick { nodes } | LayoutUpdate::End { nodes } => nodes,
        }
    }

    /// Whether this is the terminal update
    pub fn is_end(&self) -> bool {
        matches!(self, LayoutUpdate::End { .. })
    }
}

/// Errors surfaced to the host when a worker cannot be started.
///
/// These are recoverable: the host is expected to fall back to a static
/// layout rather than crash the surrounding view.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The background task exited before completing the handshake
    #[error("layout worker failed to start: {0}")]
    Startup(String),
}

/// Handle to a running background layout simulation.
///
/// Dropping the handle cancels the worker; any updates still in flight are
/// discarded, never delivered.
pub struct LayoutWorker {
    rx: mpsc::UnboundedReceiver<LayoutUpdate>,
    cancelled: Arc<AtomicBool>,
}

impl LayoutWorker {
    /// Spawn a simulation worker with default force parameters
    pub async fn spawn(init: WorkerInit) -> Result<Self, WorkerError> {
        Self::spawn_with_config(init, SimulationConfig::default()).await
    }

    /// Spawn a simulation worker, awaiting its readiness handshake
    pub async fn spawn_with_config(
        init: WorkerInit,
        config: SimulationConfig,
    ) -> Result<Self, WorkerError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        tokio::task::spawn_blocking(move || run_simulation(init, config, tx, ready_tx, flag));

        ready_rx
            .await
            .map_err(|_| WorkerError::Startup("worker exited before handshake".to_string()))?;

        Ok(Self { rx, cancelled })
    }

    /// Receive the next update in FIFO order.
    ///
    /// Returns `None` once the terminal `End` has been consumed and the
    /// channel drained, or immediately after cancellation — updates queued
    /// before a cancel are discarded, not applied.
    pub async fn recv(&mut self) -> Option<LayoutUpdate> {
        if self.cancelled.load(Ordering::Acquire) {
            return None;
        }
        let update = self.rx.recv().await;
        if self.cancelled.load(Ordering::Acquire) {
            return None;
        }
        update
    }

    /// Stop the background simulation.
    ///
    /// Idempotent; safe to call while a `recv` is pending.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            debug!("layout worker cancelled");
        }
        // The simulation loop observes the flag on its next iteration and
        // exits, closing the channel.
    }
}

impl Drop for LayoutWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Simulation loop body, run on the blocking thread pool
fn run_simulation(
    init: WorkerInit,
    config: SimulationConfig,
    tx: mpsc::UnboundedSender<LayoutUpdate>,
    ready_tx: oneshot::Sender<()>,
    cancelled: Arc<AtomicBool>,
) {
    let mut sim = ForceSimulation::with_config(
        &init.nodes,
        &init.edges,
        init.width,
        init.height,
        config,
    );
    debug!(
        nodes = init.nodes.len(),
        edges = sim.edge_count(),
        "layout worker started"
    );

    if ready_tx.send(()).is_err() {
        // Host gave up before the handshake completed
        return;
    }

    // Degenerate input: no iteration, just the terminal snapshot
    if sim.is_empty() {
        let _ = tx.send(LayoutUpdate::End { nodes: Vec::new() });
        return;
    }

    while sim.is_running() {
        if cancelled.load(Ordering::Acquire) {
            return;
        }
        sim.tick();
        if tx.send(LayoutUpdate::Tick { nodes: sim.positions() }).is_err() {
            // Receiver dropped; nothing left to stream to
            return;
        }
    }

    let _ = tx.send(LayoutUpdate::End { nodes: sim.positions() });
    debug!(ticks = sim.ticks(), "layout worker converged");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Layer;

    fn node(id: &str) -> MemoryNode {
        MemoryNode {
            id: id.to_string(),
            layer: Layer::ShortTerm,
            strength: 0.5,
            label: String::new(),
            category: None,
            kind: None,
            access_count: 0,
            age_days: 0.0,
        }
    }

    fn init(ids: &[&str]) -> WorkerInit {
        WorkerInit {
            nodes: ids.iter().map(|id| node(id)).collect(),
            edges: Vec::new(),
            width: 400.0,
            height: 300.0,
        }
    }

    #[test]
    fn tick_serializes_with_lowercase_type_tag() {
        let update = LayoutUpdate::Tick {
            nodes: vec![PositionedNode {
                id: "a".to_string(),
                x: 1.0,
                y: 2.0,
            }],
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["type"], "tick");
        assert_eq!(json["nodes"][0]["id"], "a");
    }

    #[test]
    fn end_round_trips_through_json() {
        let update = LayoutUpdate::End { nodes: Vec::new() };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"type":"end","nodes":[]}"#);
        let back: LayoutUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, update);
    }

    #[tokio::test]
    async fn empty_input_emits_single_end() {
        let mut worker = LayoutWorker::spawn(init(&[])).await.unwrap();
        let first = worker.recv().await.unwrap();
        assert_eq!(first, LayoutUpdate::End { nodes: Vec::new() });
        assert!(worker.recv().await.is_none());
    }

    #[tokio::test]
    async fn streams_ticks_then_exactly_one_end() {
        let mut worker = LayoutWorker::spawn(init(&["a", "b", "c"])).await.unwrap();

        let mut ticks = 0usize;
        let mut ends = 0usize;
        while let Some(update) = worker.recv().await {
            match update {
                LayoutUpdate::Tick { nodes } => {
                    ticks += 1;
                    assert_eq!(nodes.len(), 3);
                }
                LayoutUpdate::End { nodes } => {
                    ends += 1;
                    assert_eq!(nodes.len(), 3);
                }
            }
        }
        assert!(ticks > 0);
        assert_eq!(ends, 1);
    }

    #[tokio::test]
    async fn every_update_covers_exactly_the_init_ids() {
        let mut worker = LayoutWorker::spawn(init(&["x", "y"])).await.unwrap();
        while let Some(update) = worker.recv().await {
            let mut ids: Vec<&str> = update.nodes().iter().map(|n| n.id.as_str()).collect();
            ids.sort_unstable();
            assert_eq!(ids, ["x", "y"]);
        }
    }

    #[tokio::test]
    async fn cancel_discards_queued_updates() {
        let mut worker = LayoutWorker::spawn(init(&["a", "b"])).await.unwrap();
        // Let the worker queue at least one update before cancelling
        let first = worker.recv().await;
        assert!(first.is_some());

        worker.cancel();
        assert!(worker.recv().await.is_none());
        assert!(worker.recv().await.is_none());
    }
}
