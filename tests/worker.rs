//! Worker protocol end-to-end: streaming, convergence, cancellation.

use std::collections::HashSet;

use anyhow::Result;

use memograph::model::{Edge, EdgeKind, Layer, MemoryNode, PositionedNode};
use memograph::render::{GraphRenderer, RecordingSurface};
use memograph::worker::{LayoutUpdate, LayoutWorker, WorkerInit};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn node(id: &str, layer: Layer, strength: f32) -> MemoryNode {
    MemoryNode {
        id: id.to_string(),
        layer,
        strength,
        label: String::new(),
        category: None,
        kind: None,
        access_count: 0,
        age_days: 0.0,
    }
}

fn pair_init() -> WorkerInit {
    WorkerInit {
        nodes: vec![node("a", Layer::ShortTerm, 0.2), node("b", Layer::LongTerm, 0.9)],
        edges: vec![Edge {
            source: "a".to_string(),
            target: "b".to_string(),
            kind: EdgeKind::Scene,
            weight: None,
        }],
        width: 400.0,
        height: 300.0,
    }
}

#[tokio::test]
async fn worker_streams_into_renderer_until_convergence() -> Result<()> {
    init_tracing();
    let init = pair_init();
    let mut renderer = GraphRenderer::new(init.width, init.height);
    renderer.init(RecordingSurface::new(), Box::new(|_| {}));
    renderer.set_data(&init.nodes, &init.edges);

    let mut worker = LayoutWorker::spawn(init).await?;
    let mut final_positions: Vec<PositionedNode> = Vec::new();
    let mut ends = 0usize;

    while let Some(update) = worker.recv().await {
        // Ticks arrive in order and each fully replaces the previous frame
        renderer.update_positions(update.nodes())?;

        let ids: HashSet<&str> = update.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, HashSet::from(["a", "b"]));

        if update.is_end() {
            ends += 1;
            final_positions = update.nodes().to_vec();
        }
    }

    assert_eq!(ends, 1, "exactly one terminal end message");
    // The settled layout is hittable where the end snapshot says
    for pos in &final_positions {
        assert!(renderer.node_at(pos.x, pos.y).is_some());
    }
    Ok(())
}

#[tokio::test]
async fn empty_node_set_yields_immediate_end() -> Result<()> {
    let mut worker = LayoutWorker::spawn(WorkerInit {
        nodes: Vec::new(),
        edges: Vec::new(),
        width: 400.0,
        height: 300.0,
    })
    .await?;

    let first = worker.recv().await.expect("one message expected");
    assert_eq!(first, LayoutUpdate::End { nodes: Vec::new() });
    assert!(worker.recv().await.is_none());
    Ok(())
}

#[tokio::test]
async fn new_simulation_replaces_cancelled_predecessor() -> Result<()> {
    // Data refresh: tear down the old worker, then start a fresh one
    let mut first = LayoutWorker::spawn(pair_init()).await?;
    assert!(first.recv().await.is_some());
    first.cancel();
    assert!(first.recv().await.is_none());

    let mut second = LayoutWorker::spawn(pair_init()).await?;
    let mut saw_end = false;
    while let Some(update) = second.recv().await {
        saw_end = update.is_end();
    }
    assert!(saw_end, "replacement worker must run to completion");
    Ok(())
}

#[tokio::test]
async fn dropping_the_handle_cancels_the_worker() -> Result<()> {
    let worker = LayoutWorker::spawn(pair_init()).await?;
    // Dropping must not hang or panic; the simulation loop observes the
    // cancel flag (or the closed channel) and exits on its own
    drop(worker);
    Ok(())
}
