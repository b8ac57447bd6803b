use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::utilities::assign::assign;
use crate::utilities::backend::{Backend, BackendKind, build_backend};
use crate::utilities::error::{KmeansError, Result};
use crate::utilities::reduce::EmptyClusterPolicy;
use crate::utilities::structs::{Clustering, EmptyClusterEvent, Point};

pub const DEFAULT_ITERATIONS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KmeansOptions {
    pub iterations: usize,
    pub backend: BackendKind,
    /// Threads or ranks; 0 picks one per available core.
    pub workers: usize,
    pub empty_cluster: EmptyClusterPolicy,
}

impl Default for KmeansOptions {
    fn default() -> Self {
        KmeansOptions {
            iterations: DEFAULT_ITERATIONS,
            backend: BackendKind::Sequential,
            workers: 0,
            empty_cluster: EmptyClusterPolicy::Freeze,
        }
    }
}

/// Builds the backend named in `options` and runs the clustering loop.
pub fn kmeans(data: &[Point], centroids: Vec<Point>, options: &KmeansOptions) -> Result<Clustering> {
    validate(data, &centroids)?;
    let mut backend = build_backend(options.backend, options.workers)?;
    run(backend.as_mut(), data, centroids, options.iterations, options.empty_cluster)
}

/// Runs exactly `iterations` rounds of
/// ASSIGN (+ synchronize) -> REDUCE -> BROADCAST on `backend`.
///
/// The driver owns the centroids and the table for the whole run; backends
/// only borrow them. With zero iterations the centroids come back untouched
/// and the table holds one Assignment Step against them.
pub fn run(
    backend: &mut dyn Backend,
    data: &[Point],
    mut centroids: Vec<Point>,
    iterations: usize,
    policy: EmptyClusterPolicy,
) -> Result<Clustering> {
    validate(data, &centroids)?;
    let kind = backend.kind();
    info!(
        backend = %kind,
        workers = backend.workers(),
        points = data.len(),
        clusters = centroids.len(),
        iterations,
        "kmeans start"
    );

    let mut table = vec![0u32; data.len()];
    let mut empty_events = Vec::new();

    if iterations == 0 {
        assign(data, &centroids, &mut table);
    } else {
        backend.prepare(data, &centroids, iterations)?;
        for iteration in 0..iterations {
            backend.assign(data, &centroids, &mut table)?;
            let stats = backend.reduce(data, &table, &mut centroids, policy, iteration)?;
            empty_events.extend(
                stats
                    .empty
                    .into_iter()
                    .map(|cluster| EmptyClusterEvent { iteration, cluster }),
            );
            backend.broadcast(&centroids)?;
            debug!(iteration, "iteration done");
        }
        backend.finish()?;
    }

    info!(backend = %kind, empty = empty_events.len(), "kmeans done");
    Ok(Clustering {
        centroids,
        table,
        iterations,
        backend: kind.name().to_string(),
        empty_events,
    })
}

fn validate(data: &[Point], centroids: &[Point]) -> Result<()> {
    if centroids.is_empty() {
        return Err(KmeansError::invalid("at least one centroid is required"));
    }
    if data.is_empty() {
        return Err(KmeansError::invalid("at least one data point is required"));
    }
    if centroids.len() > u32::MAX as usize {
        return Err(KmeansError::invalid("too many centroids"));
    }
    Ok(())
}
