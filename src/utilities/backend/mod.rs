//! Execution backends for the Assignment Step.
//!
//! Every backend runs the same kernel (`assign::nearest_centroid`, or its
//! device twin in `shaders/assign.wgsl`) and differs only in how the points
//! are split up and how the finished table becomes visible to the reducer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utilities::error::{KmeansError, Result};
use crate::utilities::reduce::{EmptyClusterPolicy, reduce};
use crate::utilities::structs::{Point, ReduceStats};

pub mod distributed;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod sequential;
pub mod threaded;

pub use distributed::{ChannelCommunicator, Communicator, DistributedBackend, ROOT};
#[cfg(feature = "gpu")]
pub use gpu::GpuBackend;
pub use sequential::SequentialBackend;
pub use threaded::ThreadedBackend;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Sequential,
    Threaded,
    Gpu,
    Distributed,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Sequential,
        BackendKind::Threaded,
        BackendKind::Gpu,
        BackendKind::Distributed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Sequential => "sequential",
            BackendKind::Threaded => "threaded",
            BackendKind::Gpu => "gpu",
            BackendKind::Distributed => "distributed",
        }
    }

    pub fn from_code(code: u32) -> Option<BackendKind> {
        BackendKind::ALL.get(code as usize).copied()
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = KmeansError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(BackendKind::Sequential),
            "threaded" | "threads" | "pthread" => Ok(BackendKind::Threaded),
            "gpu" => Ok(BackendKind::Gpu),
            "distributed" | "mpi" => Ok(BackendKind::Distributed),
            other => Err(KmeansError::invalid(format!("unknown backend '{other}'"))),
        }
    }
}

/// A strategy for running the Assignment Step.
///
/// The driver calls `prepare` once, then per iteration `assign`, `reduce`
/// and `broadcast`, and `finish` after the last iteration. `assign` must not
/// return until every entry of `table` is written and visible to the caller.
pub trait Backend: Send {
    fn kind(&self) -> BackendKind;

    /// Number of workers, threads, or ranks the backend splits points across.
    fn workers(&self) -> usize {
        1
    }

    fn prepare(&mut self, _data: &[Point], _centroids: &[Point], _iterations: usize) -> Result<()> {
        Ok(())
    }

    fn assign(&mut self, data: &[Point], centroids: &[Point], table: &mut [u32]) -> Result<()>;

    /// Reduction Step, run by the single owner of the centroids.
    fn reduce(
        &mut self,
        data: &[Point],
        table: &[u32],
        centroids: &mut [Point],
        policy: EmptyClusterPolicy,
        iteration: usize,
    ) -> Result<ReduceStats> {
        reduce(data, table, centroids, policy, iteration)
    }

    /// Hands the updated centroids to any worker that keeps its own copy.
    fn broadcast(&mut self, _centroids: &[Point]) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// `0` means one worker per available core.
pub fn resolve_workers(workers: usize) -> usize {
    if workers > 0 {
        return workers;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

pub fn build_backend(kind: BackendKind, workers: usize) -> Result<Box<dyn Backend>> {
    let workers = resolve_workers(workers);
    match kind {
        BackendKind::Sequential => Ok(Box::new(SequentialBackend)),
        BackendKind::Threaded => Ok(Box::new(ThreadedBackend::new(workers)?)),
        BackendKind::Distributed => Ok(Box::new(DistributedBackend::new(workers))),
        #[cfg(feature = "gpu")]
        BackendKind::Gpu => Ok(Box::new(GpuBackend::new()?)),
        #[cfg(not(feature = "gpu"))]
        BackendKind::Gpu => Err(KmeansError::BackendUnavailable("gpu")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for k in BackendKind::ALL {
            assert_eq!(k.name().parse::<BackendKind>().unwrap(), k);
        }
        assert_eq!("MPI".parse::<BackendKind>().unwrap(), BackendKind::Distributed);
        assert!("opencl".parse::<BackendKind>().is_err());
    }

    #[test]
    fn codes_follow_declaration_order() {
        assert_eq!(BackendKind::from_code(0), Some(BackendKind::Sequential));
        assert_eq!(BackendKind::from_code(3), Some(BackendKind::Distributed));
        assert_eq!(BackendKind::from_code(4), None);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let s = serde_json::to_string(&BackendKind::Threaded).unwrap();
        assert_eq!(s, "\"threaded\"");
    }

    #[test]
    fn zero_workers_resolves_to_cores() {
        assert!(resolve_workers(0) >= 1);
        assert_eq!(resolve_workers(6), 6);
    }

    #[cfg(not(feature = "gpu"))]
    #[test]
    fn gpu_needs_feature() {
        let err = build_backend(BackendKind::Gpu, 1).err().unwrap();
        assert!(matches!(err, KmeansError::BackendUnavailable("gpu")));
    }
}
