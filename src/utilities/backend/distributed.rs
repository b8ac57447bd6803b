//! Message-passing backend.
//!
//! Ranks never share memory: each one owns a copy of the data and of the
//! centroids and talks to the others only through the two collectives of a
//! [`Communicator`]. Rank [`ROOT`] is the driver's own thread; every other
//! rank runs the loop in [`run_rank`] on a dedicated thread, the same
//! program an MPI process would execute.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

use tracing::{debug, info};

use crate::utilities::assign::assign;
use crate::utilities::backend::{Backend, BackendKind};
use crate::utilities::error::{KmeansError, Result};
use crate::utilities::partition::partition_range;
use crate::utilities::structs::Point;

pub const ROOT: usize = 0;

/// Collective operations of a fixed-size process group.
pub trait Communicator: Send {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_root(&self) -> bool {
        self.rank() == ROOT
    }

    /// Collects every rank's `local` assignments into `table` on the root,
    /// placing rank `r`'s part at `partition_range(table.len(), r, size)`.
    /// Non-root ranks pass `None`.
    fn gather(&self, local: &[u32], table: Option<&mut [u32]>) -> Result<()>;

    /// Replaces `centroids` on every rank with the root's copy.
    fn broadcast(&self, centroids: &mut Vec<Point>) -> Result<()>;
}

enum Gathered {
    Part { rank: usize, part: Vec<u32> },
    Failed { rank: usize, reason: String },
}

enum Link {
    Root {
        parts: Receiver<Gathered>,
        peers: Vec<Sender<Arc<[Point]>>>,
    },
    Rank {
        to_root: Sender<Gathered>,
        from_root: Receiver<Arc<[Point]>>,
    },
}

/// In-process communicator built on channels.
pub struct ChannelCommunicator {
    rank: usize,
    size: usize,
    link: Link,
}

impl ChannelCommunicator {
    /// Builds a group of `size` endpoints; index `r` is rank `r`.
    pub fn group(size: usize) -> Vec<ChannelCommunicator> {
        let size = size.max(1);
        let (to_root, parts) = channel();
        let mut peers = Vec::with_capacity(size - 1);
        let mut ranks = Vec::with_capacity(size - 1);
        for rank in 1..size {
            let (tx, rx) = channel();
            peers.push(tx);
            ranks.push(ChannelCommunicator {
                rank,
                size,
                link: Link::Rank {
                    to_root: to_root.clone(),
                    from_root: rx,
                },
            });
        }
        let mut group = Vec::with_capacity(size);
        group.push(ChannelCommunicator {
            rank: ROOT,
            size,
            link: Link::Root { parts, peers },
        });
        group.extend(ranks);
        group
    }

    /// Tells the root this rank cannot take part in the next gather.
    fn abort(&self, reason: String) {
        if let Link::Rank { to_root, .. } = &self.link {
            let _ = to_root.send(Gathered::Failed {
                rank: self.rank,
                reason,
            });
        }
    }
}

impl Communicator for ChannelCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn gather(&self, local: &[u32], table: Option<&mut [u32]>) -> Result<()> {
        match &self.link {
            Link::Rank { to_root, .. } => to_root
                .send(Gathered::Part {
                    rank: self.rank,
                    part: local.to_vec(),
                })
                .map_err(|_| KmeansError::collective("gather", self.rank, "root hung up")),
            Link::Root { parts, .. } => {
                let table = table.ok_or_else(|| {
                    KmeansError::collective("gather", ROOT, "root called gather without a table")
                })?;
                let n = table.len();
                let own = partition_range(n, ROOT, self.size);
                if own.len() != local.len() {
                    return Err(KmeansError::collective(
                        "gather",
                        ROOT,
                        format!("expected {} entries, got {}", own.len(), local.len()),
                    ));
                }
                table[own].copy_from_slice(local);
                for _ in 1..self.size {
                    let msg = parts.recv().map_err(|_| {
                        KmeansError::collective("gather", ROOT, "every rank hung up")
                    })?;
                    match msg {
                        Gathered::Part { rank, part } => {
                            let r = partition_range(n, rank, self.size);
                            if r.len() != part.len() {
                                return Err(KmeansError::collective(
                                    "gather",
                                    rank,
                                    format!("expected {} entries, got {}", r.len(), part.len()),
                                ));
                            }
                            table[r].copy_from_slice(&part);
                        }
                        Gathered::Failed { rank, reason } => {
                            return Err(KmeansError::collective("gather", rank, reason));
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn broadcast(&self, centroids: &mut Vec<Point>) -> Result<()> {
        match &self.link {
            Link::Root { peers, .. } => {
                let shared: Arc<[Point]> = Arc::from(centroids.as_slice());
                for (i, peer) in peers.iter().enumerate() {
                    peer.send(Arc::clone(&shared)).map_err(|_| {
                        KmeansError::collective("broadcast", i + 1, "rank hung up")
                    })?;
                }
                Ok(())
            }
            Link::Rank { from_root, .. } => {
                let shared = from_root
                    .recv()
                    .map_err(|_| KmeansError::collective("broadcast", self.rank, "root hung up"))?;
                centroids.clear();
                centroids.extend_from_slice(&shared);
                Ok(())
            }
        }
    }
}

/// The per-rank program: assign own range, gather, wait for the broadcast.
/// No rank starts the next Assignment Step before it holds the new centroids.
pub fn run_rank<C: Communicator>(
    comm: &C,
    data: &[Point],
    mut centroids: Vec<Point>,
    iterations: usize,
) -> Result<Vec<Point>> {
    let range = partition_range(data.len(), comm.rank(), comm.size());
    let mut local = vec![0u32; range.len()];
    for iteration in 0..iterations {
        assign(&data[range.clone()], &centroids, &mut local);
        comm.gather(&local, None)?;
        comm.broadcast(&mut centroids)?;
        debug!(rank = comm.rank(), iteration, "rank iteration done");
    }
    Ok(centroids)
}

/// Distributed backend with one thread per non-root rank.
pub struct DistributedBackend {
    ranks: usize,
    root: Option<ChannelCommunicator>,
    handles: Vec<JoinHandle<()>>,
    local: Vec<u32>,
}

impl DistributedBackend {
    pub fn new(ranks: usize) -> Self {
        DistributedBackend {
            ranks: ranks.max(1),
            root: None,
            handles: Vec::new(),
            local: Vec::new(),
        }
    }

    fn root(&self) -> Result<&ChannelCommunicator> {
        self.root.as_ref().ok_or_else(|| {
            KmeansError::collective("assign", ROOT, "process group not started; call prepare first")
        })
    }

    fn shutdown(&mut self) -> Vec<usize> {
        self.root = None;
        let mut failed = Vec::new();
        for (i, h) in self.handles.drain(..).enumerate() {
            if h.join().is_err() {
                failed.push(i + 1);
            }
        }
        failed
    }
}

impl Backend for DistributedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Distributed
    }

    fn workers(&self) -> usize {
        self.ranks
    }

    fn prepare(&mut self, data: &[Point], centroids: &[Point], iterations: usize) -> Result<()> {
        self.shutdown();
        let mut group = ChannelCommunicator::group(self.ranks).into_iter();
        let root = group.next().ok_or_else(|| {
            KmeansError::collective("init", ROOT, "empty process group")
        })?;
        // every rank loads its own copy, like separate processes reading the input files
        let shared: Arc<[Point]> = Arc::from(data);
        for comm in group {
            let rank = comm.rank();
            let data = Arc::clone(&shared);
            let centroids = centroids.to_vec();
            let handle = std::thread::Builder::new()
                .name(format!("rank-{}", rank))
                .spawn(move || {
                    let res = catch_unwind(AssertUnwindSafe(|| {
                        run_rank(&comm, &data, centroids, iterations)
                    }));
                    match res {
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => comm.abort(e.to_string()),
                        Err(_) => comm.abort("rank panicked".to_string()),
                    }
                })
                .map_err(|e| KmeansError::collective("init", rank, e.to_string()))?;
            self.handles.push(handle);
        }
        self.root = Some(root);
        info!(ranks = self.ranks, "process group started");
        Ok(())
    }

    fn assign(&mut self, data: &[Point], centroids: &[Point], table: &mut [u32]) -> Result<()> {
        let range = partition_range(data.len(), ROOT, self.ranks);
        self.local.resize(range.len(), 0);
        assign(&data[range], centroids, &mut self.local);
        let root = self.root()?;
        root.gather(&self.local, Some(table))
    }

    fn broadcast(&mut self, centroids: &[Point]) -> Result<()> {
        let mut buf = centroids.to_vec();
        self.root()?.broadcast(&mut buf)
    }

    fn finish(&mut self) -> Result<()> {
        let failed = self.shutdown();
        match failed.first() {
            Some(&rank) => Err(KmeansError::collective("finalize", rank, "rank thread panicked")),
            None => Ok(()),
        }
    }
}

impl Drop for DistributedBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}
