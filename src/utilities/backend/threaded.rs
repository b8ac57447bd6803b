use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::utilities::assign::assign;
use crate::utilities::backend::{Backend, BackendKind};
use crate::utilities::error::Result;
use crate::utilities::partition::split_table;
use crate::utilities::structs::Point;

/// Shared-memory backend. The pool lives as long as the backend, so worker
/// threads are created once per run rather than once per iteration.
pub struct ThreadedBackend {
    pool: ThreadPool,
    workers: usize,
}

impl ThreadedBackend {
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("lloyd-{}", i))
            .build()?;
        debug!(workers, "threaded backend ready");
        Ok(ThreadedBackend { pool, workers })
    }
}

impl Backend for ThreadedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Threaded
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn assign(&mut self, data: &[Point], centroids: &[Point], table: &mut [u32]) -> Result<()> {
        let parts = split_table(table, self.workers);
        // scope() returns only after every spawned range finished
        self.pool.scope(|s| {
            for (range, slice) in parts {
                let chunk = &data[range];
                s.spawn(move |_| assign(chunk, centroids, slice));
            }
        });
        Ok(())
    }
}
