use crate::utilities::assign::assign;
use crate::utilities::backend::{Backend, BackendKind};
use crate::utilities::error::Result;
use crate::utilities::structs::Point;

/// Single pass on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialBackend;

impl Backend for SequentialBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sequential
    }

    fn assign(&mut self, data: &[Point], centroids: &[Point], table: &mut [u32]) -> Result<()> {
        assign(data, centroids, table);
        Ok(())
    }
}
