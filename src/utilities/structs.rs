use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A 2-D point. Centroids share the same layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyClusterEvent {
    pub iteration: usize,
    pub cluster: usize,
}

/// What one Reduction Step observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduceStats {
    pub empty: Vec<usize>,
}

/// Final state handed back to the caller after the fixed iteration count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clustering {
    pub centroids: Vec<Point>,
    pub table: Vec<u32>,
    pub iterations: usize,
    pub backend: String,
    pub empty_events: Vec<EmptyClusterEvent>,
}
