use crate::utilities::distance::squared_distance;
use crate::utilities::structs::Point;

/// Index of the closest centroid. Scans in increasing order with a strict
/// `<`, so ties resolve to the lowest index. A point whose every distance
/// overflows to infinity (or is NaN) lands in cluster 0.
#[inline]
pub fn nearest_centroid(p: &Point, centroids: &[Point]) -> u32 {
    let mut idx = 0u32;
    let mut best = f32::MAX;
    for (j, c) in centroids.iter().enumerate() {
        let d = squared_distance(p, c);
        if d < best {
            best = d;
            idx = j as u32;
        }
    }
    idx
}

/// Assignment Step over one contiguous slice: `table[i]` receives the cluster
/// of `data[i]`. Both slices must have the same length.
pub fn assign(data: &[Point], centroids: &[Point], table: &mut [u32]) {
    debug_assert_eq!(data.len(), table.len());
    for (p, slot) in data.iter().zip(table.iter_mut()) {
        *slot = nearest_centroid(p, centroids);
    }
}
