use std::ops::Range;

/// Indices owned by worker `t` of `parts`: `⌊n·t/parts⌋ .. ⌊n·(t+1)/parts⌋`.
/// Products are taken in u128 so large `n` cannot overflow.
#[inline]
pub fn partition_range(n: usize, t: usize, parts: usize) -> Range<usize> {
    debug_assert!(parts > 0 && t < parts);
    let lo = (n as u128 * t as u128 / parts as u128) as usize;
    let hi = (n as u128 * (t as u128 + 1) / parts as u128) as usize;
    lo..hi
}

pub fn partition_ranges(n: usize, parts: usize) -> Vec<Range<usize>> {
    (0..parts).map(|t| partition_range(n, t, parts)).collect()
}

/// Cuts `table` into the disjoint mutable pieces described by
/// `partition_ranges(table.len(), parts)`.
pub fn split_table(table: &mut [u32], parts: usize) -> Vec<(Range<usize>, &mut [u32])> {
    let n = table.len();
    let mut out = Vec::with_capacity(parts);
    let mut rest = table;
    for r in partition_ranges(n, parts) {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(r.len());
        out.push((r, head));
        rest = tail;
    }
    out
}
