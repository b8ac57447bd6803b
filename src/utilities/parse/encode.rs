use std::path::Path;

use crate::utilities::error::{KmeansError, Result};
use crate::utilities::parse::helper::{payload_len, set_f32_at, set_i32_at, set_u32_at};
use crate::utilities::structs::Point;

#[inline]
fn count_u32(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| KmeansError::Format(format!("{n} records do not fit a u32 count")))
}

pub fn encode_points(points: &[Point]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; payload_len(points.len(), 8)?];
    set_u32_at(&mut out, 0, count_u32(points.len())?);
    let mut cur = 4;
    for p in points {
        set_f32_at(&mut out, cur, p.x);
        set_f32_at(&mut out, cur + 4, p.y);
        cur += 8;
    }
    Ok(out)
}

/// Cluster indices are written as i32, the on-disk type.
pub fn encode_assignments(table: &[u32]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; payload_len(table.len(), 4)?];
    set_u32_at(&mut out, 0, count_u32(table.len())?);
    for (i, &c) in table.iter().enumerate() {
        let v = i32::try_from(c)
            .map_err(|_| KmeansError::Format(format!("cluster index {c} exceeds i32")))?;
        set_i32_at(&mut out, 4 + i * 4, v);
    }
    Ok(out)
}

pub fn write_points(path: impl AsRef<Path>, points: &[Point]) -> Result<()> {
    let path = path.as_ref();
    let bin = encode_points(points)?;
    std::fs::write(path, bin).map_err(|e| KmeansError::io(path, e))
}

pub fn write_assignments(path: impl AsRef<Path>, table: &[u32]) -> Result<()> {
    let path = path.as_ref();
    let bin = encode_assignments(table)?;
    std::fs::write(path, bin).map_err(|e| KmeansError::io(path, e))
}
