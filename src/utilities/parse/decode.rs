use std::path::Path;

use crate::utilities::error::{KmeansError, Result};
use crate::utilities::parse::helper::{payload_len, rd_f32, rd_i32, rd_u32};
use crate::utilities::structs::Point;

/// Decodes a points file. Bytes past the declared count are ignored.
pub fn decode_points(bin: &[u8]) -> Result<Vec<Point>> {
    if bin.len() < 4 {
        return Err(KmeansError::Format("error reading file size".into()));
    }
    let n = rd_u32(bin, 0)? as usize;
    if payload_len(n, 8)? > bin.len() {
        return Err(KmeansError::Format("error reading data".into()));
    }
    let mut out = Vec::with_capacity(n);
    let mut p = 4;
    for _ in 0..n {
        out.push(Point::new(rd_f32(bin, p)?, rd_f32(bin, p + 4)?));
        p += 8;
    }
    Ok(out)
}

/// Decodes an assignment file. Negative indices are rejected.
pub fn decode_assignments(bin: &[u8]) -> Result<Vec<u32>> {
    if bin.len() < 4 {
        return Err(KmeansError::Format("error reading file size".into()));
    }
    let n = rd_u32(bin, 0)? as usize;
    if payload_len(n, 4)? > bin.len() {
        return Err(KmeansError::Format("error reading data".into()));
    }
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let v = rd_i32(bin, 4 + i * 4)?;
        let v = u32::try_from(v)
            .map_err(|_| KmeansError::Format(format!("negative cluster index {v} at {i}")))?;
        out.push(v);
    }
    Ok(out)
}

pub fn read_points(path: impl AsRef<Path>) -> Result<Vec<Point>> {
    let path = path.as_ref();
    let bin = std::fs::read(path).map_err(|e| KmeansError::io(path, e))?;
    decode_points(&bin)
}

pub fn read_assignments(path: impl AsRef<Path>) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let bin = std::fs::read(path).map_err(|e| KmeansError::io(path, e))?;
    decode_assignments(&bin)
}
