use crate::utilities::error::{KmeansError, Result};

#[inline]
pub fn set_u32_at(buf: &mut [u8], pos: usize, val: u32) {
    buf[pos..pos + 4].copy_from_slice(&val.to_le_bytes());
}
#[inline]
pub fn set_i32_at(buf: &mut [u8], pos: usize, val: i32) {
    buf[pos..pos + 4].copy_from_slice(&val.to_le_bytes());
}
#[inline]
pub fn set_f32_at(buf: &mut [u8], pos: usize, val: f32) {
    buf[pos..pos + 4].copy_from_slice(&val.to_le_bytes());
}
#[inline]
fn word(b: &[u8], p: usize) -> Option<[u8; 4]> {
    let end = p.checked_add(4)?;
    b.get(p..end)?.try_into().ok()
}
#[inline]
pub fn rd_u32(b: &[u8], p: usize) -> Result<u32> {
    word(b, p)
        .map(u32::from_le_bytes)
        .ok_or_else(|| KmeansError::Format("u32 OOB".into()))
}
#[inline]
pub fn rd_i32(b: &[u8], p: usize) -> Result<i32> {
    word(b, p)
        .map(i32::from_le_bytes)
        .ok_or_else(|| KmeansError::Format("i32 OOB".into()))
}
#[inline]
pub fn rd_f32(b: &[u8], p: usize) -> Result<f32> {
    word(b, p)
        .map(f32::from_le_bytes)
        .ok_or_else(|| KmeansError::Format("f32 OOB".into()))
}

/// Bytes needed for a `u32` header plus `count` records of `rec` bytes.
#[inline]
pub fn payload_len(count: usize, rec: usize) -> Result<usize> {
    count
        .checked_mul(rec)
        .and_then(|n| n.checked_add(4))
        .ok_or_else(|| KmeansError::Format("count overflow".into()))
}
