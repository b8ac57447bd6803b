//! Little-endian binary files exchanged with the clustering core.
//!
//! Points file: `u32 count`, then `count` `(x, y)` f32 pairs. Used for the
//! initial centroids, the data set and the final centroids.
//! Assignment file: `u32 count`, then `count` i32 cluster indices.

pub mod decode;
pub mod encode;
pub mod helper;

pub use decode::{decode_assignments, decode_points, read_assignments, read_points};
pub use encode::{encode_assignments, encode_points, write_assignments, write_points};
