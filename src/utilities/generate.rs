use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::utilities::error::{KmeansError, Result};
use crate::utilities::structs::Point;

pub const DATA_MIN: f32 = 0.0;
pub const DATA_MAX: f32 = 100.0;

const SIGMA: f32 = 1.0;
const PERTURBATION: f64 = 0.05;
const SIZE_SPREAD: f64 = 5.0;

/// `n` points drawn uniformly from `[DATA_MIN, DATA_MAX)²`.
pub fn uniform_points<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<Point> {
    (0..n)
        .map(|_| {
            Point::new(
                rng.gen_range(DATA_MIN..DATA_MAX),
                rng.gen_range(DATA_MIN..DATA_MAX),
            )
        })
        .collect()
}

/// `n` points in roughly `clusters` Gaussian blobs.
///
/// Each blob starts at a uniform seed point, followed by a Normal-sized run
/// of samples around the current centre; the centre drifts to the latest
/// sample with probability 0.05.
pub fn blob_points<R: Rng + ?Sized>(rng: &mut R, n: usize, clusters: usize) -> Result<Vec<Point>> {
    if clusters == 0 {
        return Err(KmeansError::invalid("cluster count must be positive"));
    }
    let jitter = Normal::new(0.0f32, SIGMA).map_err(|e| KmeansError::invalid(e.to_string()))?;
    let sizes = Normal::new(n as f64 / clusters as f64, SIZE_SPREAD)
        .map_err(|e| KmeansError::invalid(e.to_string()))?;

    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let mut centre = Point::new(
            rng.gen_range(DATA_MIN..DATA_MAX),
            rng.gen_range(DATA_MIN..DATA_MAX),
        );
        out.push(centre);
        let run = sizes.sample(rng).max(0.0) as usize;
        for _ in 0..run {
            if out.len() >= n {
                break;
            }
            let p = Point::new(centre.x + jitter.sample(rng), centre.y + jitter.sample(rng));
            out.push(p);
            if rng.gen_bool(PERTURBATION) {
                centre = p;
            }
        }
    }
    Ok(out)
}
