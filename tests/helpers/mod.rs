// tests/helpers/mod.rs
use lloyd::utilities::structs::Point;

/// Check two numbers are close within a simple absolute tolerance.
#[allow(dead_code)]
pub fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

/// Same as `approx_eq` for both coordinates.
#[allow(dead_code)]
pub fn approx_point(a: Point, b: Point, tol: f32) -> bool {
    approx_eq(a.x, b.x, tol) && approx_eq(a.y, b.y, tol)
}

#[allow(dead_code)]
pub fn pts(v: &[(f32, f32)]) -> Vec<Point> {
    v.iter().map(|&p| p.into()).collect()
}

#[allow(dead_code)]
fn lcg(s: &mut u64) -> f64 {
    *s = s
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    ((*s >> 11) as f64) * (1.0 / (1u64 << 53) as f64)
}

// Deterministic uniform points in [lo, hi]²
#[allow(dead_code)]
pub fn uniform_points(n: usize, lo: f32, hi: f32, seed: u64) -> Vec<Point> {
    assert!(hi > lo);
    let mut s = seed | 1; // odd
    let span = (hi - lo) as f64;
    (0..n)
        .map(|_| {
            let x = lo as f64 + span * lcg(&mut s);
            let y = lo as f64 + span * lcg(&mut s);
            Point::new(x as f32, y as f32)
        })
        .collect()
}

/// Points scattered in a square of half-width `spread` around each centre.
#[allow(dead_code)]
pub fn blobs(centres: &[(f32, f32)], per: usize, spread: f32, seed: u64) -> Vec<Point> {
    let mut s = seed | 1;
    let mut out = Vec::with_capacity(centres.len() * per);
    for &(cx, cy) in centres {
        for _ in 0..per {
            let dx = (lcg(&mut s) - 0.5) as f32 * 2.0 * spread;
            let dy = (lcg(&mut s) - 0.5) as f32 * 2.0 * spread;
            out.push(Point::new(cx + dx, cy + dy));
        }
    }
    out
}

/// The four-point set that is already a fixed point for centroids (0, 0.5), (10, 0.5).
#[allow(dead_code)]
pub fn fixed_point_case() -> (Vec<Point>, Vec<Point>) {
    (
        pts(&[(0.0, 0.0), (0.0, 1.0), (10.0, 0.0), (10.0, 1.0)]),
        pts(&[(0.0, 0.5), (10.0, 0.5)]),
    )
}
