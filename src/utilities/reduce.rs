use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utilities::error::{KmeansError, Result};
use crate::utilities::structs::{Point, ReduceStats};

/// What happens to a centroid whose cluster received no points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyClusterPolicy {
    /// Keep the centroid from the previous iteration.
    #[default]
    Freeze,
    /// Stop the run with `KmeansError::EmptyCluster`.
    Fail,
}

impl std::str::FromStr for EmptyClusterPolicy {
    type Err = KmeansError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "freeze" => Ok(EmptyClusterPolicy::Freeze),
            "fail" => Ok(EmptyClusterPolicy::Fail),
            other => Err(KmeansError::invalid(format!(
                "unknown empty-cluster policy '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub sum_x: f32,
    pub sum_y: f32,
    pub count: u32,
}

impl Accumulator {
    #[inline]
    pub fn add(&mut self, p: &Point) {
        self.sum_x += p.x;
        self.sum_y += p.y;
        self.count += 1;
    }

    #[inline]
    pub fn mean(&self) -> Option<Point> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f32;
        Some(Point::new(self.sum_x / n, self.sum_y / n))
    }
}

/// Per-cluster sums in point order `0..N`.
pub fn accumulate(data: &[Point], table: &[u32], k: usize) -> Result<Vec<Accumulator>> {
    if data.len() != table.len() {
        return Err(KmeansError::invalid(format!(
            "table length {} does not match data length {}",
            table.len(),
            data.len()
        )));
    }
    let mut acc = vec![Accumulator::default(); k];
    for (p, &c) in data.iter().zip(table) {
        let slot = acc.get_mut(c as usize).ok_or_else(|| {
            KmeansError::invalid(format!("assignment {c} out of range for {k} clusters"))
        })?;
        slot.add(p);
    }
    Ok(acc)
}

/// Reduction Step: every centroid becomes the mean of its assigned points.
/// Empty clusters follow `policy`.
pub fn reduce(
    data: &[Point],
    table: &[u32],
    centroids: &mut [Point],
    policy: EmptyClusterPolicy,
    iteration: usize,
) -> Result<ReduceStats> {
    let acc = accumulate(data, table, centroids.len())?;
    let mut stats = ReduceStats::default();
    for (j, (a, c)) in acc.iter().zip(centroids.iter_mut()).enumerate() {
        match a.mean() {
            Some(m) => *c = m,
            None => match policy {
                EmptyClusterPolicy::Freeze => {
                    warn!(cluster = j, iteration, "empty cluster, keeping previous centroid");
                    stats.empty.push(j);
                }
                EmptyClusterPolicy::Fail => {
                    return Err(KmeansError::EmptyCluster {
                        cluster: j,
                        iteration,
                    });
                }
            },
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(f32, f32)]) -> Vec<Point> {
        v.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn means_per_cluster() {
        let data = pts(&[(0.0, 0.0), (2.0, 2.0), (10.0, 0.0), (12.0, 4.0)]);
        let table = [0, 0, 1, 1];
        let mut cs = pts(&[(0.0, 0.0), (0.0, 0.0)]);
        let st = reduce(&data, &table, &mut cs, EmptyClusterPolicy::Freeze, 0).unwrap();
        assert!(st.empty.is_empty());
        assert_eq!(cs, pts(&[(1.0, 1.0), (11.0, 2.0)]));
    }

    #[test]
    fn freeze_keeps_previous_value() {
        let data = pts(&[(1.0, 1.0), (3.0, 3.0)]);
        let table = [0, 0];
        let mut cs = pts(&[(0.0, 0.0), (50.0, 60.0)]);
        let st = reduce(&data, &table, &mut cs, EmptyClusterPolicy::Freeze, 4).unwrap();
        assert_eq!(st.empty, vec![1]);
        assert_eq!(cs[0], Point::new(2.0, 2.0));
        assert_eq!(cs[1], Point::new(50.0, 60.0));
        assert!(cs.iter().all(|c| c.x.is_finite() && c.y.is_finite()));
    }

    #[test]
    fn fail_reports_cluster_and_iteration() {
        let data = pts(&[(1.0, 1.0)]);
        let mut cs = pts(&[(0.0, 0.0), (5.0, 5.0), (9.0, 9.0)]);
        let err = reduce(&data, &[0], &mut cs, EmptyClusterPolicy::Fail, 7).unwrap_err();
        match err {
            KmeansError::EmptyCluster { cluster, iteration } => {
                assert_eq!(cluster, 1);
                assert_eq!(iteration, 7);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_assignment() {
        let data = pts(&[(1.0, 1.0)]);
        let mut cs = pts(&[(0.0, 0.0)]);
        assert!(reduce(&data, &[3], &mut cs, EmptyClusterPolicy::Freeze, 0).is_err());
        assert!(reduce(&data, &[0, 0], &mut cs, EmptyClusterPolicy::Freeze, 0).is_err());
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Freeze".parse::<EmptyClusterPolicy>().unwrap(), EmptyClusterPolicy::Freeze);
        assert_eq!("FAIL".parse::<EmptyClusterPolicy>().unwrap(), EmptyClusterPolicy::Fail);
        assert!("reseed".parse::<EmptyClusterPolicy>().is_err());
    }
}
