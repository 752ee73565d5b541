//! Pareto utilities for trading objectives against each other.
//!
//! The beamformer serves two masters: the communication link wants gain
//! toward one direction, the sensing function wants gain toward several
//! others. These helpers rank a set of solutions by Pareto dominance so
//! callers can inspect the trade-off instead of a single weighted sum.
//!
//! All objectives are **maximized**.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"

use std::cmp::Ordering;

/// Pareto ranks of a set of solutions.
///
/// Rank 0 is the non-dominated front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParetoRanking {
    /// Pareto rank for each solution.
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` holds the rank-0 indices.
    pub fronts: Vec<Vec<usize>>,
}

impl ParetoRanking {
    /// Indices of the non-dominated solutions, in input order.
    pub fn front(&self) -> &[usize] {
        self.fronts.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Fast non-dominated sorting (Deb et al., 2002).
///
/// `objectives[i]` holds the objective values of solution `i`; every row
/// must have the same length. An empty input yields an empty ranking.
///
/// # Example
///
/// ```
/// use u_beamga::ga::multi_objective::non_dominated_sort;
///
/// // (comm gain, sensing gain)
/// let objectives = vec![
///     vec![4.0, 0.5],
///     vec![3.0, 1.5],
///     vec![1.0, 2.0],
///     vec![2.5, 1.0], // worse than (3.0, 1.5) on both
/// ];
/// let ranking = non_dominated_sort(&objectives);
/// assert_eq!(ranking.front(), &[0, 1, 2]);
/// assert_eq!(ranking.ranks[3], 1);
/// ```
pub fn non_dominated_sort(objectives: &[Vec<f64>]) -> ParetoRanking {
    let n = objectives.len();
    let mut ranks = vec![0usize; n];
    if n == 0 {
        return ParetoRanking {
            ranks,
            fronts: Vec::new(),
        };
    }
    debug_assert!(
        objectives.iter().all(|o| o.len() == objectives[0].len()),
        "all objective vectors must have the same length"
    );

    let mut dominated_count = vec![0usize; n];
    let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            match compare(&objectives[i], &objectives[j]) {
                Some(Ordering::Greater) => {
                    dominates[i].push(j);
                    dominated_count[j] += 1;
                }
                Some(Ordering::Less) => {
                    dominates[j].push(i);
                    dominated_count[i] += 1;
                }
                _ => {}
            }
        }
    }

    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| dominated_count[i] == 0).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            ranks[i] = fronts.len();
            for &j in &dominates[i] {
                dominated_count[j] -= 1;
                if dominated_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }

    ParetoRanking { ranks, fronts }
}

/// Dominance between two objective vectors.
///
/// `Greater` means `a` dominates `b`: no worse anywhere, better somewhere.
/// `None` means neither dominates (including equal vectors).
fn compare(a: &[f64], b: &[f64]) -> Option<Ordering> {
    let mut a_better = false;
    let mut b_better = false;
    for (&va, &vb) in a.iter().zip(b) {
        if va > vb {
            a_better = true;
        } else if vb > va {
            b_better = true;
        }
    }
    match (a_better, b_better) {
        (true, false) => Some(Ordering::Greater),
        (false, true) => Some(Ordering::Less),
        _ => None,
    }
}

/// Crowding distance of each solution within one front.
///
/// Solutions at either extreme of any objective get `f64::INFINITY`;
/// interior ones sum the normalized gap between their neighbours.
pub fn crowding_distance(objectives: &[Vec<f64>]) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].len();
    let mut distances = vec![0.0f64; n];
    for k in 0..m {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            objectives[a][k]
                .partial_cmp(&objectives[b][k])
                .unwrap_or(Ordering::Equal)
        });

        distances[order[0]] = f64::INFINITY;
        distances[order[n - 1]] = f64::INFINITY;

        let range = objectives[order[n - 1]][k] - objectives[order[0]][k];
        if range > 0.0 {
            for w in order.windows(3) {
                distances[w[1]] += (objectives[w[2]][k] - objectives[w[0]][k]) / range;
            }
        }
    }
    distances
}
