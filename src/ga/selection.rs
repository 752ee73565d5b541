//! Selection strategies for the GA.
//!
//! Selection determines which individuals are chosen as parents for
//! crossover. Different strategies provide different selection pressure.
//! Fitness is maximized; unevaluated individuals rank below all others.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::Individual;
use crate::error::{ConfigError, Result};
use rand::Rng;

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use u_beamga::ga::Selection;
///
/// // Tournament with size 3 (moderate selection pressure)
/// let sel = Selection::Tournament(3);
///
/// // Roulette wheel (fitness-proportionate)
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: draw `k` individuals uniformly with
    /// replacement, keep the fittest.
    ///
    /// Ties go to the first contestant drawn with the maximal fitness.
    /// - k=2: light pressure (good for diversity)
    /// - k=3-5: moderate pressure (typical default)
    /// - k>5: strong pressure (risk of premature convergence)
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Fitness values are shifted so the minimum becomes 1, which keeps
    /// every weight positive even when fitness is negative.
    ///
    /// # Complexity
    /// O(n) per selection (linear scan)
    Roulette,

    /// Linear rank selection.
    ///
    /// Individuals are sorted by fitness and selection probability is
    /// proportional to rank position, not raw fitness value.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    ///
    /// # Complexity
    /// O(n log n) per selection
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Checks strategy parameters.
    pub fn validate(&self) -> Result<()> {
        if let Selection::Tournament(0) = self {
            return Err(ConfigError::NonPositive {
                field: "selection.tournament_size",
            });
        }
        Ok(())
    }

    /// Select a parent index from the population.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        match self {
            Selection::Tournament(k) => tournament(population, *k, rng),
            Selection::Roulette => roulette(population, rng),
            Selection::Rank => rank(population, rng),
        }
    }
}

/// Tournament selection: pick k random individuals, return the fittest.
fn tournament<I: Individual, R: Rng>(population: &[I], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness_or_worst() > population[best_idx].fitness_or_worst() {
            best_idx = idx;
        }
    }
    best_idx
}

/// Reverse tournament: pick k random individuals, return the least fit.
///
/// Used by steady-state replacement to choose which slot to overwrite.
pub(crate) fn reverse_tournament<I: Individual, R: Rng>(
    population: &[I],
    k: usize,
    rng: &mut R,
) -> usize {
    let k = k.max(1);
    let n = population.len();

    let mut worst_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness_or_worst() < population[worst_idx].fitness_or_worst() {
            worst_idx = idx;
        }
    }
    worst_idx
}

/// Roulette wheel selection on fitness shifted so the minimum is 1.
fn roulette<I: Individual, R: Rng>(population: &[I], rng: &mut R) -> usize {
    let n = population.len();
    if n == 1 {
        return 0;
    }

    let fitnesses: Vec<f64> = population
        .iter()
        .map(|ind| ind.fitness_or_worst())
        .collect();

    let min_fitness = fitnesses
        .iter()
        .cloned()
        .filter(|f| f.is_finite())
        .fold(f64::INFINITY, f64::min);
    if !min_fitness.is_finite() {
        return rng.random_range(0..n);
    }

    // Unevaluated individuals keep a zero weight
    let weights: Vec<f64> = fitnesses
        .iter()
        .map(|&f| if f.is_finite() { f - min_fitness + 1.0 } else { 0.0 })
        .collect();

    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

/// Rank-based selection using linear ranking.
///
/// Individuals are sorted by fitness (best first), then selection
/// probability is proportional to rank.
fn rank<I: Individual, R: Rng>(population: &[I], rng: &mut R) -> usize {
    let n = population.len();
    if n == 1 {
        return 0;
    }

    // Build (index, fitness) pairs and sort by fitness descending (best first)
    let mut indexed: Vec<(usize, f64)> = population
        .iter()
        .enumerate()
        .map(|(i, ind)| (i, ind.fitness_or_worst()))
        .collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    // Linear ranking: rank 0 (best) gets highest weight
    // weight_i = n - rank_i
    let total: f64 = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (rank, &(original_idx, _)) in indexed.iter().enumerate() {
        let weight = (n - rank) as f64;
        cumulative += weight;
        if cumulative > threshold {
            return original_idx;
        }
    }

    indexed.last().expect("population has n >= 2 elements").0 // fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[derive(Clone)]
    struct TestInd {
        fit: Option<f64>,
    }

    impl Individual for TestInd {
        fn fitness(&self) -> Option<f64> {
            self.fit
        }
        fn set_fitness(&mut self, f: f64) {
            self.fit = Some(f);
        }
        fn invalidate_fitness(&mut self) {
            self.fit = None;
        }
    }

    fn make_population(fitnesses: &[f64]) -> Vec<TestInd> {
        fitnesses.iter().map(|&f| TestInd { fit: Some(f) }).collect()
    }

    #[test]
    fn test_tournament_favors_best() {
        let pop = make_population(&[1.0, 5.0, 10.0, 8.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            let idx = Selection::Tournament(4).select(&pop, &mut rng);
            counts[idx] += 1;
        }
        // Index 2 (fitness=10.0) should dominate: 1 - (3/4)^4 ≈ 68%
        let best_count = counts[2];
        assert!(
            best_count > 6000,
            "expected best to be selected >60% of the time, got {best_count}/{n}"
        );
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let pop = make_population(&[10.0, 5.0, 1.0, 8.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            let idx = Selection::Tournament(1).select(&pop, &mut rng);
            counts[idx] += 1;
        }
        for &c in &counts {
            assert!(c > 1500, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_tournament_tie_goes_to_first_drawn() {
        // With all fitness equal, the first draw always wins, so the
        // selection is exactly the first index the stream produces.
        let pop = make_population(&[5.0; 6]);
        let mut a = create_rng(99);
        let mut b = create_rng(99);
        for _ in 0..100 {
            let chosen = Selection::Tournament(3).select(&pop, &mut a);
            let first = b.random_range(0..6);
            let _ = b.random_range(0..6);
            let _ = b.random_range(0..6);
            assert_eq!(chosen, first);
        }
    }

    #[test]
    fn test_unevaluated_never_wins_tournament_against_evaluated() {
        let pop = vec![TestInd { fit: None }, TestInd { fit: Some(-1e9) }];
        let mut rng = create_rng(5);
        // index 0 can only win when all 8 draws land on it (p = 1/256)
        let wins = (0..200)
            .filter(|_| Selection::Tournament(8).select(&pop, &mut rng) == 1)
            .count();
        assert!(wins > 180, "evaluated individual won only {wins}/200");
    }

    #[test]
    fn test_roulette_favors_best_with_negative_fitness() {
        let pop = make_population(&[-100.0, -50.0, 1.0, -80.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            let idx = Selection::Roulette.select(&pop, &mut rng);
            counts[idx] += 1;
        }
        // shifted weights: 1, 51, 102, 21
        assert!(counts[2] > counts[1]);
        assert!(counts[1] > counts[0]);
        assert!(counts[0] < 300, "minimum should keep a tiny weight: {counts:?}");
    }

    #[test]
    fn test_rank_favors_best() {
        let pop = make_population(&[1.0, 50.0, 100.0, 80.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            let idx = Selection::Rank.select(&pop, &mut rng);
            counts[idx] += 1;
        }
        assert!(
            counts[2] > counts[0],
            "best should be selected more: best={}, worst={}",
            counts[2],
            counts[0]
        );
    }

    #[test]
    fn test_reverse_tournament_finds_worst() {
        let pop = make_population(&[3.0, -2.0, 7.0]);
        let mut rng = create_rng(1);
        let mut counts = [0u32; 3];
        for _ in 0..3000 {
            counts[reverse_tournament(&pop, 5, &mut rng)] += 1;
        }
        assert!(counts[1] > counts[0] && counts[1] > counts[2]);
    }

    #[test]
    fn test_single_individual() {
        let pop = make_population(&[5.0]);
        let mut rng = create_rng(42);

        assert_eq!(Selection::Tournament(3).select(&pop, &mut rng), 0);
        assert_eq!(Selection::Roulette.select(&pop, &mut rng), 0);
        assert_eq!(Selection::Rank.select(&pop, &mut rng), 0);
    }

    #[test]
    fn test_zero_tournament_is_invalid() {
        assert!(Selection::Tournament(0).validate().is_err());
        assert!(Selection::Tournament(2).validate().is_ok());
        assert!(Selection::Roulette.validate().is_ok());
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let pop: Vec<TestInd> = vec![];
        let mut rng = create_rng(42);
        Selection::Tournament(3).select(&pop, &mut rng);
    }
}
