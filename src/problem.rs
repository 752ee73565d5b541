//! The beamforming optimization problem.
//!
//! A [`Scenario`] fixes the array and the directions to serve. A
//! [`BeamProblem`] pairs it with an [`Objective`] and the variation
//! operators, and implements [`GaProblem`] so either driver can optimize
//! it.

use crate::antenna::{combined_response, pattern_with, AngularSweep, Complex, PatternPoint};
use crate::error::{ensure_in_range, ensure_positive, ConfigError, Result};
use crate::fitness::{FitnessBreakdown, Objective};
use crate::ga::multi_objective::{crowding_distance, non_dominated_sort};
use crate::ga::operators::{Crossover, GaussianMutation};
use crate::ga::{GaProblem, Individual};
use crate::weights::WeightVector;
use rand::Rng;

/// How many beams an individual carries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BeamLayout {
    /// One weight vector serves communication and sensing.
    #[default]
    Single,
    /// Separate communication and sensing vectors radiated together, with
    /// `rho` of the power on the communication beam.
    Dual {
        /// Communication power share in `[0, 1]`.
        rho: f64,
    },
}

impl BeamLayout {
    /// Checks the power split.
    pub fn validate(&self) -> Result<()> {
        if let BeamLayout::Dual { rho } = self {
            ensure_in_range("layout.rho", *rho, 0.0, 1.0)?;
        }
        Ok(())
    }

    /// Whether individuals carry a sensing vector.
    pub fn is_dual(&self) -> bool {
        matches!(self, BeamLayout::Dual { .. })
    }
}

/// Array geometry and target directions.
///
/// Angles are in degrees from broadside, within `[-90, 90]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scenario {
    /// Number of antenna elements (M).
    pub antenna_count: usize,
    /// Communication user direction.
    pub comm_direction_deg: f64,
    /// Directions the sensing function must illuminate.
    pub sensing_directions_deg: Vec<f64>,
    /// Single or dual beam.
    pub layout: BeamLayout,
    /// Angular sampling of [`BeamProblem::radiation_pattern`].
    pub pattern_sweep: AngularSweep,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            antenna_count: 16,
            comm_direction_deg: 0.0,
            sensing_directions_deg: vec![30.0, 45.0, 60.0],
            layout: BeamLayout::Single,
            pattern_sweep: AngularSweep::default(),
        }
    }
}

impl Scenario {
    /// Sets the number of antenna elements.
    pub fn with_antenna_count(mut self, m: usize) -> Self {
        self.antenna_count = m;
        self
    }

    /// Sets the communication direction.
    pub fn with_comm_direction(mut self, deg: f64) -> Self {
        self.comm_direction_deg = deg;
        self
    }

    /// Sets the sensing directions.
    pub fn with_sensing_directions(mut self, degs: Vec<f64>) -> Self {
        self.sensing_directions_deg = degs;
        self
    }

    /// Sets the beam layout.
    pub fn with_layout(mut self, layout: BeamLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the radiation pattern sampling.
    pub fn with_pattern_sweep(mut self, sweep: AngularSweep) -> Self {
        self.pattern_sweep = sweep;
        self
    }

    /// The communication direction followed by every sensing direction.
    pub fn steered_directions(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.comm_direction_deg)
            .chain(self.sensing_directions_deg.iter().copied())
    }

    /// Validates element count, directions, layout and sweep.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("antenna_count", self.antenna_count)?;
        ensure_in_range("comm_direction_deg", self.comm_direction_deg, -90.0, 90.0)?;
        for &deg in &self.sensing_directions_deg {
            ensure_in_range("sensing_directions_deg", deg, -90.0, 90.0)?;
        }
        self.layout.validate()?;
        self.pattern_sweep.validate()
    }
}

/// A candidate beamformer.
///
/// Holds the communication weights and, for a dual layout, the sensing
/// weights. Both vectors always have unit power.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeamIndividual {
    comm: WeightVector,
    sensing: Option<WeightVector>,
    fitness: Option<f64>,
    age: usize,
}

impl BeamIndividual {
    /// Single-beam individual.
    pub fn single(comm: WeightVector) -> Self {
        Self {
            comm,
            sensing: None,
            fitness: None,
            age: 0,
        }
    }

    /// Dual-beam individual.
    ///
    /// # Panics
    /// Panics if the vectors differ in length.
    pub fn dual(comm: WeightVector, sensing: WeightVector) -> Self {
        assert_eq!(
            comm.len(),
            sensing.len(),
            "communication and sensing vectors must have equal length"
        );
        Self {
            comm,
            sensing: Some(sensing),
            fitness: None,
            age: 0,
        }
    }

    /// Random individual shaped for `scenario`.
    pub fn random<R: Rng>(scenario: &Scenario, rng: &mut R) -> Self {
        let comm = WeightVector::random(scenario.antenna_count, rng);
        if scenario.layout.is_dual() {
            let sensing = WeightVector::random(scenario.antenna_count, rng);
            Self::dual(comm, sensing)
        } else {
            Self::single(comm)
        }
    }

    /// Communication weights.
    pub fn comm(&self) -> &WeightVector {
        &self.comm
    }

    /// Sensing weights, for dual-beam individuals.
    pub fn sensing(&self) -> Option<&WeightVector> {
        self.sensing.as_ref()
    }

    /// Radiated response toward `angle_deg` under `layout`.
    ///
    /// A dual layout combines both beams with its power split; an
    /// individual without sensing weights radiates its communication beam
    /// alone.
    pub fn response(&self, layout: &BeamLayout, angle_deg: f64) -> Complex {
        match (layout, &self.sensing) {
            (BeamLayout::Dual { rho }, Some(sensing)) => combined_response(
                self.comm.as_slice(),
                sensing.as_slice(),
                *rho,
                angle_deg,
            ),
            _ => self.comm.response(angle_deg),
        }
    }

    /// Euclidean distance over per-element magnitude differences of every
    /// vector the two individuals carry.
    pub fn magnitude_distance(&self, other: &Self) -> f64 {
        let mut sq = self.comm.magnitude_distance_sq(&other.comm);
        if let (Some(a), Some(b)) = (&self.sensing, &other.sensing) {
            sq += a.magnitude_distance_sq(b);
        }
        sq.sqrt()
    }
}

impl Individual for BeamIndividual {
    fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    fn invalidate_fitness(&mut self) {
        self.fitness = None;
    }

    fn age(&self) -> usize {
        self.age
    }

    fn grow_older(&mut self) {
        self.age += 1;
    }

    fn reset_age(&mut self) {
        self.age = 0;
    }
}

/// Beamforming weight optimization for one scenario.
///
/// # Example
///
/// ```
/// use u_beamga::ga::{GenerationalConfig, GenerationalRunner};
/// use u_beamga::problem::{BeamLayout, BeamProblem, Scenario};
///
/// let scenario = Scenario::default()
///     .with_antenna_count(8)
///     .with_layout(BeamLayout::Dual { rho: 0.7 });
/// let problem = BeamProblem::new(scenario).unwrap();
///
/// let config = GenerationalConfig::fast().with_max_generations(10).with_seed(1);
/// let result = GenerationalRunner::run(&problem, &config).unwrap();
/// let breakdown = problem.breakdown(&result.best);
/// assert_eq!(breakdown.fitness, result.best_fitness);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BeamProblem {
    scenario: Scenario,
    objective: Objective,
    crossover: Crossover,
    mutation: GaussianMutation,
}

impl BeamProblem {
    /// Validates `scenario` and pairs it with the default penalty objective,
    /// uniform crossover and Gaussian mutation.
    pub fn new(scenario: Scenario) -> Result<Self> {
        scenario.validate()?;
        Ok(Self {
            scenario,
            objective: Objective::default(),
            crossover: Crossover::default(),
            mutation: GaussianMutation::default(),
        })
    }

    /// Replaces the objective after validating it.
    pub fn with_objective(mut self, objective: Objective) -> Result<Self> {
        objective.validate()?;
        self.objective = objective;
        Ok(self)
    }

    /// Replaces the crossover operator after validating it.
    pub fn with_crossover(mut self, crossover: Crossover) -> Result<Self> {
        crossover.validate()?;
        self.crossover = crossover;
        Ok(self)
    }

    /// Replaces the mutation operator after validating it.
    pub fn with_mutation(mut self, mutation: GaussianMutation) -> Result<Self> {
        mutation.validate()?;
        self.mutation = mutation;
        Ok(self)
    }

    /// The scenario being optimized.
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// The objective in use.
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Fitness of `individual` split into its terms.
    pub fn breakdown(&self, individual: &BeamIndividual) -> FitnessBreakdown {
        self.objective.evaluate_breakdown(&self.scenario, individual)
    }

    /// Radiated pattern of `individual` over the scenario's pattern sweep.
    pub fn radiation_pattern(&self, individual: &BeamIndividual) -> Vec<PatternPoint> {
        pattern_with(&self.scenario.pattern_sweep, |angle| {
            individual.response(&self.scenario.layout, angle)
        })
    }

    /// Indices of the individuals not dominated in
    /// (communication gain, mean sensing gain).
    ///
    /// Gains follow the objective's gain scale. The front is ordered by
    /// decreasing crowding distance, so the two extremes come first and
    /// tightly clustered trade-offs last.
    pub fn tradeoff_front(&self, population: &[BeamIndividual]) -> Vec<usize> {
        let objectives: Vec<Vec<f64>> = population
            .iter()
            .map(|ind| {
                let b = self.breakdown(ind);
                vec![b.comm_gain, b.mean_sensing_gain]
            })
            .collect();
        let front = non_dominated_sort(&objectives).front().to_vec();

        let front_objectives: Vec<Vec<f64>> =
            front.iter().map(|&i| objectives[i].clone()).collect();
        let crowding = crowding_distance(&front_objectives);
        let mut order: Vec<usize> = (0..front.len()).collect();
        order.sort_by(|&a, &b| crowding[b].total_cmp(&crowding[a]));
        order.into_iter().map(|k| front[k]).collect()
    }
}

impl GaProblem for BeamProblem {
    type Individual = BeamIndividual;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> BeamIndividual {
        BeamIndividual::random(&self.scenario, rng)
    }

    fn evaluate(&self, individual: &BeamIndividual) -> f64 {
        self.objective.evaluate(&self.scenario, individual)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &BeamIndividual,
        parent2: &BeamIndividual,
        rng: &mut R,
    ) -> (BeamIndividual, BeamIndividual) {
        let (c1, c2) = self
            .crossover
            .apply(parent1.comm.as_slice(), parent2.comm.as_slice(), rng);
        let (c1, c2) = (WeightVector::new(c1), WeightVector::new(c2));

        match (&parent1.sensing, &parent2.sensing) {
            (Some(s1), Some(s2)) => {
                let (s1, s2) = self.crossover.apply(s1.as_slice(), s2.as_slice(), rng);
                (
                    BeamIndividual::dual(c1, WeightVector::new(s1)),
                    BeamIndividual::dual(c2, WeightVector::new(s2)),
                )
            }
            _ => (BeamIndividual::single(c1), BeamIndividual::single(c2)),
        }
    }

    fn mutate<R: Rng>(&self, individual: &mut BeamIndividual, rate: f64, rng: &mut R) {
        if rate <= 0.0 {
            return;
        }
        let mut mutated = individual
            .comm
            .modify(|w| self.mutation.apply(w, rate, rng));
        if let Some(sensing) = individual.sensing.as_mut() {
            mutated += sensing.modify(|w| self.mutation.apply(w, rate, rng));
        }
        if mutated > 0 {
            individual.invalidate_fitness();
        }
    }

    fn check_individual(&self, individual: &BeamIndividual) -> Result<()> {
        let m = self.scenario.antenna_count;
        if individual.comm.len() != m {
            return Err(ConfigError::Invalid(format!(
                "communication weights have {} elements, expected {m}",
                individual.comm.len()
            )));
        }
        match (&individual.sensing, self.scenario.layout.is_dual()) {
            (Some(s), true) if s.len() != m => Err(ConfigError::Invalid(format!(
                "sensing weights have {} elements, expected {m}",
                s.len()
            ))),
            (Some(_), true) | (None, false) => Ok(()),
            (None, true) => Err(ConfigError::Invalid(
                "dual layout requires sensing weights".into(),
            )),
            (Some(_), false) => Err(ConfigError::Invalid(
                "single layout does not take sensing weights".into(),
            )),
        }
    }

    fn distance(&self, a: &BeamIndividual, b: &BeamIndividual) -> f64 {
        a.magnitude_distance(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::{MaskObjective, PenaltyObjective};
    use crate::random::create_rng;

    const TOL: f64 = 1e-9;

    fn assert_unit_power(ind: &BeamIndividual) {
        assert!((ind.comm().total_power() - 1.0).abs() < TOL);
        if let Some(s) = ind.sensing() {
            assert!((s.total_power() - 1.0).abs() < TOL);
        }
    }

    #[test]
    fn test_scenario_validation() {
        assert!(Scenario::default().validate().is_ok());
        assert!(Scenario::default().with_antenna_count(0).validate().is_err());
        assert!(Scenario::default()
            .with_comm_direction(95.0)
            .validate()
            .is_err());
        assert!(Scenario::default()
            .with_sensing_directions(vec![10.0, -91.0])
            .validate()
            .is_err());
        assert!(Scenario::default()
            .with_layout(BeamLayout::Dual { rho: 1.5 })
            .validate()
            .is_err());
        assert!(BeamProblem::new(Scenario::default().with_antenna_count(0)).is_err());
    }

    #[test]
    fn test_steered_directions() {
        let s = Scenario::default().with_comm_direction(-20.0);
        let dirs: Vec<f64> = s.steered_directions().collect();
        assert_eq!(dirs, vec![-20.0, 30.0, 45.0, 60.0]);
    }

    #[test]
    fn test_random_individual_matches_layout() {
        let mut rng = create_rng(42);
        let single = BeamIndividual::random(&Scenario::default(), &mut rng);
        assert!(single.sensing().is_none());
        assert_eq!(single.comm().len(), 16);
        assert_eq!(single.fitness(), None);

        let dual_scenario = Scenario::default().with_layout(BeamLayout::Dual { rho: 0.5 });
        let dual = BeamIndividual::random(&dual_scenario, &mut rng);
        assert_eq!(dual.sensing().map(|s| s.len()), Some(16));
        assert_unit_power(&dual);
    }

    #[test]
    fn test_operators_preserve_unit_power() {
        let scenario = Scenario::default()
            .with_antenna_count(12)
            .with_layout(BeamLayout::Dual { rho: 0.3 });
        let mut rng = create_rng(7);
        for crossover in [
            Crossover::SinglePoint,
            Crossover::Uniform,
            Crossover::Blend { alpha: 0.5 },
        ] {
            let problem = BeamProblem::new(scenario.clone())
                .unwrap()
                .with_crossover(crossover)
                .unwrap();
            for _ in 0..20 {
                let a = problem.create_individual(&mut rng);
                let b = problem.create_individual(&mut rng);
                let (mut c1, c2) = problem.crossover(&a, &b, &mut rng);
                assert_unit_power(&c1);
                assert_unit_power(&c2);
                assert!(c1.sensing().is_some());
                problem.mutate(&mut c1, 0.5, &mut rng);
                assert_unit_power(&c1);
            }
        }
    }

    #[test]
    fn test_mutation_invalidates_cached_fitness() {
        let problem = BeamProblem::new(Scenario::default()).unwrap();
        let mut rng = create_rng(3);
        let mut ind = problem.create_individual(&mut rng);
        ind.set_fitness(1.0);
        problem.mutate(&mut ind, 1.0, &mut rng);
        assert_eq!(ind.fitness(), None);

        ind.set_fitness(2.0);
        let before = ind.clone();
        problem.mutate(&mut ind, 0.0, &mut rng);
        assert_eq!(ind, before);
    }

    #[test]
    fn test_single_element_response_has_no_steering() {
        let ind = BeamIndividual::single(WeightVector::uniform(1));
        for angle in [-90.0, -30.0, 0.0, 45.0, 90.0] {
            assert!((ind.response(&BeamLayout::Single, angle).norm() - 1.0).abs() < TOL);
        }
    }

    #[test]
    fn test_dual_response_splits_power() {
        let comm = WeightVector::uniform(4);
        let sensing = WeightVector::new(crate::antenna::array_response(4, 30.0));
        let ind = BeamIndividual::dual(comm, sensing);
        let layout = BeamLayout::Dual { rho: 0.25 };
        // At broadside the comm beam gives 2 and the sensing beam nearly nothing
        let at_zero = ind.response(&layout, 0.0);
        let expected = 0.5 * 2.0 + (0.75f64).sqrt() * ind.sensing().unwrap().response(0.0);
        assert!((at_zero - expected).norm() < TOL);
        // A single layout ignores the sensing beam
        assert!((ind.response(&BeamLayout::Single, 0.0).norm() - 2.0).abs() < TOL);
    }

    #[test]
    fn test_magnitude_distance() {
        let a = BeamIndividual::single(WeightVector::uniform(4));
        let b = BeamIndividual::single(WeightVector::from_polar_parts(
            &[1.0, 0.0, 0.0, 0.0],
            &[0.0; 4],
        ));
        assert_eq!(a.magnitude_distance(&a), 0.0);
        assert!((a.magnitude_distance(&b) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_breakdown_matches_evaluate() {
        let scenario = Scenario::default().with_layout(BeamLayout::Dual { rho: 0.5 });
        let mut rng = create_rng(11);
        for objective in [
            Objective::Penalty(PenaltyObjective::default()),
            Objective::MaskMatching(MaskObjective::default()),
        ] {
            let problem = BeamProblem::new(scenario.clone())
                .unwrap()
                .with_objective(objective)
                .unwrap();
            let ind = problem.create_individual(&mut rng);
            assert_eq!(problem.breakdown(&ind).fitness, problem.evaluate(&ind));
        }
    }

    #[test]
    fn test_invalid_objective_is_rejected() {
        let problem = BeamProblem::new(Scenario::default()).unwrap();
        let bad = Objective::Penalty(PenaltyObjective::default().with_exclusion_deg(-1.0));
        assert!(problem.with_objective(bad).is_err());
    }

    #[test]
    fn test_radiation_pattern_uses_scenario_sweep() {
        let scenario = Scenario::default()
            .with_antenna_count(4)
            .with_pattern_sweep(AngularSweep::with_step(0.5));
        let problem = BeamProblem::new(scenario).unwrap();
        let ind = BeamIndividual::single(WeightVector::uniform(4));
        let pattern = problem.radiation_pattern(&ind);
        assert_eq!(pattern.len(), 361);
        let peak = pattern
            .iter()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
            .unwrap();
        assert_eq!(peak.angle_deg, 0.0);
        assert!((peak.magnitude_db - 20.0 * 2.0f64.log10()).abs() < 1e-6);
    }

    #[test]
    fn test_tradeoff_front() {
        let scenario = Scenario::default()
            .with_antenna_count(8)
            .with_sensing_directions(vec![40.0]);
        let problem = BeamProblem::new(scenario).unwrap();
        let comm_beam = BeamIndividual::single(WeightVector::uniform(8));
        let sensing_beam =
            BeamIndividual::single(WeightVector::new(crate::antenna::array_response(8, 40.0)));
        let mut rng = create_rng(5);
        let mut population = vec![comm_beam, sensing_beam];
        population.extend((0..10).map(|_| problem.create_individual(&mut rng)));

        let front = problem.tradeoff_front(&population);
        assert!(front.contains(&0));
        assert!(front.contains(&1));
    }

    #[test]
    fn test_tradeoff_front_lists_extremes_first() {
        let scenario = Scenario::default()
            .with_antenna_count(8)
            .with_sensing_directions(vec![40.0]);
        let problem = BeamProblem::new(scenario).unwrap();
        let mut rng = create_rng(21);
        let population: Vec<BeamIndividual> =
            (0..40).map(|_| problem.create_individual(&mut rng)).collect();

        let front = problem.tradeoff_front(&population);
        assert!(!front.is_empty());
        let gains: Vec<(f64, f64)> = front
            .iter()
            .map(|&i| {
                let b = problem.breakdown(&population[i]);
                (b.comm_gain, b.mean_sensing_gain)
            })
            .collect();
        let best_comm = gains.iter().map(|g| g.0).fold(f64::NEG_INFINITY, f64::max);
        let best_sensing = gains.iter().map(|g| g.1).fold(f64::NEG_INFINITY, f64::max);
        let head = &gains[..gains.len().min(2)];
        assert!(head.iter().any(|g| g.0 == best_comm));
        assert!(head.iter().any(|g| g.1 == best_sensing));
    }

    #[test]
    fn test_check_individual_matches_scenario() {
        let single = BeamProblem::new(Scenario::default().with_antenna_count(4)).unwrap();
        let dual = BeamProblem::new(
            Scenario::default()
                .with_antenna_count(4)
                .with_layout(BeamLayout::Dual { rho: 0.5 }),
        )
        .unwrap();

        let one_beam = BeamIndividual::single(WeightVector::uniform(4));
        let two_beams = BeamIndividual::dual(WeightVector::uniform(4), WeightVector::uniform(4));
        assert!(single.check_individual(&one_beam).is_ok());
        assert!(dual.check_individual(&two_beams).is_ok());
        assert!(single.check_individual(&two_beams).is_err());
        assert!(dual.check_individual(&one_beam).is_err());

        let wrong_len = BeamIndividual::single(WeightVector::uniform(9));
        assert!(single.check_individual(&wrong_len).is_err());
        let wrong_sensing =
            BeamIndividual::dual(WeightVector::uniform(4), WeightVector::uniform(3));
        assert!(dual.check_individual(&wrong_sensing).is_err());
    }

    #[test]
    fn test_fine_pattern_sweep_is_rejected() {
        let scenario = Scenario::default().with_pattern_sweep(AngularSweep::with_step(1e-300));
        assert!(BeamProblem::new(scenario).is_err());
    }
}
