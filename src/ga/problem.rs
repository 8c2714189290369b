//! Scheduling GA problem definition.
//!
//! Bridges the facility model, the constraint evaluator and the configured
//! operators into the primitives one generation needs: create, evaluate,
//! select, vary.
//!
//! # Reference
//! Fortin et al. (2012), "DEAP: Evolutionary Algorithms Made Easy"
//! (`varAnd` variation scheme)

use std::sync::Arc;

use rand::Rng;
use rayon::prelude::*;

use super::chromosome::random_schedule;
use super::operators::GeneticOperators;
use crate::error::Result;
use crate::evaluation::{ConstraintEvaluator, PenaltyWeights};
use crate::models::{FacilityModel, Schedule};

/// GA problem definition for production scheduling.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use rand::{rngs::StdRng, SeedableRng};
/// use u_evo_schedule::evaluation::PenaltyWeights;
/// use u_evo_schedule::ga::{operators::GeneticOperators, SchedulingProblem};
/// use u_evo_schedule::models::{BulkProduct, FacilityModel, Product, ProductionLine, ShiftStructure};
///
/// let facility = FacilityModel::new("demo", ShiftStructure::new(2, 8, 16))
///     .with_line(ProductionLine::new(0).with_product(0, 100.0))
///     .with_product(Product::new(0, 0, "Chips").with_unit_weight(100.0).with_demand(0.0, 10.0))
///     .with_bulk_product(BulkProduct::new(0, 0, 0.5).with_lines(vec![0]))
///     .with_recipe(0, &[("potato", 1.0)]);
///
/// let problem = SchedulingProblem::new(
///     Arc::new(facility),
///     PenaltyWeights::default(),
///     GeneticOperators::default(),
/// );
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut schedule = problem.create_individual(&mut rng);
/// let fitness = problem.evaluate(&mut schedule);
/// assert!(fitness >= 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SchedulingProblem {
    facility: Arc<FacilityModel>,
    evaluator: ConstraintEvaluator,
    operators: GeneticOperators,
}

impl SchedulingProblem {
    /// Creates a problem over a shared facility model.
    pub fn new(
        facility: Arc<FacilityModel>,
        weights: PenaltyWeights,
        operators: GeneticOperators,
    ) -> Self {
        let evaluator = ConstraintEvaluator::new(&facility, weights);
        Self {
            facility,
            evaluator,
            operators,
        }
    }

    /// The facility being scheduled.
    pub fn facility(&self) -> &FacilityModel {
        &self.facility
    }

    /// The fitness evaluator.
    pub fn evaluator(&self) -> &ConstraintEvaluator {
        &self.evaluator
    }

    /// The configured operators.
    pub fn operators(&self) -> &GeneticOperators {
        &self.operators
    }

    /// Creates a random valid schedule.
    pub fn create_individual<R: Rng>(&self, rng: &mut R) -> Schedule {
        random_schedule(&self.facility, rng)
    }

    /// Evaluates a schedule and caches its fitness.
    pub fn evaluate(&self, schedule: &mut Schedule) -> f64 {
        self.evaluator.evaluate(schedule)
    }

    /// Evaluates every schedule with a stale fitness.
    ///
    /// Returns the number of evaluations performed.
    pub fn evaluate_stale(&self, population: &mut [Schedule], parallel: bool) -> usize {
        let stale = population.iter().filter(|s| !s.is_evaluated()).count();
        if parallel {
            population
                .par_iter_mut()
                .filter(|s| !s.is_evaluated())
                .for_each(|s| {
                    self.evaluator.evaluate(s);
                });
        } else {
            for schedule in population.iter_mut().filter(|s| !s.is_evaluated()) {
                self.evaluator.evaluate(schedule);
            }
        }
        stale
    }

    /// Selects `k` parents as independent copies.
    pub fn select<R: Rng>(&self, population: &[Schedule], k: usize, rng: &mut R) -> Vec<Schedule> {
        self.operators.select(population, k, rng)
    }

    /// Applies crossover and mutation to offspring in place.
    ///
    /// Consecutive pairs `(0, 1), (2, 3), ...` are mated with probability
    /// `cx_prob`; then every offspring is mutated with probability
    /// `mut_prob`. Touched offspring lose their cached fitness.
    pub fn vary<R: Rng>(
        &self,
        offspring: &mut [Schedule],
        cx_prob: f64,
        mut_prob: f64,
        rng: &mut R,
    ) -> Result<()> {
        for pair in offspring.chunks_exact_mut(2) {
            if rng.random_bool(cx_prob) {
                let (left, right) = pair.split_at_mut(1);
                self.operators.crossover(&mut left[0], &mut right[0], rng)?;
            }
        }
        for schedule in offspring.iter_mut() {
            if rng.random_bool(mut_prob) {
                self.operators.mutate(schedule, rng);
                schedule.invalidate_fitness();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::demo_facility;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn problem() -> SchedulingProblem {
        SchedulingProblem::new(
            Arc::new(demo_facility()),
            PenaltyWeights::default(),
            GeneticOperators::default(),
        )
    }

    #[test]
    fn test_create_individual_matches_facility_shape() {
        let p = problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let s = p.create_individual(&mut rng);
        assert_eq!(s.shape(), p.facility().tensor_shape());
        assert!(s.check_exclusivity().is_ok());
    }

    #[test]
    fn test_evaluate_stale_counts() {
        let p = problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pop: Vec<Schedule> = (0..10).map(|_| p.create_individual(&mut rng)).collect();
        p.evaluate(&mut pop[0]);
        p.evaluate(&mut pop[1]);

        assert_eq!(p.evaluate_stale(&mut pop, false), 8);
        assert!(pop.iter().all(Schedule::is_evaluated));
        assert_eq!(p.evaluate_stale(&mut pop, false), 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let p = problem();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut seq: Vec<Schedule> = (0..16).map(|_| p.create_individual(&mut rng)).collect();
        let mut par = seq.clone();

        assert_eq!(p.evaluate_stale(&mut seq, false), 16);
        assert_eq!(p.evaluate_stale(&mut par, true), 16);
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.fitness(), b.fitness());
        }
    }

    #[test]
    fn test_vary_without_probability_keeps_offspring() {
        let p = problem();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut offspring: Vec<Schedule> = (0..6).map(|_| p.create_individual(&mut rng)).collect();
        p.evaluate_stale(&mut offspring, false);
        let before = offspring.clone();

        p.vary(&mut offspring, 0.0, 0.0, &mut rng).unwrap();
        assert_eq!(offspring, before);
        assert!(offspring.iter().all(Schedule::is_evaluated));
    }

    #[test]
    fn test_vary_invalidates_and_keeps_invariant() {
        let p = problem();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut offspring: Vec<Schedule> = (0..8).map(|_| p.create_individual(&mut rng)).collect();
        p.evaluate_stale(&mut offspring, false);

        p.vary(&mut offspring, 1.0, 1.0, &mut rng).unwrap();
        assert!(offspring.iter().all(|s| !s.is_evaluated()));
        assert!(offspring.iter().all(|s| s.check_exclusivity().is_ok()));
    }
}
