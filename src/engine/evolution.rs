//! Synchronous generational loop.
//!
//! [`Evolution`] owns the population, the hall of fame, the logbook and a
//! seeded random generator. One call to [`Evolution::step`] is exactly one
//! generation:
//!
//! 1. select `population − |hall of fame|` parents
//! 2. mate consecutive pairs and mutate (in place, on copies)
//! 3. verify exclusivity of every offspring
//! 4. evaluate offspring with stale fitness
//! 5. re-inject the hall-of-fame members unchanged
//! 6. update the hall of fame from the combined set
//! 7. replace the population and append to the logbook
//!
//! The threaded [`Engine`](super::Engine) drives the same loop on a worker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::EngineConfig;
use super::hall_of_fame::HallOfFame;
use super::logbook::{Logbook, LogbookEntry};
use super::stopping::{RunMetrics, StoppingConditions};
use crate::error::{Error, Result};
use crate::ga::SchedulingProblem;
use crate::models::{FacilityModel, Schedule};

/// Evolutionary state of one run.
#[derive(Debug)]
pub struct Evolution {
    problem: SchedulingProblem,
    population_size: usize,
    crossover_probability: f64,
    mutation_probability: f64,
    parallel_evaluation: bool,
    rng: StdRng,
    population: Vec<Schedule>,
    hall_of_fame: HallOfFame,
    logbook: Logbook,
    generation: usize,
}

impl Evolution {
    /// Creates an uninitialized run.
    ///
    /// # Errors
    /// Any `EngineConfig::validate` failure.
    pub fn new(facility: Arc<FacilityModel>, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            problem: SchedulingProblem::new(facility, config.weights, config.operators),
            population_size: config.population_size,
            crossover_probability: config.crossover_probability,
            mutation_probability: config.mutation_probability,
            parallel_evaluation: config.parallel_evaluation,
            rng: StdRng::seed_from_u64(config.seed),
            population: Vec::new(),
            hall_of_fame: HallOfFame::new(config.hall_of_fame_size),
            logbook: Logbook::new(),
            generation: 0,
        })
    }

    /// Seeds, evaluates and archives the initial population (generation 0).
    pub fn initialize(&mut self) -> Result<LogbookEntry> {
        self.population = (0..self.population_size)
            .map(|_| self.problem.create_individual(&mut self.rng))
            .collect();
        check_exclusivity(&self.population)?;

        let evaluations = self
            .problem
            .evaluate_stale(&mut self.population, self.parallel_evaluation);
        self.hall_of_fame.clear();
        self.hall_of_fame.update(&self.population);
        self.logbook.clear();
        self.generation = 0;
        Ok(self.record(evaluations))
    }

    /// Runs one generation.
    ///
    /// # Errors
    /// `InvariantViolation` when an operator produced an invalid schedule;
    /// the generation is discarded and the previous state is kept.
    pub fn step(&mut self) -> Result<LogbookEntry> {
        if self.logbook.is_empty() {
            return self.initialize();
        }

        let k = self.population_size.saturating_sub(self.hall_of_fame.len());
        let mut offspring = self.problem.select(&self.population, k, &mut self.rng);
        self.problem.vary(
            &mut offspring,
            self.crossover_probability,
            self.mutation_probability,
            &mut self.rng,
        )?;
        check_exclusivity(&offspring)?;

        let evaluations = self
            .problem
            .evaluate_stale(&mut offspring, self.parallel_evaluation);
        offspring.extend(self.hall_of_fame.members().iter().cloned());
        self.hall_of_fame.update(&offspring);

        self.population = offspring;
        self.generation += 1;
        Ok(self.record(evaluations))
    }

    /// Runs generations until a stopping condition fires.
    ///
    /// Elapsed time is measured from this call. Progress values in
    /// `stopping` are updated as the run advances.
    ///
    /// # Errors
    /// `Configuration` when no condition is applied, otherwise any
    /// [`step`](Self::step) error.
    pub fn run(&mut self, stopping: &mut StoppingConditions) -> Result<()> {
        if !stopping.any_applied() {
            return Err(Error::Configuration(
                "at least one stopping condition must be applied".into(),
            ));
        }
        let started = Instant::now();
        if self.logbook.is_empty() {
            self.initialize()?;
        }
        while !stopping.evaluate(&self.metrics(started.elapsed())) {
            self.step()?;
        }
        Ok(())
    }

    /// Measurements for the stopping conditions.
    pub fn metrics(&self, elapsed: Duration) -> RunMetrics {
        RunMetrics {
            elapsed_secs: elapsed.as_secs_f64(),
            best_fitness: self.hall_of_fame.best_fitness(),
            generation: self.generation,
        }
    }

    /// Index of the last completed generation.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Current population.
    pub fn population(&self) -> &[Schedule] {
        &self.population
    }

    /// Best-ever archive.
    pub fn hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    /// Statistics history.
    pub fn logbook(&self) -> &Logbook {
        &self.logbook
    }

    /// Best schedule found so far.
    pub fn best(&self) -> Option<&Schedule> {
        self.hall_of_fame.best()
    }

    /// The underlying problem.
    pub fn problem(&self) -> &SchedulingProblem {
        &self.problem
    }

    fn record(&mut self, evaluations: usize) -> LogbookEntry {
        let entry = LogbookEntry::from_population(self.generation, evaluations, &self.population);
        log::debug!(
            "gen {:>4} | evals {:>4} | min {:>12.3} | avg {:>12.3}",
            entry.generation,
            entry.evaluations,
            entry.min_fitness.unwrap_or(f64::INFINITY),
            entry.avg_fitness.unwrap_or(f64::INFINITY)
        );
        self.logbook.record(entry);
        entry
    }
}

fn check_exclusivity(schedules: &[Schedule]) -> Result<()> {
    for schedule in schedules {
        if let Err(e) = schedule.check_exclusivity() {
            log::error!("Aborting generation: {e}");
            return Err(e);
        }
    }
    Ok(())
}
