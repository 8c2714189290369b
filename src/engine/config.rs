//! Engine configuration.
//!
//! [`EngineConfig`] holds everything a run needs besides the facility:
//! population sizing, variation probabilities, seed, penalty weights,
//! operators and stopping conditions. [`ConfigurationSnapshot`] is its
//! serializable id + params form exchanged with collaborators.

use serde::{Deserialize, Serialize};

use super::stopping::{StoppingConditionKind, StoppingConditions};
use crate::error::{Error, Result};
use crate::evaluation::PenaltyWeights;
use crate::ga::operators::{
    CrossoverMethod, GeneticOperators, MethodSpec, MutationMethod, SelectionMethod,
};

/// Configuration of the evolutionary engine.
///
/// # Example
/// ```
/// use u_evo_schedule::engine::{EngineConfig, StoppingConditionKind};
///
/// let config = EngineConfig::default()
///     .with_population_size(50)
///     .with_hall_of_fame_size(5)
///     .with_seed(7)
///     .with_stopping_condition(StoppingConditionKind::Generations, 10.0, true)
///     .unwrap();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Elite archive size, re-injected every generation.
    pub hall_of_fame_size: usize,
    /// Probability of mating each offspring pair.
    pub crossover_probability: f64,
    /// Probability of mutating each offspring.
    pub mutation_probability: f64,
    /// Random seed of the run.
    pub seed: u64,
    /// Penalty weights of the fitness function.
    pub weights: PenaltyWeights,
    /// Selection, crossover and mutation strategies.
    pub operators: GeneticOperators,
    /// Termination predicates.
    pub stopping: StoppingConditions,
    /// Evaluate stale offspring on the rayon thread pool.
    pub parallel_evaluation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 300,
            hall_of_fame_size: 30,
            crossover_probability: 0.9,
            mutation_probability: 0.1,
            seed: 42,
            weights: PenaltyWeights::default(),
            operators: GeneticOperators::default(),
            stopping: StoppingConditions::default(),
            parallel_evaluation: false,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the hall-of-fame size.
    pub fn with_hall_of_fame_size(mut self, size: usize) -> Self {
        self.hall_of_fame_size = size;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the penalty weights.
    pub fn with_weights(mut self, weights: PenaltyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel_evaluation(mut self, parallel: bool) -> Self {
        self.parallel_evaluation = parallel;
        self
    }

    /// Sets one stopping condition.
    ///
    /// # Errors
    /// `Configuration` for negative or non-finite bounds.
    pub fn with_stopping_condition(
        mut self,
        kind: StoppingConditionKind,
        bound: f64,
        applied: bool,
    ) -> Result<Self> {
        self.stopping.set(kind, bound, applied)?;
        Ok(self)
    }

    /// Checks sizes, probabilities, weights and stopping bounds.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(Error::Configuration(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.hall_of_fame_size == 0 || self.hall_of_fame_size > self.population_size {
            return Err(Error::Configuration(format!(
                "hall_of_fame_size must be within 1..={}, got {}",
                self.population_size, self.hall_of_fame_size
            )));
        }
        for (name, p) in [
            ("crossover_probability", self.crossover_probability),
            ("mutation_probability", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::Configuration(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if !self.weights.is_valid() {
            return Err(Error::Configuration(format!(
                "penalty weights must be finite and non-negative, got {:?}",
                self.weights
            )));
        }
        if let SelectionMethod::Tournament { tournament_size: 0 } = self.operators.selection {
            return Err(Error::Configuration(
                "tournament_size must be at least 1".into(),
            ));
        }
        if let MutationMethod::FlipBit { indpb: Some(p) } = self.operators.mutation {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::Configuration(format!(
                    "indpb must be within [0, 1], got {p}"
                )));
            }
        }
        self.stopping.validate()
    }

    /// Serializable id + params form of this configuration.
    pub fn snapshot(&self) -> ConfigurationSnapshot {
        ConfigurationSnapshot {
            population_size: self.population_size,
            hall_of_fame_size: self.hall_of_fame_size,
            crossover_probability: self.crossover_probability,
            mutation_probability: self.mutation_probability,
            seed: self.seed,
            weights: self.weights,
            stopping_conditions: self.stopping.clone(),
            selection: self.operators.selection.to_spec(),
            crossover: self.operators.crossover.to_spec(),
            mutation: self.operators.mutation.to_spec(),
            parallel_evaluation: self.parallel_evaluation,
        }
    }
}

/// Serializable engine configuration with operators as id + params.
///
/// Reconstruct an equivalent configuration with
/// `EngineConfig::try_from(&snapshot)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSnapshot {
    /// Individuals per generation.
    pub population_size: usize,
    /// Elite archive size.
    pub hall_of_fame_size: usize,
    /// Crossover probability.
    pub crossover_probability: f64,
    /// Mutation probability.
    pub mutation_probability: f64,
    /// Random seed.
    pub seed: u64,
    /// Penalty weights.
    pub weights: PenaltyWeights,
    /// Stopping conditions with their last progress.
    pub stopping_conditions: StoppingConditions,
    /// Selection method.
    pub selection: MethodSpec,
    /// Crossover method.
    pub crossover: MethodSpec,
    /// Mutation method.
    pub mutation: MethodSpec,
    /// Parallel evaluation flag.
    #[serde(default)]
    pub parallel_evaluation: bool,
}

impl TryFrom<&ConfigurationSnapshot> for EngineConfig {
    type Error = Error;

    fn try_from(snapshot: &ConfigurationSnapshot) -> Result<Self> {
        let operators = GeneticOperators {
            selection: SelectionMethod::try_from(&snapshot.selection)?,
            crossover: CrossoverMethod::try_from(&snapshot.crossover)?,
            mutation: MutationMethod::try_from(&snapshot.mutation)?,
        };
        let mut stopping = snapshot.stopping_conditions.clone();
        stopping.reset_progress();

        let config = Self {
            population_size: snapshot.population_size,
            hall_of_fame_size: snapshot.hall_of_fame_size,
            crossover_probability: snapshot.crossover_probability,
            mutation_probability: snapshot.mutation_probability,
            seed: snapshot.seed,
            weights: snapshot.weights,
            operators,
            stopping,
            parallel_evaluation: snapshot.parallel_evaluation,
        };
        config.validate()?;
        Ok(config)
    }
}

impl TryFrom<ConfigurationSnapshot> for EngineConfig {
    type Error = Error;

    fn try_from(snapshot: ConfigurationSnapshot) -> Result<Self> {
        Self::try_from(&snapshot)
    }
}
