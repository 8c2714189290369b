//! Stopping-condition tracker.
//!
//! Three independent termination predicates, each `{applied, bound,
//! progress}`. A run stops when any applied condition is satisfied.
//!
//! | Kind | Satisfied when | Progress |
//! |------|----------------|----------|
//! | `Time` | active elapsed seconds `> bound` | `elapsed / bound` |
//! | `Fitness` | best fitness `< bound` | `bound / best` (100 only once crossed) |
//! | `Generations` | last completed generation `>= bound` | `generation / bound` |
//!
//! Progress is a percentage clamped to `[0, 100]`. A zero bound on the
//! ratio-based kinds reports 100.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stopping-condition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StoppingConditionKind {
    /// Wall-clock seconds, excluding paused time.
    Time,
    /// Best fitness threshold.
    Fitness,
    /// Completed generation count.
    Generations,
}

impl StoppingConditionKind {
    /// All kinds, in reporting order.
    pub const ALL: [Self; 3] = [Self::Time, Self::Fitness, Self::Generations];

    /// Lowercase identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Fitness => "fitness",
            Self::Generations => "generations",
        }
    }
}

impl fmt::Display for StoppingConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoppingConditionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "fitness" => Ok(Self::Fitness),
            "generations" => Ok(Self::Generations),
            _ => Err(Error::UnknownStoppingCondition(s.to_string())),
        }
    }
}

/// One termination predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingCondition {
    /// Whether the condition participates in the stop decision.
    pub applied: bool,
    /// Threshold (seconds, fitness, or generations).
    pub bound: f64,
    /// Last computed progress percentage.
    #[serde(default)]
    pub progress: f64,
}

impl StoppingCondition {
    /// Creates a condition with zero progress.
    pub fn new(bound: f64, applied: bool) -> Self {
        Self {
            applied,
            bound,
            progress: 0.0,
        }
    }

    fn check_bound(kind: StoppingConditionKind, bound: f64) -> Result<()> {
        if bound.is_finite() && bound >= 0.0 {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "{kind} bound must be finite and non-negative, got {bound}"
            )))
        }
    }
}

/// Run measurements the conditions are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunMetrics {
    /// Active (non-paused) elapsed seconds.
    pub elapsed_secs: f64,
    /// Best fitness found so far.
    pub best_fitness: Option<f64>,
    /// Index of the last completed generation (0 = initial population).
    pub generation: usize,
}

/// Progress percentages of every condition.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StoppingProgress {
    /// Time progress.
    pub time: f64,
    /// Fitness progress.
    pub fitness: f64,
    /// Generations progress.
    pub generations: f64,
}

/// The three stopping conditions of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoppingConditions {
    /// Wall-clock limit.
    pub time: StoppingCondition,
    /// Fitness threshold.
    pub fitness: StoppingCondition,
    /// Generation limit.
    pub generations: StoppingCondition,
}

impl Default for StoppingConditions {
    fn default() -> Self {
        Self {
            time: StoppingCondition::new(60.0, false),
            fitness: StoppingCondition::new(0.0, false),
            generations: StoppingCondition::new(20.0, true),
        }
    }
}

impl StoppingConditions {
    /// The condition of one kind.
    pub fn get(&self, kind: StoppingConditionKind) -> &StoppingCondition {
        match kind {
            StoppingConditionKind::Time => &self.time,
            StoppingConditionKind::Fitness => &self.fitness,
            StoppingConditionKind::Generations => &self.generations,
        }
    }

    fn get_mut(&mut self, kind: StoppingConditionKind) -> &mut StoppingCondition {
        match kind {
            StoppingConditionKind::Time => &mut self.time,
            StoppingConditionKind::Fitness => &mut self.fitness,
            StoppingConditionKind::Generations => &mut self.generations,
        }
    }

    /// Sets bound and applied flag of one condition.
    ///
    /// # Errors
    /// `Configuration` for negative or non-finite bounds; the condition is
    /// left unchanged.
    pub fn set(&mut self, kind: StoppingConditionKind, bound: f64, applied: bool) -> Result<()> {
        StoppingCondition::check_bound(kind, bound)?;
        let condition = self.get_mut(kind);
        condition.bound = bound;
        condition.applied = applied;
        Ok(())
    }

    /// Disables a condition and clears its progress.
    pub fn delete(&mut self, kind: StoppingConditionKind) {
        let condition = self.get_mut(kind);
        condition.applied = false;
        condition.progress = 0.0;
    }

    /// Whether any condition is applied.
    pub fn any_applied(&self) -> bool {
        StoppingConditionKind::ALL
            .iter()
            .any(|&kind| self.get(kind).applied)
    }

    /// Checks every bound.
    pub fn validate(&self) -> Result<()> {
        for kind in StoppingConditionKind::ALL {
            StoppingCondition::check_bound(kind, self.get(kind).bound)?;
        }
        Ok(())
    }

    /// Updates progress and returns whether the run should stop.
    ///
    /// Every applied condition is refreshed, not only up to the first hit.
    pub fn evaluate(&mut self, metrics: &RunMetrics) -> bool {
        let mut stop = false;
        for kind in StoppingConditionKind::ALL {
            let condition = self.get_mut(kind);
            if !condition.applied {
                continue;
            }
            condition.progress = progress_of(kind, condition.bound, metrics);
            if is_satisfied(kind, condition.bound, metrics) {
                log::info!("Stopping condition '{kind}' reached (bound {})", condition.bound);
                stop = true;
            }
        }
        stop
    }

    /// Zeroes every progress value.
    pub fn reset_progress(&mut self) {
        for kind in StoppingConditionKind::ALL {
            self.get_mut(kind).progress = 0.0;
        }
    }

    /// Current progress percentages.
    pub fn progress(&self) -> StoppingProgress {
        StoppingProgress {
            time: self.time.progress,
            fitness: self.fitness.progress,
            generations: self.generations.progress,
        }
    }
}

fn is_satisfied(kind: StoppingConditionKind, bound: f64, metrics: &RunMetrics) -> bool {
    match kind {
        StoppingConditionKind::Time => metrics.elapsed_secs > bound,
        StoppingConditionKind::Fitness => metrics.best_fitness.is_some_and(|best| bound > best),
        StoppingConditionKind::Generations => metrics.generation as f64 >= bound,
    }
}

/// Ceiling of FITNESS progress while the threshold is not yet crossed.
const FITNESS_PENDING_MAX: f64 = 99.9;

fn progress_of(kind: StoppingConditionKind, bound: f64, metrics: &RunMetrics) -> f64 {
    let percent = match kind {
        StoppingConditionKind::Time => ratio_percent(metrics.elapsed_secs, bound),
        StoppingConditionKind::Generations => ratio_percent(metrics.generation as f64, bound),
        StoppingConditionKind::Fitness => match metrics.best_fitness {
            None => 0.0,
            Some(best) if bound > best => 100.0,
            Some(best) => (100.0 * bound / best).min(FITNESS_PENDING_MAX),
        },
    };
    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn ratio_percent(metric: f64, bound: f64) -> f64 {
    if bound <= 0.0 {
        100.0
    } else {
        100.0 * metric / bound
    }
}
