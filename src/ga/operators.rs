//! Configurable genetic operators for scheduling.
//!
//! Provides runtime-selectable selection, crossover and mutation strategies
//! via [`GeneticOperators`]. Each strategy has a small integer id so
//! collaborators can configure the engine with a [`MethodSpec`]:
//!
//! | Category  | Id | Strategy | Parameters |
//! |-----------|----|----------|------------|
//! | selection | 1  | Tournament | `tournament_size` (default 2) |
//! | selection | 2  | Best (truncation) | none |
//! | selection | 3  | Random | none |
//! | crossover | 1  | Two-point box (lines × hours) | none |
//! | crossover | 2  | One-point hours (all lines) | none |
//! | mutation  | 1  | Flip-bit with slot repair | `indpb` (default 1 / tensor length) |
//!
//! # Usage
//!
//! ```
//! use u_evo_schedule::ga::operators::{GeneticOperators, MethodSpec, SelectionMethod};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.selection, SelectionMethod::Tournament { tournament_size: 2 });
//!
//! let spec = MethodSpec::new(1).with_param("tournament_size", 4.0);
//! let selection = SelectionMethod::try_from(&spec).unwrap();
//! assert_eq!(selection, SelectionMethod::Tournament { tournament_size: 4 });
//! ```

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{flip_bit_mutation, one_point_hour_crossover, two_point_box_crossover};
use super::selection;
use crate::error::{Error, Result};
use crate::models::Schedule;

/// Operator id plus named numeric parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    /// Strategy id within its category.
    pub method_id: u32,
    /// Named parameters.
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl MethodSpec {
    /// Creates a spec without parameters.
    pub fn new(method_id: u32) -> Self {
        Self {
            method_id,
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Rejects parameters outside `allowed`.
    fn check_params(&self, method: &'static str, allowed: &[&str]) -> Result<()> {
        match self
            .params
            .keys()
            .find(|name| !allowed.contains(&name.as_str()))
        {
            Some(name) => Err(Error::UnknownParameter {
                method,
                name: name.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SelectionMethod {
    /// Best of `tournament_size` random competitors.
    Tournament {
        /// Competitors per pick.
        tournament_size: usize,
    },
    /// The fittest individuals.
    Best,
    /// Uniform random picks.
    Random,
}

impl SelectionMethod {
    /// Numeric id.
    pub const fn id(&self) -> u32 {
        match self {
            Self::Tournament { .. } => 1,
            Self::Best => 2,
            Self::Random => 3,
        }
    }

    /// Converts back to an id + params record.
    pub fn to_spec(&self) -> MethodSpec {
        match *self {
            Self::Tournament { tournament_size } => {
                MethodSpec::new(self.id()).with_param("tournament_size", tournament_size as f64)
            }
            _ => MethodSpec::new(self.id()),
        }
    }

    /// Picks `k` population indices.
    pub fn select<R: Rng>(&self, population: &[Schedule], k: usize, rng: &mut R) -> Vec<usize> {
        match *self {
            Self::Tournament { tournament_size } => {
                selection::tournament(population, k, tournament_size, rng)
            }
            Self::Best => selection::best(population, k),
            Self::Random => selection::random(population, k, rng),
        }
    }
}

impl TryFrom<&MethodSpec> for SelectionMethod {
    type Error = Error;

    fn try_from(spec: &MethodSpec) -> Result<Self> {
        match spec.method_id {
            1 => {
                spec.check_params("tournament", &["tournament_size"])?;
                let size = spec.params.get("tournament_size").copied().unwrap_or(2.0);
                if !(size.is_finite() && size >= 1.0 && size.fract() == 0.0) {
                    return Err(Error::Configuration(format!(
                        "tournament_size must be a positive integer, got {size}"
                    )));
                }
                Ok(Self::Tournament {
                    tournament_size: size as usize,
                })
            }
            2 => {
                spec.check_params("best", &[])?;
                Ok(Self::Best)
            }
            3 => {
                spec.check_params("random", &[])?;
                Ok(Self::Random)
            }
            id => Err(Error::UnknownMethod {
                category: "selection",
                id,
            }),
        }
    }
}

/// Crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverMethod {
    /// Swap a random line interval × hour interval box.
    TwoPointBox,
    /// Swap every line's hours from a random cut to the end.
    OnePointHours,
}

impl CrossoverMethod {
    /// Numeric id.
    pub const fn id(&self) -> u32 {
        match self {
            Self::TwoPointBox => 1,
            Self::OnePointHours => 2,
        }
    }

    /// Converts back to an id + params record.
    pub fn to_spec(&self) -> MethodSpec {
        MethodSpec::new(self.id())
    }

    /// Mates two schedules in place.
    pub fn mate<R: Rng>(&self, a: &mut Schedule, b: &mut Schedule, rng: &mut R) -> Result<()> {
        match self {
            Self::TwoPointBox => two_point_box_crossover(a, b, rng),
            Self::OnePointHours => one_point_hour_crossover(a, b, rng),
        }
    }
}

impl TryFrom<&MethodSpec> for CrossoverMethod {
    type Error = Error;

    fn try_from(spec: &MethodSpec) -> Result<Self> {
        match spec.method_id {
            1 => {
                spec.check_params("two_point_box", &[])?;
                Ok(Self::TwoPointBox)
            }
            2 => {
                spec.check_params("one_point_hours", &[])?;
                Ok(Self::OnePointHours)
            }
            id => Err(Error::UnknownMethod {
                category: "crossover",
                id,
            }),
        }
    }
}

/// Mutation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MutationMethod {
    /// Independent per-cell flips with slot repair.
    FlipBit {
        /// Per-cell probability; `None` means `1 / tensor length`.
        indpb: Option<f64>,
    },
}

impl MutationMethod {
    /// Numeric id.
    pub const fn id(&self) -> u32 {
        match self {
            Self::FlipBit { .. } => 1,
        }
    }

    /// Converts back to an id + params record.
    pub fn to_spec(&self) -> MethodSpec {
        match *self {
            Self::FlipBit { indpb: Some(p) } => MethodSpec::new(self.id()).with_param("indpb", p),
            Self::FlipBit { indpb: None } => MethodSpec::new(self.id()),
        }
    }

    /// Mutates a schedule in place.
    pub fn mutate<R: Rng>(&self, schedule: &mut Schedule, rng: &mut R) {
        match *self {
            Self::FlipBit { indpb } => {
                let p = indpb.unwrap_or_else(|| 1.0 / schedule.len().max(1) as f64);
                flip_bit_mutation(schedule, p, rng);
            }
        }
    }
}

impl TryFrom<&MethodSpec> for MutationMethod {
    type Error = Error;

    fn try_from(spec: &MethodSpec) -> Result<Self> {
        match spec.method_id {
            1 => {
                spec.check_params("flip_bit", &["indpb"])?;
                let indpb = spec.params.get("indpb").copied();
                if let Some(p) = indpb {
                    if !(0.0..=1.0).contains(&p) {
                        return Err(Error::Configuration(format!(
                            "indpb must be within [0, 1], got {p}"
                        )));
                    }
                }
                Ok(Self::FlipBit { indpb })
            }
            id => Err(Error::UnknownMethod {
                category: "mutation",
                id,
            }),
        }
    }
}

/// Runtime-selectable genetic operators for the scheduling GA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneticOperators {
    /// Parent selection strategy.
    pub selection: SelectionMethod,
    /// Crossover strategy.
    pub crossover: CrossoverMethod,
    /// Mutation strategy.
    pub mutation: MutationMethod,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            selection: SelectionMethod::Tournament { tournament_size: 2 },
            crossover: CrossoverMethod::TwoPointBox,
            mutation: MutationMethod::FlipBit { indpb: None },
        }
    }
}

impl GeneticOperators {
    /// Builds operators from three id + params records.
    pub fn from_specs(
        selection: &MethodSpec,
        crossover: &MethodSpec,
        mutation: &MethodSpec,
    ) -> Result<Self> {
        Ok(Self {
            selection: SelectionMethod::try_from(selection)?,
            crossover: CrossoverMethod::try_from(crossover)?,
            mutation: MutationMethod::try_from(mutation)?,
        })
    }

    /// Selects `k` parents and returns independent copies.
    pub fn select<R: Rng>(&self, population: &[Schedule], k: usize, rng: &mut R) -> Vec<Schedule> {
        self.selection
            .select(population, k, rng)
            .into_iter()
            .map(|i| population[i].clone())
            .collect()
    }

    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(&self, a: &mut Schedule, b: &mut Schedule, rng: &mut R) -> Result<()> {
        self.crossover.mate(a, b, rng)
    }

    /// Performs mutation using the configured strategy.
    pub fn mutate<R: Rng>(&self, schedule: &mut Schedule, rng: &mut R) {
        self.mutation.mutate(schedule, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::chromosome::random_schedule_with_shape;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_operators() {
        let ops = GeneticOperators::default();
        assert_eq!(ops.selection.id(), 1);
        assert_eq!(ops.crossover, CrossoverMethod::TwoPointBox);
        assert_eq!(ops.mutation, MutationMethod::FlipBit { indpb: None });
    }

    #[test]
    fn test_spec_conversion() {
        let ops = GeneticOperators::from_specs(
            &MethodSpec::new(3),
            &MethodSpec::new(2),
            &MethodSpec::new(1).with_param("indpb", 0.05),
        )
        .unwrap();
        assert_eq!(ops.selection, SelectionMethod::Random);
        assert_eq!(ops.crossover, CrossoverMethod::OnePointHours);
        assert_eq!(ops.mutation, MutationMethod::FlipBit { indpb: Some(0.05) });

        // to_spec is the inverse of try_from
        let back = MutationMethod::try_from(&ops.mutation.to_spec()).unwrap();
        assert_eq!(back, ops.mutation);
        let tournament = SelectionMethod::Tournament { tournament_size: 5 };
        assert_eq!(
            SelectionMethod::try_from(&tournament.to_spec()).unwrap(),
            tournament
        );
    }

    #[test]
    fn test_unknown_method_id() {
        let err = CrossoverMethod::try_from(&MethodSpec::new(9)).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownMethod {
                category: "crossover",
                id: 9
            }
        );
        assert!(SelectionMethod::try_from(&MethodSpec::new(0)).is_err());
        assert!(MutationMethod::try_from(&MethodSpec::new(2)).is_err());
    }

    #[test]
    fn test_unknown_parameter() {
        let spec = MethodSpec::new(2).with_param("tournament_size", 3.0);
        assert!(matches!(
            SelectionMethod::try_from(&spec),
            Err(Error::UnknownParameter { method: "best", .. })
        ));
    }

    #[test]
    fn test_invalid_parameter_values() {
        let spec = MethodSpec::new(1).with_param("tournament_size", 2.5);
        assert!(matches!(
            SelectionMethod::try_from(&spec),
            Err(Error::Configuration(_))
        ));
        let spec = MethodSpec::new(1).with_param("indpb", 1.5);
        assert!(matches!(
            MutationMethod::try_from(&spec),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_all_crossovers_keep_exclusivity() {
        let mut rng = SmallRng::seed_from_u64(42);
        for method in [CrossoverMethod::TwoPointBox, CrossoverMethod::OnePointHours] {
            for _ in 0..50 {
                let mut a = random_schedule_with_shape(3, 4, 20, &mut rng);
                let mut b = random_schedule_with_shape(3, 4, 20, &mut rng);
                method.mate(&mut a, &mut b, &mut rng).unwrap();
                assert!(a.check_exclusivity().is_ok());
                assert!(b.check_exclusivity().is_ok());
            }
        }
    }

    #[test]
    fn test_select_returns_copies() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut population: Vec<Schedule> = (0..6)
            .map(|i| {
                let mut s = random_schedule_with_shape(2, 2, 5, &mut rng);
                s.set_fitness(i as f64);
                s
            })
            .collect();
        let ops = GeneticOperators {
            selection: SelectionMethod::Best,
            ..GeneticOperators::default()
        };
        let picked = ops.select(&population, 3, &mut rng);
        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].fitness(), Some(0.0));

        population[0].invalidate_fitness();
        assert_eq!(picked[0].fitness(), Some(0.0));
    }

    #[test]
    fn test_default_indpb_scales_with_tensor() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut s = random_schedule_with_shape(4, 5, 50, &mut rng);
        let before = s.clone();
        MutationMethod::FlipBit { indpb: None }.mutate(&mut s, &mut rng);
        // Expected one flip per tensor; a handful of slots changes at most
        let changed = (0..4)
            .flat_map(|l| (0..50).map(move |h| (l, h)))
            .filter(|&(l, h)| s.active_product(l, h) != before.active_product(l, h))
            .count();
        assert!(changed < 20);
    }
}
