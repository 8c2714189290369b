//! GA-based production scheduling.
//!
//! Scheduling-specific encoding and operators for the evolutionary engine.
//!
//! # Encoding
//!
//! A [`Schedule`](crate::models::Schedule) is a boolean tensor
//! `[line][product][hour]`. A line runs at most one product per hour, and
//! every operator in this module preserves that:
//!
//! - **Initialization**: random busy hours per line, partitioned among a
//!   shuffled product order.
//! - **Crossover**: swap a `lines × all products × hours` box, so slots move
//!   whole between parents.
//! - **Mutation**: per-cell flips that clear the slot's other product first.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable selection, crossover and mutation
//!   strategies, configurable by id
//! - [`selection`]: Tournament, truncation and random parent selection
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Fortin et al. (2012), "DEAP: Evolutionary Algorithms Made Easy"

mod chromosome;
pub mod operators;
mod problem;
pub mod selection;

pub use chromosome::{
    box_crossover_at, cut_points, flip_bit_mutation, one_point_hour_crossover, random_schedule,
    random_schedule_with_shape, two_point_box_crossover,
};
pub use problem::SchedulingProblem;
