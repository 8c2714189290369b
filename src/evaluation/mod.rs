//! Constraint evaluation and fitness.
//!
//! Maps a [`Schedule`](crate::models::Schedule) to violation counts in
//! three weighted categories and a scalar fitness (lower is better):
//!
//! | Category | Weight | Measures |
//! |----------|--------|----------|
//! | Invalid scheduling | `invalid` | hours a line runs a product it is not capable of |
//! | Hard constraints | `hard` | forecast deviation, `Σ |100·produced/target − 100|` |
//! | Soft constraints | `soft` | packaging shortfall (zero-weighted by default) |
//!
//! Produced quantity accounts for changeover loss: every maximal run of
//! consecutive active hours on a `(line, product)` row costs the product's
//! bulk transition time.
//!
//! The evaluator is immutable after construction and safe to share across
//! threads.

mod evaluator;
mod production;

pub use evaluator::{ConstraintEvaluator, PenaltyWeights, ViolationReport};
pub use production::{count_runs, effective_hours, ProductionTable};
