//! Evolutionary multi-line production scheduling for the U-Engine ecosystem.
//!
//! Optimizes multi-day plans of a manufacturing plant with a genetic
//! algorithm. A candidate plan is a boolean tensor `[line][product][hour]`
//! in which a line runs at most one product per hour; every operator
//! preserves that invariant.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `FacilityModel`, `ProductionLine`, `Product`,
//!   `BulkProduct`, `PackagingStock`, `Schedule`
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling references, rates)
//! - **`evaluation`**: Changeover-aware production quantities and the weighted
//!   constraint evaluator (fitness, lower is better)
//! - **`ga`**: Initializer, box crossover, flip-bit mutation with repair,
//!   selection, and id-configurable operators
//! - **`engine`**: Hall-of-fame elitism, logbook, stopping conditions, and the
//!   pausable background `Engine`
//! - **`analysis`**: Solution KPIs (line utilization, achieved forecast,
//!   raw-material usage)
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use u_evo_schedule::engine::{EngineConfig, Evolution, StoppingConditionKind};
//! use u_evo_schedule::models::{BulkProduct, FacilityModel, Product, ProductionLine, ShiftStructure};
//!
//! let facility = FacilityModel::new("demo", ShiftStructure::new(2, 8, 32))
//!     .with_line(ProductionLine::new(0).with_product(0, 120.0).with_product(1, 90.0))
//!     .with_product(Product::new(0, 0, "Crisps").with_unit_weight(100.0).with_demand(0.0, 10.0))
//!     .with_product(Product::new(1, 0, "Puffs").with_unit_weight(50.0).with_demand(0.0, 20.0))
//!     .with_bulk_product(BulkProduct::new(0, 0, 0.5).with_lines(vec![0]))
//!     .with_recipe(0, &[("potato", 1.0)]);
//!
//! let config = EngineConfig::default()
//!     .with_population_size(40)
//!     .with_hall_of_fame_size(4)
//!     .with_stopping_condition(StoppingConditionKind::Generations, 10.0, true)
//!     .unwrap();
//!
//! let mut stopping = config.stopping.clone();
//! let mut evolution = Evolution::new(Arc::new(facility), &config).unwrap();
//! evolution.run(&mut stopping).unwrap();
//!
//! let best = evolution.best().unwrap();
//! assert!(best.check_exclusivity().is_ok());
//! assert_eq!(evolution.logbook().len(), 11);
//! ```
//!
//! # References
//!
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Fortin et al. (2012), "DEAP: Evolutionary Algorithms Made Easy"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod analysis;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod models;
pub mod validation;

pub use error::{Error, Result};
