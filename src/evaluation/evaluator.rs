//! Weighted constraint evaluator.

use serde::{Deserialize, Serialize};

use super::production::ProductionTable;
use crate::models::{FacilityModel, Schedule};

/// Penalty weight per violation category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyWeights {
    /// Weight of invalid-scheduling hours.
    pub invalid: f64,
    /// Weight of hard-constraint (forecast) deviation.
    pub hard: f64,
    /// Weight of soft-constraint (packaging) shortfall.
    pub soft: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            invalid: 100.0,
            hard: 10.0,
            soft: 0.0,
        }
    }
}

impl PenaltyWeights {
    /// Creates weights.
    pub fn new(invalid: f64, hard: f64, soft: f64) -> Self {
        Self { invalid, hard, soft }
    }

    /// Whether all weights are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.invalid, self.hard, self.soft]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }
}

/// Per-category violation amounts for one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViolationReport {
    /// Active hours on lines not capable of the product.
    pub invalid_hours: f64,
    /// Summed forecast deviation in percentage points.
    pub forecast_deviation: f64,
    /// Summed packaging shortfall in percentage points.
    pub packaging_shortfall: f64,
    /// Weighted total.
    pub fitness: f64,
}

#[derive(Debug, Clone, Copy)]
struct PackagingRule {
    unit_weight: f64,
    unit_stock: Option<f64>,
    retailer: Option<(f64, u32)>,
}

/// Scores schedules against a facility model.
///
/// Pure: no interior mutability, identical input gives identical output.
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator {
    shape: (usize, usize, usize),
    table: ProductionTable,
    /// Target kg per product (`<= 0` = already covered by stock).
    targets: Vec<f64>,
    packaging: Vec<Option<PackagingRule>>,
    weights: PenaltyWeights,
}

impl ConstraintEvaluator {
    /// Creates an evaluator for a facility.
    pub fn new(facility: &FacilityModel, weights: PenaltyWeights) -> Self {
        let targets: Vec<f64> = facility
            .products
            .iter()
            .map(|p| p.target_quantity_kg())
            .collect();

        for (product, target) in facility.products.iter().zip(&targets) {
            if *target <= 0.0 {
                log::warn!(
                    "Product {} has no outstanding forecast (target {:.1} kg); excluded from forecast deviation",
                    product.id,
                    target
                );
            }
        }

        let packaging = facility
            .products
            .iter()
            .map(|p| {
                if p.unit_weight <= 0.0 {
                    return None;
                }
                let unit_stock = p
                    .unit_package_id
                    .and_then(|id| facility.packaging.unit_packages.get(&id).copied());
                let retailer = p
                    .retailer_package_id
                    .and_then(|id| facility.packaging.retailer_packages.get(&id))
                    .filter(|r| r.units_per_package > 0)
                    .map(|r| (r.stock, r.units_per_package));
                Some(PackagingRule {
                    unit_weight: p.unit_weight,
                    unit_stock,
                    retailer,
                })
            })
            .collect();

        Self {
            shape: facility.tensor_shape(),
            table: ProductionTable::new(facility),
            targets,
            packaging,
            weights,
        }
    }

    /// Penalty weights in use.
    pub fn weights(&self) -> PenaltyWeights {
        self.weights
    }

    /// Production table backing the evaluation.
    pub fn production_table(&self) -> &ProductionTable {
        &self.table
    }

    /// Active hours where a line runs a product it is not capable of.
    pub fn invalid_scheduling(&self, schedule: &Schedule) -> f64 {
        let (lines, products, _) = self.shape;
        let mut hours = 0usize;
        for l in 0..lines {
            for p in 0..products {
                if !self.table.is_capable(l, p) {
                    hours += schedule.row(l, p).iter().filter(|&&c| c).count();
                }
            }
        }
        hours as f64
    }

    /// Forecast deviation `Σ |100·produced/target − 100|` over products.
    ///
    /// Products with a non-positive target count as fully achieved.
    pub fn forecast_deviation(&self, produced: &[f64]) -> f64 {
        produced
            .iter()
            .zip(&self.targets)
            .filter(|(_, &target)| target > 0.0)
            .map(|(&kg, &target)| (100.0 * kg / target - 100.0).abs())
            .sum()
    }

    /// Packaging shortfall in percentage points over products.
    pub fn packaging_shortfall(&self, produced: &[f64]) -> f64 {
        produced
            .iter()
            .zip(&self.packaging)
            .filter_map(|(&kg, rule)| rule.map(|r| (kg, r)))
            .map(|(kg, rule)| {
                let units = (kg * 1000.0 / rule.unit_weight).ceil();
                let mut shortfall = 0.0;
                if let Some(stock) = rule.unit_stock {
                    shortfall += percent_over(units, stock);
                }
                if let Some((stock, per_package)) = rule.retailer {
                    let packages = (units / f64::from(per_package)).ceil();
                    shortfall += percent_over(packages, stock);
                }
                shortfall
            })
            .sum()
    }

    /// Full per-category report.
    pub fn report(&self, schedule: &Schedule) -> ViolationReport {
        debug_assert_eq!(schedule.shape(), self.shape);
        let produced = self.table.produced_kg(schedule);
        let invalid_hours = self.invalid_scheduling(schedule);
        let forecast_deviation = self.forecast_deviation(&produced);
        let packaging_shortfall = self.packaging_shortfall(&produced);
        ViolationReport {
            invalid_hours,
            forecast_deviation,
            packaging_shortfall,
            fitness: self.weights.invalid * invalid_hours
                + self.weights.hard * forecast_deviation
                + self.weights.soft * packaging_shortfall,
        }
    }

    /// Scalar fitness (lower is better).
    pub fn fitness(&self, schedule: &Schedule) -> f64 {
        debug_assert_eq!(schedule.shape(), self.shape);
        let produced = self.table.produced_kg(schedule);
        let mut total = self.weights.invalid * self.invalid_scheduling(schedule)
            + self.weights.hard * self.forecast_deviation(&produced);
        if self.weights.soft != 0.0 {
            total += self.weights.soft * self.packaging_shortfall(&produced);
        }
        total
    }

    /// Returns the cached fitness, computing and caching it when stale.
    pub fn evaluate(&self, schedule: &mut Schedule) -> f64 {
        if let Some(fitness) = schedule.fitness() {
            return fitness;
        }
        let fitness = self.fitness(schedule);
        schedule.set_fitness(fitness);
        fitness
    }
}

/// Percentage by which `required` exceeds `stock`.
///
/// Zero stock with positive demand counts as a full 100% shortfall.
fn percent_over(required: f64, stock: f64) -> f64 {
    if stock > 0.0 {
        (100.0 * required / stock - 100.0).max(0.0)
    } else if required > 0.0 {
        100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{demo_facility, Product};

    fn empty_for(facility: &FacilityModel) -> Schedule {
        let (l, p, h) = facility.tensor_shape();
        Schedule::empty(l, p, h)
    }

    #[test]
    fn test_idle_schedule_misses_every_forecast() {
        let facility = demo_facility();
        let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::default());
        let report = evaluator.report(&empty_for(&facility));

        // Every product has a positive target and 0% achieved → 100 points each
        assert!((report.invalid_hours - 0.0).abs() < 1e-10);
        assert!((report.forecast_deviation - 400.0).abs() < 1e-10);
        assert!((report.fitness - 4000.0).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_scheduling_counts_hours() {
        let facility = demo_facility();
        let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::default());
        let mut schedule = empty_for(&facility);
        // Line 2 only makes product 2
        schedule.assign(2, 0, Some(0));
        schedule.assign(2, 1, Some(1));
        schedule.assign(2, 2, Some(2));

        assert!((evaluator.invalid_scheduling(&schedule) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_forecast_exact_hit_has_no_deviation() {
        // Single product, target 5000 kg; line rate 1000 kg/h, no changeover
        let mut facility = demo_facility();
        facility.bulk_products[0].transition_time = 0.0;
        facility.production_lines[1].product_rates.insert(0, 1000.0);
        let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::new(100.0, 1.0, 0.0));

        let mut schedule = empty_for(&facility);
        for h in 0..5 {
            schedule.assign(1, h, Some(0));
        }
        let produced = evaluator.production_table().produced_kg(&schedule);
        assert!((produced[0] - 5000.0).abs() < 1e-10);

        let deviation = evaluator.forecast_deviation(&produced);
        // Products 1..3 are untouched → 300 points; product 0 contributes 0
        assert!((deviation - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_overproduction_is_penalized() {
        let facility = demo_facility();
        let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::default());
        // Product 0 target is 5000 kg; 10000 kg → 200% → 100 points
        let produced = vec![10_000.0, 0.0, 0.0, 0.0];
        let deviation = evaluator.forecast_deviation(&produced);
        assert!((deviation - 400.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_target_is_excluded() {
        let facility = demo_facility().with_product(
            Product::new(4, 0, "Covered")
                .with_unit_weight(100.0)
                .with_demand(10.0, 10.0),
        );
        let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::default());
        let produced = vec![0.0, 0.0, 0.0, 0.0, 500.0];
        let deviation = evaluator.forecast_deviation(&produced);
        assert!(deviation.is_finite());
        assert!((deviation - 400.0).abs() < 1e-10);
    }

    #[test]
    fn test_packaging_shortfall() {
        let facility = demo_facility();
        let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::new(0.0, 0.0, 1.0));
        // Product 2: 50g units, 10_000 kg → 200_000 units vs 100_000 stock → +100%;
        // retailer: 2000 packages vs 2000 stock → 0%
        let produced = vec![0.0, 0.0, 10_000.0, 0.0];
        let shortfall = evaluator.packaging_shortfall(&produced);
        assert!((shortfall - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_percent_over_degenerate_stock() {
        assert!((percent_over(5.0, 0.0) - 100.0).abs() < 1e-10);
        assert!((percent_over(0.0, 0.0) - 0.0).abs() < 1e-10);
        assert!((percent_over(50.0, 100.0) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_fitness_matches_report_and_is_deterministic() {
        let facility = demo_facility();
        let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::new(100.0, 10.0, 1.0));
        let mut schedule = empty_for(&facility);
        for h in 0..30 {
            schedule.assign(0, h, Some(h % 4));
            schedule.assign(1, h, Some(0));
        }

        let first = evaluator.fitness(&schedule);
        let second = evaluator.fitness(&schedule);
        assert_eq!(first.to_bits(), second.to_bits());
        assert!((evaluator.report(&schedule).fitness - first).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_caches() {
        let facility = demo_facility();
        let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::default());
        let mut schedule = empty_for(&facility);

        let fitness = evaluator.evaluate(&mut schedule);
        assert_eq!(schedule.fitness(), Some(fitness));

        schedule.set_fitness(-1.0);
        assert!((evaluator.evaluate(&mut schedule) + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_weights_validation() {
        assert!(PenaltyWeights::default().is_valid());
        assert!(!PenaltyWeights::new(-1.0, 0.0, 0.0).is_valid());
        assert!(!PenaltyWeights::new(f64::NAN, 0.0, 0.0).is_valid());
    }
}
