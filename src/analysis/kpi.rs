//! Production schedule quality metrics (KPIs).
//!
//! Computes plant-level indicators of a finished schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Line utilization | % of horizon hours a line runs anything |
//! | Achieved forecast | produced kg / target kg, in % |
//! | Raw-material usage | Σ recipe quantity × produced kg, against stock |
//! | Violations | per-category report of the fitness function |
//!
//! Produced quantities are changeover-aware, exactly as in the fitness
//! function.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evaluation::{ConstraintEvaluator, PenaltyWeights, ViolationReport};
use crate::models::{FacilityModel, Schedule};

/// Consumption of one raw material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialUsage {
    /// Quantity required by the schedule (kg).
    pub required: f64,
    /// Quantity in stock (kg).
    pub stock: f64,
    /// `required / stock` in %, `None` when nothing is stocked.
    pub percent_of_stock: Option<f64>,
}

impl MaterialUsage {
    /// Whether stock covers the requirement.
    pub fn is_covered(&self) -> bool {
        self.required <= self.stock
    }
}

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Per-line utilization in % (line id → %).
    pub line_utilization: BTreeMap<u32, f64>,
    /// Mean line utilization in %.
    pub avg_utilization: f64,
    /// Produced quantity per product (product id → kg).
    pub produced_kg: BTreeMap<u32, f64>,
    /// Achieved forecast per product in %, `None` when the product has no
    /// positive target.
    pub achieved_forecast: BTreeMap<u32, Option<f64>>,
    /// Raw-material consumption (material id → usage).
    pub raw_material_usage: BTreeMap<String, MaterialUsage>,
    /// Violation amounts and weighted fitness.
    pub violations: ViolationReport,
}

impl ScheduleKpi {
    /// Computes KPIs of a schedule for a facility.
    ///
    /// # Errors
    /// `ShapeMismatch` when the schedule does not fit the facility.
    pub fn calculate(
        schedule: &Schedule,
        facility: &FacilityModel,
        weights: PenaltyWeights,
    ) -> Result<Self> {
        if schedule.shape() != facility.tensor_shape() {
            return Err(Error::ShapeMismatch {
                expected: facility.tensor_shape(),
                found: schedule.shape(),
            });
        }
        let evaluator = ConstraintEvaluator::new(facility, weights);
        let produced = evaluator.production_table().produced_kg(schedule);
        let hours = facility.num_hours();

        let line_utilization: BTreeMap<u32, f64> = facility
            .production_lines
            .iter()
            .enumerate()
            .map(|(l, line)| {
                let busy = schedule
                    .line_occupancy(l)
                    .into_iter()
                    .filter(|&b| b)
                    .count();
                let percent = if hours == 0 {
                    0.0
                } else {
                    100.0 * busy as f64 / hours as f64
                };
                (line.id, percent)
            })
            .collect();
        let avg_utilization = if line_utilization.is_empty() {
            0.0
        } else {
            line_utilization.values().sum::<f64>() / line_utilization.len() as f64
        };

        let mut produced_kg = BTreeMap::new();
        let mut achieved_forecast = BTreeMap::new();
        for (p, product) in facility.products.iter().enumerate() {
            let kg = produced[p];
            let target = product.target_quantity_kg();
            produced_kg.insert(product.id, kg);
            achieved_forecast.insert(product.id, (target > 0.0).then(|| 100.0 * kg / target));
        }

        let mut required: BTreeMap<String, f64> = facility
            .raw_material_stock
            .keys()
            .map(|m| (m.clone(), 0.0))
            .collect();
        for (p, &kg) in produced.iter().enumerate() {
            let Some(recipe) = facility.recipe_of(p) else {
                continue;
            };
            for (material, per_kg) in recipe {
                *required.entry(material.clone()).or_insert(0.0) += per_kg * kg;
            }
        }
        let raw_material_usage = required
            .into_iter()
            .map(|(material, required)| {
                let stock = facility
                    .raw_material_stock
                    .get(&material)
                    .copied()
                    .unwrap_or(0.0);
                let percent_of_stock = (stock > 0.0).then(|| 100.0 * required / stock);
                let usage = MaterialUsage {
                    required,
                    stock,
                    percent_of_stock,
                };
                (material, usage)
            })
            .collect();

        Ok(Self {
            line_utilization,
            avg_utilization,
            produced_kg,
            achieved_forecast,
            raw_material_usage,
            violations: evaluator.report(schedule),
        })
    }

    /// Whether every raw material requirement is covered by stock.
    pub fn raw_materials_covered(&self) -> bool {
        self.raw_material_usage.values().all(MaterialUsage::is_covered)
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_forecast_deviation: f64, min_utilization: f64) -> bool {
        self.violations.invalid_hours == 0.0
            && self.violations.forecast_deviation <= max_forecast_deviation
            && self.avg_utilization >= min_utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::demo_facility;

    #[test]
    fn test_idle_schedule() {
        let facility = demo_facility();
        let (l, p, h) = facility.tensor_shape();
        let kpi =
            ScheduleKpi::calculate(&Schedule::empty(l, p, h), &facility, PenaltyWeights::default())
                .unwrap();

        assert!(kpi.line_utilization.values().all(|&u| u == 0.0));
        assert_eq!(kpi.avg_utilization, 0.0);
        assert!(kpi
            .achieved_forecast
            .values()
            .all(|a| a.is_some_and(|v| v == 0.0)));
        assert!(kpi.raw_materials_covered());
        assert!((kpi.violations.forecast_deviation - 400.0).abs() < 1e-10);
    }

    #[test]
    fn test_utilization_and_production() {
        let facility = demo_facility();
        let (l, p, h) = facility.tensor_shape();
        let mut schedule = Schedule::empty(l, p, h);
        // Line 1 runs product 0 (800 kg/h, 0.5 h changeover) for 9 hours
        for hour in 0..9 {
            schedule.assign(1, hour, Some(0));
        }
        let kpi = ScheduleKpi::calculate(&schedule, &facility, PenaltyWeights::default()).unwrap();

        assert!((kpi.line_utilization[&1] - 10.0).abs() < 1e-10);
        assert_eq!(kpi.line_utilization[&0], 0.0);
        assert!((kpi.avg_utilization - 10.0 / 3.0).abs() < 1e-10);

        let kg = 8.5 * 800.0;
        assert!((kpi.produced_kg[&0] - kg).abs() < 1e-10);
        // Target = 100 g × (100 − 50) thousand units = 5000 kg
        let achieved = kpi.achieved_forecast[&0].unwrap();
        assert!((achieved - 100.0 * kg / 5000.0).abs() < 1e-10);

        // Recipe 0: 0.8 potato + 0.15 oil per kg
        let potato = kpi.raw_material_usage["potato"];
        assert!((potato.required - 0.8 * kg).abs() < 1e-10);
        assert!((potato.percent_of_stock.unwrap() - 100.0 * 0.8 * kg / 40000.0).abs() < 1e-10);
        assert_eq!(kpi.raw_material_usage["corn"].required, 0.0);
    }

    #[test]
    fn test_raw_material_shortage() {
        let facility = demo_facility();
        let (l, p, h) = facility.tensor_shape();
        let mut schedule = Schedule::empty(l, p, h);
        // Product 2 on line 0 all horizon: 500 kg/h of a 0.3 peanut recipe
        for hour in 0..h {
            schedule.assign(0, hour, Some(2));
        }
        let kpi = ScheduleKpi::calculate(&schedule, &facility, PenaltyWeights::default()).unwrap();
        let peanuts = kpi.raw_material_usage["peanuts"];
        assert!(!peanuts.is_covered());
        assert!(!kpi.raw_materials_covered());
    }

    #[test]
    fn test_shape_mismatch() {
        let facility = demo_facility();
        assert!(matches!(
            ScheduleKpi::calculate(&Schedule::empty(1, 1, 1), &facility, PenaltyWeights::default()),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_thresholds() {
        let facility = demo_facility();
        let (l, p, h) = facility.tensor_shape();
        let kpi =
            ScheduleKpi::calculate(&Schedule::empty(l, p, h), &facility, PenaltyWeights::default())
                .unwrap();
        assert!(kpi.meets_thresholds(500.0, 0.0));
        assert!(!kpi.meets_thresholds(100.0, 0.0));
        assert!(!kpi.meets_thresholds(500.0, 10.0));
    }
}
