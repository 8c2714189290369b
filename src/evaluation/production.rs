//! Produced-quantity derivation.

use crate::models::{FacilityModel, Schedule};

/// Number of maximal runs of consecutive active hours in a row.
///
/// ```
/// use u_evo_schedule::evaluation::count_runs;
///
/// assert_eq!(count_runs(&[true, true, false, true]), 2);
/// assert_eq!(count_runs(&[false, false]), 0);
/// ```
pub fn count_runs(row: &[bool]) -> usize {
    let mut runs = 0;
    let mut previous = false;
    for &active in row {
        if active && !previous {
            runs += 1;
        }
        previous = active;
    }
    runs
}

/// Productive hours of a row after changeover loss.
///
/// `active_hours − runs × transition_time`, clamped at zero.
pub fn effective_hours(row: &[bool], transition_time: f64) -> f64 {
    let active = row.iter().filter(|&&c| c).count() as f64;
    let runs = count_runs(row) as f64;
    (active - runs * transition_time).max(0.0)
}

/// Dense per-`(line, product)` rate table derived from a facility.
///
/// Lookups by axis index avoid id maps inside the fitness loop.
#[derive(Debug, Clone)]
pub struct ProductionTable {
    lines: usize,
    products: usize,
    /// `rates[line * products + product]`, 0.0 when incapable.
    rates: Vec<f64>,
    capable: Vec<bool>,
    /// Bulk transition time per product.
    transition: Vec<f64>,
}

impl ProductionTable {
    /// Builds the table from a facility model.
    ///
    /// Products whose bulk product is missing get zero transition time.
    pub fn new(facility: &FacilityModel) -> Self {
        let lines = facility.num_lines();
        let products = facility.num_products();
        let mut rates = vec![0.0; lines * products];
        let mut capable = vec![false; lines * products];

        for (l, line) in facility.production_lines.iter().enumerate() {
            for (p, product) in facility.products.iter().enumerate() {
                if let Some(rate) = line.rate_for(product.id) {
                    rates[l * products + p] = rate;
                    capable[l * products + p] = true;
                }
            }
        }

        let transition = (0..products)
            .map(|p| facility.bulk_of(p).map_or(0.0, |b| b.transition_time))
            .collect();

        Self {
            lines,
            products,
            rates,
            capable,
            transition,
        }
    }

    /// Rate of `product` on `line` (kg/hour), 0.0 when incapable.
    #[inline]
    pub fn rate(&self, line: usize, product: usize) -> f64 {
        self.rates[line * self.products + product]
    }

    /// Whether `line` is capability-listed for `product`.
    #[inline]
    pub fn is_capable(&self, line: usize, product: usize) -> bool {
        self.capable[line * self.products + product]
    }

    /// Changeover time of `product` (hours).
    #[inline]
    pub fn transition_time(&self, product: usize) -> f64 {
        self.transition[product]
    }

    /// Kg of `product` made on `line`.
    pub fn produced_on_line(&self, schedule: &Schedule, line: usize, product: usize) -> f64 {
        let hours = effective_hours(schedule.row(line, product), self.transition[product]);
        hours * self.rate(line, product)
    }

    /// Kg produced per product, summed over lines.
    pub fn produced_kg(&self, schedule: &Schedule) -> Vec<f64> {
        (0..self.products)
            .map(|p| {
                (0..self.lines)
                    .map(|l| self.produced_on_line(schedule, l, p))
                    .sum()
            })
            .collect()
    }
}
