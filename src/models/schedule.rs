//! Schedule (individual) model.
//!
//! A schedule is a dense boolean tensor indexed `[line][product][hour]`:
//! a set cell means the product runs on the line during that hour.
//!
//! # Invariant
//!
//! **Exclusivity**: for every `(line, hour)` at most one product is active.
//! Every mutating method either preserves exclusivity by construction or
//! repairs the slot before writing. [`Schedule::from_cells`] rejects input
//! that violates it.
//!
//! The fitness is cached alongside the tensor and cleared by every
//! mutating method.

use serde::Serialize;
use std::ops::Range;

use crate::error::{Error, Result};

/// A candidate production plan.
///
/// Lower fitness = better schedule (minimization convention).
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    lines: usize,
    products: usize,
    hours: usize,
    /// Row-major `[line][product][hour]` cells.
    cells: Vec<bool>,
    /// Cached fitness (`None` = stale or never evaluated).
    fitness: Option<f64>,
}

impl PartialEq for Schedule {
    /// Tensor equality. The cached fitness is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.cells == other.cells
    }
}

impl Eq for Schedule {}

impl Schedule {
    /// Creates an all-idle schedule of the given shape.
    pub fn empty(lines: usize, products: usize, hours: usize) -> Self {
        Self {
            lines,
            products,
            hours,
            cells: vec![false; lines * products * hours],
            fitness: None,
        }
    }

    /// Every cell active: breaks exclusivity in every slot when there is
    /// more than one product.
    #[cfg(test)]
    pub(crate) fn saturated(lines: usize, products: usize, hours: usize) -> Self {
        Self {
            lines,
            products,
            hours,
            cells: vec![true; lines * products * hours],
            fitness: None,
        }
    }

    /// Builds a schedule from nested `[line][product][hour]` rows.
    ///
    /// # Errors
    /// `ShapeMismatch` when rows are ragged, `InvariantViolation` when a
    /// line runs more than one product in the same hour.
    pub fn from_cells(rows: &[Vec<Vec<bool>>]) -> Result<Self> {
        let lines = rows.len();
        let products = rows.first().map_or(0, |l| l.len());
        let hours = rows
            .first()
            .and_then(|l| l.first())
            .map_or(0, |p| p.len());

        let mut schedule = Self::empty(lines, products, hours);
        for (l, line) in rows.iter().enumerate() {
            if line.len() != products {
                return Err(Error::ShapeMismatch {
                    expected: (lines, products, hours),
                    found: (lines, line.len(), hours),
                });
            }
            for (p, row) in line.iter().enumerate() {
                if row.len() != hours {
                    return Err(Error::ShapeMismatch {
                        expected: (lines, products, hours),
                        found: (lines, products, row.len()),
                    });
                }
                for (h, &active) in row.iter().enumerate() {
                    let idx = schedule.index(l, p, h);
                    schedule.cells[idx] = active;
                }
            }
        }
        schedule.check_exclusivity()?;
        Ok(schedule)
    }

    /// Tensor shape `(lines, products, hours)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.lines, self.products, self.hours)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the tensor has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn row_start(&self, line: usize, product: usize) -> usize {
        (line * self.products + product) * self.hours
    }

    #[inline]
    fn index(&self, line: usize, product: usize, hour: usize) -> usize {
        debug_assert!(line < self.lines && product < self.products && hour < self.hours);
        self.row_start(line, product) + hour
    }

    /// Whether `product` runs on `line` during `hour`.
    #[inline]
    pub fn get(&self, line: usize, product: usize, hour: usize) -> bool {
        self.cells[self.index(line, product, hour)]
    }

    /// Hour row of one `(line, product)` pair.
    #[inline]
    pub fn row(&self, line: usize, product: usize) -> &[bool] {
        let start = self.row_start(line, product);
        &self.cells[start..start + self.hours]
    }

    /// The product running on `line` during `hour`, if any.
    pub fn active_product(&self, line: usize, hour: usize) -> Option<usize> {
        (0..self.products).find(|&p| self.get(line, p, hour))
    }

    /// Whether the line runs anything during `hour`.
    #[inline]
    pub fn is_busy(&self, line: usize, hour: usize) -> bool {
        self.active_product(line, hour).is_some()
    }

    /// Number of active cells.
    pub fn active_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Cached fitness, `None` when stale.
    #[inline]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Cached fitness or `+∞` when stale (sorts last under minimization).
    #[inline]
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    /// Whether the cached fitness is valid.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Stores a computed fitness.
    #[inline]
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Marks the cached fitness as stale.
    #[inline]
    pub fn invalidate_fitness(&mut self) {
        self.fitness = None;
    }

    /// Puts `product` on `line` during `hour`, or idles the slot with `None`.
    ///
    /// Clears whatever else ran in the slot first.
    pub fn assign(&mut self, line: usize, hour: usize, product: Option<usize>) {
        for p in 0..self.products {
            let idx = self.index(line, p, hour);
            self.cells[idx] = false;
        }
        if let Some(p) = product {
            let idx = self.index(line, p, hour);
            self.cells[idx] = true;
        }
        self.fitness = None;
    }

    /// Toggles one cell while keeping the slot exclusive.
    ///
    /// If another product is active in `(line, hour)` it is cleared before
    /// the toggle, so the slot never holds two products even transiently.
    pub fn toggle_exclusive(&mut self, line: usize, product: usize, hour: usize) {
        if let Some(active) = self.active_product(line, hour) {
            if active != product {
                let idx = self.index(line, active, hour);
                self.cells[idx] = false;
            }
        }
        let idx = self.index(line, product, hour);
        self.cells[idx] = !self.cells[idx];
        self.fitness = None;
    }

    /// Swaps the box `lines × all products × hours` with `other`.
    ///
    /// Whole product columns move together, so exclusivity of both
    /// schedules is preserved without repair.
    ///
    /// # Errors
    /// `ShapeMismatch` when the shapes differ.
    pub fn swap_box(
        &mut self,
        other: &mut Schedule,
        lines: Range<usize>,
        hours: Range<usize>,
    ) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }
        let lines = lines.start.min(self.lines)..lines.end.min(self.lines);
        let hours = hours.start.min(self.hours)..hours.end.min(self.hours);
        if hours.is_empty() {
            return Ok(());
        }

        for l in lines {
            for p in 0..self.products {
                let start = self.row_start(l, p);
                let range = start + hours.start..start + hours.end;
                self.cells[range.clone()].swap_with_slice(&mut other.cells[range]);
            }
        }
        self.fitness = None;
        other.fitness = None;
        Ok(())
    }

    /// Verifies the exclusivity invariant.
    ///
    /// # Errors
    /// `InvariantViolation` naming the first offending slot.
    pub fn check_exclusivity(&self) -> Result<()> {
        for line in 0..self.lines {
            for hour in 0..self.hours {
                let active = (0..self.products)
                    .filter(|&p| self.get(line, p, hour))
                    .count();
                if active > 1 {
                    return Err(Error::InvariantViolation { line, hour, active });
                }
            }
        }
        Ok(())
    }

    /// Busy/idle row of a line across the horizon.
    pub fn line_occupancy(&self, line: usize) -> Vec<bool> {
        (0..self.hours).map(|h| self.is_busy(line, h)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturated_violates_exclusivity() {
        let s = Schedule::saturated(2, 3, 4);
        assert!(matches!(
            s.check_exclusivity(),
            Err(Error::InvariantViolation {
                line: 0,
                hour: 0,
                active: 3
            })
        ));
        assert!(Schedule::saturated(2, 1, 4).check_exclusivity().is_ok());
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::empty(2, 3, 4);
        assert_eq!(s.shape(), (2, 3, 4));
        assert_eq!(s.len(), 24);
        assert_eq!(s.active_cells(), 0);
        assert!(s.fitness().is_none());
        assert!(s.check_exclusivity().is_ok());
    }

    #[test]
    fn test_assign_replaces_product() {
        let mut s = Schedule::empty(1, 3, 2);
        s.assign(0, 1, Some(0));
        s.assign(0, 1, Some(2));
        assert_eq!(s.active_product(0, 1), Some(2));
        assert!(!s.get(0, 0, 1));
        s.assign(0, 1, None);
        assert!(!s.is_busy(0, 1));
    }

    #[test]
    fn test_toggle_repairs_slot() {
        let mut s = Schedule::empty(1, 3, 1);
        s.assign(0, 0, Some(1));
        s.set_fitness(5.0);

        s.toggle_exclusive(0, 2, 0);
        assert_eq!(s.active_product(0, 0), Some(2));
        assert!(!s.get(0, 1, 0));
        assert!(s.fitness().is_none());

        // Toggling the active product idles the slot
        s.toggle_exclusive(0, 2, 0);
        assert_eq!(s.active_product(0, 0), None);
        assert!(s.check_exclusivity().is_ok());
    }

    #[test]
    fn test_from_cells_rejects_overlap() {
        let rows = vec![vec![vec![true, false], vec![true, true]]];
        let err = Schedule::from_cells(&rows).unwrap_err();
        assert_eq!(
            err,
            Error::InvariantViolation {
                line: 0,
                hour: 0,
                active: 2
            }
        );
    }

    #[test]
    fn test_from_cells_rejects_ragged() {
        let rows = vec![vec![vec![true, false], vec![false]]];
        assert!(matches!(
            Schedule::from_cells(&rows),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_swap_box_moves_product_columns() {
        let mut a = Schedule::empty(2, 2, 3);
        let mut b = Schedule::empty(2, 2, 3);
        for h in 0..3 {
            a.assign(1, h, Some(0));
            b.assign(1, h, Some(1));
        }
        a.set_fitness(1.0);
        b.set_fitness(2.0);

        a.swap_box(&mut b, 1..2, 1..3).unwrap();

        assert_eq!(a.active_product(1, 0), Some(0));
        assert_eq!(a.active_product(1, 1), Some(1));
        assert_eq!(a.active_product(1, 2), Some(1));
        assert_eq!(b.active_product(1, 0), Some(1));
        assert_eq!(b.active_product(1, 2), Some(0));
        assert!(a.fitness().is_none() && b.fitness().is_none());
        assert!(a.check_exclusivity().is_ok() && b.check_exclusivity().is_ok());
    }

    #[test]
    fn test_swap_box_shape_mismatch() {
        let mut a = Schedule::empty(2, 2, 3);
        let mut b = Schedule::empty(2, 2, 4);
        assert!(a.swap_box(&mut b, 0..1, 0..1).is_err());
    }

    #[test]
    fn test_equality_ignores_fitness() {
        let mut a = Schedule::empty(1, 1, 2);
        let b = Schedule::empty(1, 1, 2);
        a.set_fitness(3.0);
        assert_eq!(a, b);
        a.assign(0, 0, Some(0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_line_occupancy() {
        let mut s = Schedule::empty(2, 2, 3);
        s.assign(0, 0, Some(1));
        s.assign(0, 2, Some(0));
        assert_eq!(s.line_occupancy(0), vec![true, false, true]);
        assert_eq!(s.line_occupancy(1), vec![false, false, false]);
    }
}
