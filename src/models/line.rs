//! Production line model.
//!
//! A production line runs one product at a time. Its capability list maps
//! each producible product id to a production rate in kg per hour; products
//! missing from the list cannot legally be scheduled on the line.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A production line on the shop floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLine {
    /// Unique line identifier.
    pub id: u32,
    /// Capable product id → production rate (kg/hour).
    pub product_rates: BTreeMap<u32, f64>,
    /// Operators needed to run the line.
    pub manpower: u32,
    /// Setup time once per working day (hours).
    pub setup_time: f64,
}

impl ProductionLine {
    /// Creates a line with no capabilities.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            product_rates: BTreeMap::new(),
            manpower: 0,
            setup_time: 0.0,
        }
    }

    /// Adds a producible product with its rate (kg/hour).
    pub fn with_product(mut self, product_id: u32, rate_kg_per_hour: f64) -> Self {
        self.product_rates.insert(product_id, rate_kg_per_hour);
        self
    }

    /// Sets the manpower requirement.
    pub fn with_manpower(mut self, manpower: u32) -> Self {
        self.manpower = manpower;
        self
    }

    /// Sets the daily setup time (hours).
    pub fn with_setup_time(mut self, hours: f64) -> Self {
        self.setup_time = hours;
        self
    }

    /// Whether the line is capability-listed for a product.
    #[inline]
    pub fn can_produce(&self, product_id: u32) -> bool {
        self.product_rates.contains_key(&product_id)
    }

    /// Production rate for a product, `None` if the line cannot produce it.
    #[inline]
    pub fn rate_for(&self, product_id: u32) -> Option<f64> {
        self.product_rates.get(&product_id).copied()
    }
}
