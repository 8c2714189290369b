//! Product and bulk-product (HALB) models.
//!
//! A bulk product is the semi-finished intermediate a line is configured
//! to make before packaging. Every packaged product belongs to exactly one
//! bulk product; switching between runs costs the bulk product's
//! transition time.

use serde::{Deserialize, Serialize};

/// A packaged end product (e.g. a 100g bag of a snack).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: u32,
    /// Bulk product this product is packaged from.
    pub bulk_id: u32,
    /// Human-readable name.
    pub name: String,
    /// Priority, 1 (low) to 5 (urgent).
    pub priority: u8,
    /// Weight of one packaged unit (grams).
    pub unit_weight: f64,
    /// Units already in stock (thousands).
    pub stock: f64,
    /// Forecast demand for the horizon (thousands of units).
    pub forecast: f64,
    /// Unit package used, if packaging is tracked.
    #[serde(default)]
    pub unit_package_id: Option<u32>,
    /// Retailer package used, if packaging is tracked.
    #[serde(default)]
    pub retailer_package_id: Option<u32>,
}

/// A bulk (HALB) product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkProduct {
    /// Unique bulk product identifier.
    pub id: u32,
    /// Recipe used to make it.
    pub recipe_id: u32,
    /// Changeover time lost per production run (hours).
    pub transition_time: f64,
    /// Lines able to produce it.
    pub eligible_line_ids: Vec<u32>,
}

impl Product {
    /// Creates a product with priority 1 and no stock/forecast.
    pub fn new(id: u32, bulk_id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            bulk_id,
            name: name.into(),
            priority: 1,
            unit_weight: 0.0,
            stock: 0.0,
            forecast: 0.0,
            unit_package_id: None,
            retailer_package_id: None,
        }
    }

    /// Sets the priority (clamped to 1..=5).
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(1, 5);
        self
    }

    /// Sets the unit weight (grams).
    pub fn with_unit_weight(mut self, grams: f64) -> Self {
        self.unit_weight = grams;
        self
    }

    /// Sets stock and forecast (thousands of units).
    pub fn with_demand(mut self, stock: f64, forecast: f64) -> Self {
        self.stock = stock;
        self.forecast = forecast;
        self
    }

    /// Sets the unit and retailer package ids.
    pub fn with_packages(mut self, unit_package_id: u32, retailer_package_id: u32) -> Self {
        self.unit_package_id = Some(unit_package_id);
        self.retailer_package_id = Some(retailer_package_id);
        self
    }

    /// Quantity still to produce over the horizon, in kg.
    ///
    /// `(forecast - stock)` thousand units × `unit_weight` grams. May be zero
    /// or negative when stock already covers the forecast.
    pub fn target_quantity_kg(&self) -> f64 {
        self.unit_weight * (self.forecast - self.stock)
    }
}

impl BulkProduct {
    /// Creates a bulk product.
    pub fn new(id: u32, recipe_id: u32, transition_time: f64) -> Self {
        Self {
            id,
            recipe_id,
            transition_time,
            eligible_line_ids: Vec::new(),
        }
    }

    /// Sets the eligible lines.
    pub fn with_lines(mut self, line_ids: Vec<u32>) -> Self {
        self.eligible_line_ids = line_ids;
        self
    }
}
