//! Facility model: the static description of a production site.
//!
//! Read-only for the whole optimization run. The order of
//! [`FacilityModel::production_lines`] and [`FacilityModel::products`]
//! defines the line and product axes of every [`Schedule`](super::Schedule).
//!
//! # Units
//!
//! | Quantity | Unit |
//! |----------|------|
//! | Line rate | kg / hour |
//! | Product weight | grams per unit |
//! | Stock / forecast | thousands of units |
//! | Recipe quantity | material kg per kg of bulk product |
//! | Horizon | working hours |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BulkProduct, Product, ProductionLine};

/// Shift structure of the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftStructure {
    /// Shifts per working day.
    pub num_shifts: u32,
    /// Shift length (hours).
    pub shift_duration: u32,
    /// Hour of day the first shift usually starts.
    pub usual_start_hour: u32,
    /// Length of the planning horizon in working hours.
    pub total_working_hours: usize,
}

impl ShiftStructure {
    /// Creates a shift structure.
    pub fn new(num_shifts: u32, shift_duration: u32, total_working_hours: usize) -> Self {
        Self {
            num_shifts,
            shift_duration,
            usual_start_hour: 6,
            total_working_hours,
        }
    }

    /// Sets the usual start hour.
    pub fn with_start_hour(mut self, hour: u32) -> Self {
        self.usual_start_hour = hour;
        self
    }

    /// Working hours per day.
    #[inline]
    pub fn hours_per_day(&self) -> u32 {
        self.num_shifts * self.shift_duration
    }
}

/// A retailer (outer) package stock entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetailerPackage {
    /// Packages in stock.
    pub stock: f64,
    /// Unit packages that fit in one retailer package.
    pub units_per_package: u32,
}

/// Packaging material stock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackagingStock {
    /// Unit package id → packages in stock.
    pub unit_packages: BTreeMap<u32, f64>,
    /// Retailer package id → stock and capacity.
    pub retailer_packages: BTreeMap<u32, RetailerPackage>,
}

/// Static description of a production site for one optimization problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityModel {
    /// Site title.
    pub title: String,
    /// Production lines (line axis order).
    pub production_lines: Vec<ProductionLine>,
    /// Products (product axis order).
    pub products: Vec<Product>,
    /// Bulk (HALB) products.
    pub bulk_products: Vec<BulkProduct>,
    /// Recipe id → (material id → kg per kg of bulk product).
    pub recipes: BTreeMap<u32, BTreeMap<String, f64>>,
    /// Material id → kg in stock.
    pub raw_material_stock: BTreeMap<String, f64>,
    /// Packaging stock.
    #[serde(default)]
    pub packaging: PackagingStock,
    /// Shift structure and horizon.
    pub shifts: ShiftStructure,
    /// First day of the horizon (`YYYY-MM-DD`).
    pub schedule_start_date: String,
}

impl FacilityModel {
    /// Creates an empty facility with the given shift structure.
    pub fn new(title: impl Into<String>, shifts: ShiftStructure) -> Self {
        Self {
            title: title.into(),
            production_lines: Vec::new(),
            products: Vec::new(),
            bulk_products: Vec::new(),
            recipes: BTreeMap::new(),
            raw_material_stock: BTreeMap::new(),
            packaging: PackagingStock::default(),
            shifts,
            schedule_start_date: String::new(),
        }
    }

    /// Adds a production line.
    pub fn with_line(mut self, line: ProductionLine) -> Self {
        self.production_lines.push(line);
        self
    }

    /// Adds a product.
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Adds a bulk product.
    pub fn with_bulk_product(mut self, bulk: BulkProduct) -> Self {
        self.bulk_products.push(bulk);
        self
    }

    /// Adds a recipe.
    pub fn with_recipe(mut self, recipe_id: u32, materials: &[(&str, f64)]) -> Self {
        let recipe = materials
            .iter()
            .map(|(id, qty)| (id.to_string(), *qty))
            .collect();
        self.recipes.insert(recipe_id, recipe);
        self
    }

    /// Sets the stock of a raw material (kg).
    pub fn with_raw_material(mut self, material_id: impl Into<String>, kg: f64) -> Self {
        self.raw_material_stock.insert(material_id.into(), kg);
        self
    }

    /// Sets the stock of a unit package.
    pub fn with_unit_package(mut self, package_id: u32, stock: f64) -> Self {
        self.packaging.unit_packages.insert(package_id, stock);
        self
    }

    /// Sets the stock of a retailer package.
    pub fn with_retailer_package(
        mut self,
        package_id: u32,
        stock: f64,
        units_per_package: u32,
    ) -> Self {
        self.packaging.retailer_packages.insert(
            package_id,
            RetailerPackage {
                stock,
                units_per_package,
            },
        );
        self
    }

    /// Sets the schedule start date.
    pub fn with_start_date(mut self, date: impl Into<String>) -> Self {
        self.schedule_start_date = date.into();
        self
    }

    /// Number of production lines.
    #[inline]
    pub fn num_lines(&self) -> usize {
        self.production_lines.len()
    }

    /// Number of products.
    #[inline]
    pub fn num_products(&self) -> usize {
        self.products.len()
    }

    /// Number of working hours in the horizon.
    #[inline]
    pub fn num_hours(&self) -> usize {
        self.shifts.total_working_hours
    }

    /// Schedule tensor shape `(lines, products, hours)`.
    #[inline]
    pub fn tensor_shape(&self) -> (usize, usize, usize) {
        (self.num_lines(), self.num_products(), self.num_hours())
    }

    /// Number of cells in a schedule tensor.
    #[inline]
    pub fn tensor_length(&self) -> usize {
        self.num_lines() * self.num_products() * self.num_hours()
    }

    /// Finds a bulk product by id.
    pub fn bulk_product(&self, bulk_id: u32) -> Option<&BulkProduct> {
        self.bulk_products.iter().find(|b| b.id == bulk_id)
    }

    /// Bulk product of the product at axis index `product`.
    pub fn bulk_of(&self, product: usize) -> Option<&BulkProduct> {
        self.products
            .get(product)
            .and_then(|p| self.bulk_product(p.bulk_id))
    }

    /// Recipe of the product at axis index `product`.
    pub fn recipe_of(&self, product: usize) -> Option<&BTreeMap<String, f64>> {
        self.bulk_of(product)
            .and_then(|b| self.recipes.get(&b.recipe_id))
    }

    /// Axis index of a line id.
    pub fn line_index(&self, line_id: u32) -> Option<usize> {
        self.production_lines.iter().position(|l| l.id == line_id)
    }

    /// Axis index of a product id.
    pub fn product_index(&self, product_id: u32) -> Option<usize> {
        self.products.iter().position(|p| p.id == product_id)
    }
}

/// Three-line snack plant used across unit tests.
#[cfg(test)]
pub(crate) fn demo_facility() -> FacilityModel {
    FacilityModel::new("Demo plant", ShiftStructure::new(3, 6, 90))
        .with_start_date("2022-09-18")
        .with_line(
            ProductionLine::new(0)
                .with_product(0, 300.0)
                .with_product(1, 400.0)
                .with_product(2, 500.0)
                .with_product(3, 250.0)
                .with_manpower(10)
                .with_setup_time(1.5),
        )
        .with_line(
            ProductionLine::new(1)
                .with_product(0, 800.0)
                .with_product(1, 250.0)
                .with_product(3, 450.0)
                .with_manpower(12)
                .with_setup_time(0.5),
        )
        .with_line(
            ProductionLine::new(2)
                .with_product(2, 350.0)
                .with_manpower(6)
                .with_setup_time(1.0),
        )
        .with_product(
            Product::new(0, 0, "Crisps 100g")
                .with_unit_weight(100.0)
                .with_demand(50.0, 100.0)
                .with_packages(0, 0),
        )
        .with_product(
            Product::new(1, 0, "Crisps 150g")
                .with_unit_weight(150.0)
                .with_demand(0.0, 80.0)
                .with_packages(1, 1),
        )
        .with_product(
            Product::new(2, 1, "Puffs 50g")
                .with_priority(2)
                .with_unit_weight(50.0)
                .with_demand(50.0, 300.0)
                .with_packages(2, 2),
        )
        .with_product(
            Product::new(3, 2, "Rings 50g")
                .with_priority(3)
                .with_unit_weight(50.0)
                .with_demand(10.0, 100.0)
                .with_packages(3, 3),
        )
        .with_bulk_product(BulkProduct::new(0, 0, 0.5).with_lines(vec![0, 1]))
        .with_bulk_product(BulkProduct::new(1, 1, 1.0).with_lines(vec![0, 2]))
        .with_bulk_product(BulkProduct::new(2, 2, 0.5).with_lines(vec![0, 1]))
        .with_recipe(0, &[("potato", 0.8), ("oil", 0.15)])
        .with_recipe(1, &[("corn", 0.7), ("peanuts", 0.3)])
        .with_recipe(2, &[("corn", 0.9)])
        .with_raw_material("potato", 40_000.0)
        .with_raw_material("oil", 8_000.0)
        .with_raw_material("corn", 30_000.0)
        .with_raw_material("peanuts", 5_000.0)
        .with_unit_package(0, 230_000.0)
        .with_unit_package(1, 130_000.0)
        .with_unit_package(2, 100_000.0)
        .with_unit_package(3, 100_000.0)
        .with_retailer_package(0, 10_000.0, 100)
        .with_retailer_package(1, 24_000.0, 50)
        .with_retailer_package(2, 2_000.0, 100)
        .with_retailer_package(3, 8_000.0, 20)
}
