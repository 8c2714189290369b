//! Shared fixtures for integration tests.

use u_evo_schedule::models::{
    BulkProduct, FacilityModel, Product, ProductionLine, ShiftStructure,
};

/// Two-line snack plant over a 48-hour horizon.
pub fn snack_plant() -> FacilityModel {
    FacilityModel::new("Snack plant", ShiftStructure::new(2, 8, 48))
        .with_start_date("2022-09-18")
        .with_line(
            ProductionLine::new(10)
                .with_product(1, 300.0)
                .with_product(2, 450.0)
                .with_setup_time(1.0),
        )
        .with_line(
            ProductionLine::new(20)
                .with_product(2, 200.0)
                .with_product(3, 600.0)
                .with_setup_time(0.5),
        )
        .with_product(
            Product::new(1, 100, "Crisps 100g")
                .with_unit_weight(100.0)
                .with_demand(20.0, 60.0),
        )
        .with_product(
            Product::new(2, 100, "Crisps 50g")
                .with_unit_weight(50.0)
                .with_demand(0.0, 120.0),
        )
        .with_product(
            Product::new(3, 200, "Puffs 75g")
                .with_priority(2)
                .with_unit_weight(75.0)
                .with_demand(10.0, 90.0),
        )
        .with_bulk_product(BulkProduct::new(100, 1, 0.5).with_lines(vec![10, 20]))
        .with_bulk_product(BulkProduct::new(200, 2, 1.0).with_lines(vec![20]))
        .with_recipe(1, &[("potato", 0.85), ("oil", 0.1)])
        .with_recipe(2, &[("corn", 0.9)])
        .with_raw_material("potato", 20_000.0)
        .with_raw_material("oil", 3_000.0)
        .with_raw_material("corn", 10_000.0)
}
