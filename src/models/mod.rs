//! Production scheduling domain models.
//!
//! Provides the static facility description consumed by every other
//! component and the schedule tensor evolved by the engine.
//!
//! # Domain Mappings
//!
//! | u-evo-schedule | Snack plant example |
//! |----------------|---------------------|
//! | ProductionLine | Extruder / packing line |
//! | BulkProduct | Seasoned bulk crisps (HALB) |
//! | Product | Crisps 100g bag |
//! | Schedule | Weekly line plan, hour by hour |

mod facility;
mod line;
mod product;
mod schedule;

#[cfg(test)]
pub(crate) use facility::demo_facility;
pub use facility::{FacilityModel, PackagingStock, RetailerPackage, ShiftStructure};
pub use line::ProductionLine;
pub use product::{BulkProduct, Product};
pub use schedule::Schedule;
