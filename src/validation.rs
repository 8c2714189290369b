//! Input validation for facility models.
//!
//! Checks structural integrity of a [`FacilityModel`] before it is handed
//! to the engine. Detects:
//! - Duplicate IDs
//! - Dangling references (product → bulk, bulk → recipe/line, line → product)
//! - Non-positive production rates
//! - Empty planning axes (no lines, no products, zero-hour horizon)

use crate::models::FacilityModel;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A product references a bulk product that doesn't exist.
    InvalidBulkReference,
    /// A bulk product references a recipe that doesn't exist.
    InvalidRecipeReference,
    /// A bulk product lists a line that doesn't exist.
    InvalidLineReference,
    /// A line lists a product that doesn't exist.
    InvalidProductReference,
    /// A production rate is zero, negative, or not finite.
    InvalidRate,
    /// A bulk product's changeover time is negative or not finite.
    InvalidTransitionTime,
    /// One of the schedule axes has length zero.
    EmptyAxis,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a facility model.
///
/// Checks:
/// 1. At least one line, one product, and one working hour
/// 2. No duplicate line, product, or bulk product IDs
/// 3. Every product references an existing bulk product
/// 4. Every bulk product references an existing recipe and existing lines
/// 5. Every line capability references an existing product with a positive rate
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_facility(facility: &FacilityModel) -> ValidationResult {
    let mut errors = Vec::new();

    if facility.num_lines() == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyAxis,
            "Facility has no production lines",
        ));
    }
    if facility.num_products() == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyAxis,
            "Facility has no products",
        ));
    }
    if facility.num_hours() == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyAxis,
            "Planning horizon has zero working hours",
        ));
    }

    let mut line_ids = HashSet::new();
    for line in &facility.production_lines {
        if !line_ids.insert(line.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate line ID: {}", line.id),
            ));
        }
    }

    let mut product_ids = HashSet::new();
    for product in &facility.products {
        if !product_ids.insert(product.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate product ID: {}", product.id),
            ));
        }
    }

    let mut bulk_ids = HashSet::new();
    for bulk in &facility.bulk_products {
        if !bulk_ids.insert(bulk.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate bulk product ID: {}", bulk.id),
            ));
        }
    }

    for product in &facility.products {
        if !bulk_ids.contains(&product.bulk_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidBulkReference,
                format!(
                    "Product '{}' references unknown bulk product {}",
                    product.id, product.bulk_id
                ),
            ));
        }
    }

    for bulk in &facility.bulk_products {
        if !(bulk.transition_time.is_finite() && bulk.transition_time >= 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTransitionTime,
                format!(
                    "Bulk product {} has invalid transition time {}",
                    bulk.id, bulk.transition_time
                ),
            ));
        }
        if !facility.recipes.contains_key(&bulk.recipe_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRecipeReference,
                format!(
                    "Bulk product {} references unknown recipe {}",
                    bulk.id, bulk.recipe_id
                ),
            ));
        }
        for line_id in &bulk.eligible_line_ids {
            if !line_ids.contains(line_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidLineReference,
                    format!("Bulk product {} lists unknown line {}", bulk.id, line_id),
                ));
            }
        }
    }

    for line in &facility.production_lines {
        for (&product_id, &rate) in &line.product_rates {
            if !product_ids.contains(&product_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidProductReference,
                    format!("Line {} lists unknown product {}", line.id, product_id),
                ));
            }
            if !(rate.is_finite() && rate > 0.0) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidRate,
                    format!(
                        "Line {} has invalid rate {} for product {}",
                        line.id, rate, product_id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{demo_facility, BulkProduct, Product, ProductionLine};

    #[test]
    fn test_valid_input() {
        assert!(validate_facility(&demo_facility()).is_ok());
    }

    #[test]
    fn test_duplicate_line_id() {
        let facility = demo_facility().with_line(ProductionLine::new(0).with_product(0, 10.0));
        let errors = validate_facility(&facility).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("line")));
    }

    #[test]
    fn test_invalid_bulk_reference() {
        let facility = demo_facility().with_product(Product::new(9, 42, "Orphan"));
        let errors = validate_facility(&facility).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidBulkReference));
    }

    #[test]
    fn test_invalid_recipe_and_line_reference() {
        let facility =
            demo_facility().with_bulk_product(BulkProduct::new(7, 99, 1.0).with_lines(vec![5]));
        let errors = validate_facility(&facility).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidRecipeReference));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidLineReference));
    }

    #[test]
    fn test_invalid_transition_time() {
        for time in [-0.5, f64::NAN, f64::INFINITY] {
            let facility =
                demo_facility().with_bulk_product(BulkProduct::new(7, 0, time).with_lines(vec![0]));
            let errors = validate_facility(&facility).unwrap_err();
            assert_eq!(errors.len(), 1, "{time}");
            assert_eq!(errors[0].kind, ValidationErrorKind::InvalidTransitionTime);
        }
        let facility =
            demo_facility().with_bulk_product(BulkProduct::new(7, 0, 0.0).with_lines(vec![0]));
        assert!(validate_facility(&facility).is_ok());
    }

    #[test]
    fn test_invalid_product_reference_and_rate() {
        let facility = demo_facility().with_line(
            ProductionLine::new(8)
                .with_product(77, 100.0)
                .with_product(0, 0.0),
        );
        let errors = validate_facility(&facility).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidProductReference));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidRate));
    }

    #[test]
    fn test_empty_axes() {
        let mut facility = demo_facility();
        facility.production_lines.clear();
        facility.shifts.total_working_hours = 0;

        let errors = validate_facility(&facility).unwrap_err();
        let empty = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::EmptyAxis)
            .count();
        assert_eq!(empty, 2);
    }
}
