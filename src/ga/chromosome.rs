//! Schedule initialization and variation operators.
//!
//! # Encoding
//!
//! Individuals are [`Schedule`] tensors `[line][product][hour]`. Every
//! operator here keeps the exclusivity invariant (at most one product per
//! line-hour):
//!
//! - **Initialization** assigns each busy hour slot to exactly one product.
//! - **Box crossover** swaps whole product columns, so each slot is taken
//!   intact from one parent.
//! - **Flip-bit mutation** clears the slot's current product before
//!   toggling a different one.

use std::ops::Range;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::models::{FacilityModel, Schedule};

/// Creates a random valid schedule for a facility.
pub fn random_schedule<R: Rng>(facility: &FacilityModel, rng: &mut R) -> Schedule {
    let (lines, products, hours) = facility.tensor_shape();
    random_schedule_with_shape(lines, products, hours, rng)
}

/// Creates a random valid schedule of the given shape.
///
/// Per line: draw a random busy/idle pattern over the horizon, shuffle the
/// product order, and let each product in turn claim a uniformly sized
/// random subset of the still-unclaimed busy hours. The last product takes
/// whatever remains, so every busy hour ends up with exactly one product.
pub fn random_schedule_with_shape<R: Rng>(
    lines: usize,
    products: usize,
    hours: usize,
    rng: &mut R,
) -> Schedule {
    let mut schedule = Schedule::empty(lines, products, hours);
    if products == 0 {
        return schedule;
    }

    let mut order: Vec<usize> = (0..products).collect();
    for line in 0..lines {
        let mut unclaimed: Vec<usize> = (0..hours).filter(|_| rng.random_bool(0.5)).collect();
        order.shuffle(rng);

        for (position, &product) in order.iter().enumerate() {
            if unclaimed.is_empty() {
                break;
            }
            let take = if position + 1 == order.len() {
                unclaimed.len()
            } else {
                rng.random_range(0..=unclaimed.len())
            };
            unclaimed.shuffle(rng);
            let claimed = unclaimed.split_off(unclaimed.len() - take);
            for hour in claimed {
                schedule.assign(line, hour, Some(product));
            }
        }
    }
    schedule
}

// ======================== Crossover operators ========================

/// Draws a crossover interval over an axis of length `size`.
///
/// Two distinct points in `[1, size]`, ordered to `lo..hi`. Axes shorter
/// than two collapse to the full axis.
pub fn cut_points<R: Rng>(size: usize, rng: &mut R) -> Range<usize> {
    if size < 2 {
        return 0..size;
    }
    let first = rng.random_range(1..=size);
    let mut second = rng.random_range(1..size);
    if second >= first {
        second += 1;
        first..second
    } else {
        second..first
    }
}

/// Swaps the box `lines × all products × hours` between two schedules.
///
/// # Errors
/// `ShapeMismatch` when the schedules differ in shape.
pub fn box_crossover_at(
    a: &mut Schedule,
    b: &mut Schedule,
    lines: Range<usize>,
    hours: Range<usize>,
) -> Result<()> {
    a.swap_box(b, lines, hours)
}

/// Two-point box crossover: random line interval × random hour interval.
pub fn two_point_box_crossover<R: Rng>(
    a: &mut Schedule,
    b: &mut Schedule,
    rng: &mut R,
) -> Result<()> {
    let (lines, _, hours) = a.shape();
    let line_cut = cut_points(lines, rng);
    let hour_cut = cut_points(hours, rng);
    box_crossover_at(a, b, line_cut, hour_cut)
}

/// One-point hour crossover: all lines exchange their tail after a random hour.
pub fn one_point_hour_crossover<R: Rng>(
    a: &mut Schedule,
    b: &mut Schedule,
    rng: &mut R,
) -> Result<()> {
    let (lines, _, hours) = a.shape();
    let cut = if hours < 2 {
        0
    } else {
        rng.random_range(1..hours)
    };
    box_crossover_at(a, b, 0..lines, cut..hours)
}

// ======================== Mutation operators ========================

/// Flip-bit mutation with slot repair.
///
/// Each cell is toggled independently with probability `indpb`. A toggle
/// that would start a second product in a busy slot first clears the
/// product already there.
pub fn flip_bit_mutation<R: Rng>(schedule: &mut Schedule, indpb: f64, rng: &mut R) {
    let indpb = indpb.clamp(0.0, 1.0);
    let (lines, products, hours) = schedule.shape();
    for line in 0..lines {
        for product in 0..products {
            for hour in 0..hours {
                if rng.random_bool(indpb) {
                    schedule.toggle_exclusive(line, product, hour);
                }
            }
        }
    }
}
