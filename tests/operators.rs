//! Invariant and determinism tests of the genetic operators and evaluator.

mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use u_evo_schedule::evaluation::{ConstraintEvaluator, PenaltyWeights};
use u_evo_schedule::ga::operators::{CrossoverMethod, MutationMethod};
use u_evo_schedule::ga::{box_crossover_at, flip_bit_mutation, random_schedule};
use u_evo_schedule::models::Schedule;

fn exclusive(schedule: &Schedule) -> bool {
    let (lines, products, hours) = schedule.shape();
    (0..lines).all(|l| {
        (0..hours).all(|h| (0..products).filter(|&p| schedule.get(l, p, h)).count() <= 1)
    })
}

#[test]
fn test_initializer_exclusivity() {
    let facility = common::snack_plant();
    for seed in 0..500 {
        let mut rng = StdRng::seed_from_u64(seed);
        let schedule = random_schedule(&facility, &mut rng);
        assert_eq!(schedule.shape(), facility.tensor_shape());
        assert!(exclusive(&schedule), "seed {seed}");
    }
}

#[test]
fn test_crossover_and_mutation_exclusivity() {
    let facility = common::snack_plant();
    for seed in 0..500 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut a = random_schedule(&facility, &mut rng);
        let mut b = random_schedule(&facility, &mut rng);

        CrossoverMethod::TwoPointBox.mate(&mut a, &mut b, &mut rng).unwrap();
        assert!(exclusive(&a) && exclusive(&b), "crossover, seed {seed}");

        MutationMethod::FlipBit { indpb: Some(0.05) }.mutate(&mut a, &mut rng);
        flip_bit_mutation(&mut b, 0.5, &mut rng);
        assert!(exclusive(&a) && exclusive(&b), "mutation, seed {seed}");
    }
}

#[test]
fn test_forced_box_crossover_2x2x4() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut a = u_evo_schedule::ga::random_schedule_with_shape(2, 2, 4, &mut rng);
    let mut b = u_evo_schedule::ga::random_schedule_with_shape(2, 2, 4, &mut rng);
    a.set_fitness(1.0);
    b.set_fitness(2.0);
    let (orig_a, orig_b) = (a.clone(), b.clone());

    box_crossover_at(&mut a, &mut b, 1..2, 1..3).unwrap();

    for line in 0..2 {
        for product in 0..2 {
            for hour in 0..4 {
                let inside = line == 1 && (hour == 1 || hour == 2);
                let (expect_a, expect_b) = if inside {
                    (orig_b.get(line, product, hour), orig_a.get(line, product, hour))
                } else {
                    (orig_a.get(line, product, hour), orig_b.get(line, product, hour))
                };
                assert_eq!(a.get(line, product, hour), expect_a);
                assert_eq!(b.get(line, product, hour), expect_b);
            }
        }
    }
    assert!(a.fitness().is_none() && b.fitness().is_none());
}

#[test]
fn test_fitness_is_deterministic() {
    let facility = common::snack_plant();
    let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::default());
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let schedule = random_schedule(&facility, &mut rng);
        let first = evaluator.fitness(&schedule);
        let second = evaluator.fitness(&schedule);
        assert_eq!(first.to_bits(), second.to_bits());
        assert!(first.is_finite() && first >= 0.0);
    }
}

#[test]
fn test_invalid_assignment_is_penalized() {
    let facility = common::snack_plant();
    let evaluator = ConstraintEvaluator::new(&facility, PenaltyWeights::new(100.0, 0.0, 0.0));
    let (l, p, h) = facility.tensor_shape();

    let mut schedule = Schedule::empty(l, p, h);
    // Line 10 (index 0) cannot make product 3 (index 2)
    for hour in 0..5 {
        schedule.assign(0, hour, Some(2));
    }
    assert!((evaluator.fitness(&schedule) - 500.0).abs() < 1e-10);
}
