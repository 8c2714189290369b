//! Parent selection.
//!
//! All functions return indices into the population so the caller decides
//! when to clone. Lower fitness wins; unevaluated schedules rank last.

use rand::Rng;

use crate::models::Schedule;

/// Tournament selection.
///
/// Each of the `k` picks samples `tournament_size` individuals uniformly
/// with replacement and keeps the fittest.
pub fn tournament<R: Rng>(
    population: &[Schedule],
    k: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<usize> {
    if population.is_empty() {
        return Vec::new();
    }
    let size = tournament_size.max(1);
    (0..k)
        .map(|_| {
            let mut best = rng.random_range(0..population.len());
            for _ in 1..size {
                let challenger = rng.random_range(0..population.len());
                if population[challenger].fitness_or_worst()
                    < population[best].fitness_or_worst()
                {
                    best = challenger;
                }
            }
            best
        })
        .collect()
}

/// Truncation selection of the `k` fittest.
///
/// When `k` exceeds the population the ranking wraps around.
pub fn best(population: &[Schedule], k: usize) -> Vec<usize> {
    let ranked = ranked_indices(population);
    if ranked.is_empty() {
        return Vec::new();
    }
    ranked.iter().copied().cycle().take(k).collect()
}

/// Uniform random selection with replacement.
pub fn random<R: Rng>(population: &[Schedule], k: usize, rng: &mut R) -> Vec<usize> {
    if population.is_empty() {
        return Vec::new();
    }
    (0..k)
        .map(|_| rng.random_range(0..population.len()))
        .collect()
}

/// Population indices sorted by ascending fitness (stable).
pub fn ranked_indices(population: &[Schedule]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..population.len()).collect();
    indices.sort_by(|&a, &b| {
        population[a]
            .fitness_or_worst()
            .total_cmp(&population[b].fitness_or_worst())
    });
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn population(fitness: &[f64]) -> Vec<Schedule> {
        fitness
            .iter()
            .map(|&f| {
                let mut s = Schedule::empty(1, 1, 1);
                s.set_fitness(f);
                s
            })
            .collect()
    }

    #[test]
    fn test_best_selection() {
        let pop = population(&[5.0, 1.0, 3.0, 2.0]);
        assert_eq!(best(&pop, 2), vec![1, 3]);
        assert_eq!(best(&pop, 6), vec![1, 3, 2, 0, 1, 3]);
    }

    #[test]
    fn test_unevaluated_ranks_last() {
        let mut pop = population(&[5.0, 1.0]);
        pop.push(Schedule::empty(1, 1, 1));
        assert_eq!(ranked_indices(&pop), vec![1, 0, 2]);
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let pop = population(&[100.0, 1.0, 50.0, 75.0]);
        let mut rng = SmallRng::seed_from_u64(42);
        let picks = tournament(&pop, 1000, 3, &mut rng);
        let best_count = picks.iter().filter(|&&i| i == 1).count();
        let worst_count = picks.iter().filter(|&&i| i == 0).count();
        assert!(best_count > worst_count * 3);
    }

    #[test]
    fn test_tournament_full_pressure() {
        // Size 1 degenerates to uniform sampling; every index should show up
        let pop = population(&[4.0, 3.0, 2.0, 1.0]);
        let mut rng = SmallRng::seed_from_u64(1);
        let picks = tournament(&pop, 200, 1, &mut rng);
        for i in 0..4 {
            assert!(picks.contains(&i));
        }
    }

    #[test]
    fn test_random_selection_bounds() {
        let pop = population(&[1.0, 2.0, 3.0]);
        let mut rng = SmallRng::seed_from_u64(7);
        let picks = random(&pop, 50, &mut rng);
        assert_eq!(picks.len(), 50);
        assert!(picks.iter().all(|&i| i < 3));
    }

    #[test]
    fn test_empty_population() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(tournament(&[], 3, 2, &mut rng).is_empty());
        assert!(best(&[], 3).is_empty());
        assert!(random(&[], 3, &mut rng).is_empty());
    }
}
