//! Hall of fame: bounded archive of the best schedules ever seen.
//!
//! Members are kept sorted by ascending fitness and deduplicated by tensor
//! equality. Updating never worsens the best fitness, which is what makes
//! re-injecting the members each generation an elitism mechanism.

use crate::models::Schedule;

/// Bounded, fitness-ordered archive.
#[derive(Debug, Clone, Default)]
pub struct HallOfFame {
    capacity: usize,
    members: Vec<Schedule>,
}

impl HallOfFame {
    /// Creates an empty archive holding up to `capacity` schedules.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            members: Vec::with_capacity(capacity),
        }
    }

    /// Maximum number of members.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members, best first.
    pub fn members(&self) -> &[Schedule] {
        &self.members
    }

    /// The best schedule.
    pub fn best(&self) -> Option<&Schedule> {
        self.members.first()
    }

    /// Fitness of the best schedule.
    pub fn best_fitness(&self) -> Option<f64> {
        self.best().and_then(Schedule::fitness)
    }

    /// Offers every evaluated schedule of `candidates` to the archive.
    ///
    /// A candidate enters when the archive has room or it beats the current
    /// worst member, and no equal tensor is already archived. Returns the
    /// number of schedules inserted.
    pub fn update(&mut self, candidates: &[Schedule]) -> usize {
        if self.capacity == 0 {
            return 0;
        }
        let mut inserted = 0;
        for candidate in candidates {
            let Some(fitness) = candidate.fitness() else {
                continue;
            };
            let full = self.members.len() >= self.capacity;
            if full && fitness >= self.worst_fitness() {
                continue;
            }
            if self.members.iter().any(|m| m == candidate) {
                continue;
            }
            if full {
                self.members.pop();
            }
            let at = self
                .members
                .partition_point(|m| m.fitness_or_worst() <= fitness);
            self.members.insert(at, candidate.clone());
            inserted += 1;
        }
        inserted
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    fn worst_fitness(&self) -> f64 {
        self.members
            .last()
            .map_or(f64::INFINITY, Schedule::fitness_or_worst)
    }
}
