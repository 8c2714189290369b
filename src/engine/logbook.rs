//! Per-generation statistics.

use serde::{Deserialize, Serialize};

use crate::models::Schedule;

/// Statistics of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogbookEntry {
    /// Generation index (0 = initial population).
    pub generation: usize,
    /// Schedules evaluated during the generation.
    pub evaluations: usize,
    /// Lowest fitness in the population, `None` when nothing is evaluated.
    pub min_fitness: Option<f64>,
    /// Mean fitness of the population, `None` when nothing is evaluated.
    pub avg_fitness: Option<f64>,
}

impl LogbookEntry {
    /// Compiles statistics over the evaluated members of a population.
    ///
    /// An empty or unevaluated population reports `None` for both values.
    pub fn from_population(generation: usize, evaluations: usize, population: &[Schedule]) -> Self {
        let fitness: Vec<f64> = population.iter().filter_map(Schedule::fitness).collect();
        let (min_fitness, avg_fitness) = if fitness.is_empty() {
            (None, None)
        } else {
            let min = fitness.iter().copied().fold(f64::INFINITY, f64::min);
            let avg = fitness.iter().sum::<f64>() / fitness.len() as f64;
            (Some(min), Some(avg))
        };
        Self {
            generation,
            evaluations,
            min_fitness,
            avg_fitness,
        }
    }
}

/// Generation-ordered statistics history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logbook {
    entries: Vec<LogbookEntry>,
}

impl Logbook {
    /// Creates an empty logbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn record(&mut self, entry: LogbookEntry) {
        debug_assert!(self
            .entries
            .last()
            .map_or(true, |last| last.generation < entry.generation));
        self.entries.push(entry);
    }

    /// All entries in generation order.
    pub fn entries(&self) -> &[LogbookEntry] {
        &self.entries
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&LogbookEntry> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Minimum fitness per generation.
    pub fn min_series(&self) -> Vec<Option<f64>> {
        self.entries.iter().map(|e| e.min_fitness).collect()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluated(fitness: f64) -> Schedule {
        let mut s = Schedule::empty(1, 1, 1);
        s.set_fitness(fitness);
        s
    }

    #[test]
    fn test_entry_statistics() {
        let population = vec![evaluated(4.0), evaluated(2.0), evaluated(6.0)];
        let entry = LogbookEntry::from_population(3, 2, &population);
        assert_eq!(entry.generation, 3);
        assert_eq!(entry.evaluations, 2);
        assert!((entry.min_fitness.unwrap() - 2.0).abs() < 1e-10);
        assert!((entry.avg_fitness.unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_entry_ignores_stale() {
        let population = vec![evaluated(3.0), Schedule::empty(1, 1, 1)];
        let entry = LogbookEntry::from_population(0, 1, &population);
        assert!((entry.avg_fitness.unwrap() - 3.0).abs() < 1e-10);

        let empty = LogbookEntry::from_population(0, 0, &[]);
        assert_eq!(empty.min_fitness, None);
        assert_eq!(empty.avg_fitness, None);
    }

    #[test]
    fn test_unevaluated_entry_survives_json() {
        let mut logbook = Logbook::new();
        logbook.record(LogbookEntry::from_population(0, 0, &[Schedule::empty(1, 1, 1)]));
        logbook.record(LogbookEntry::from_population(1, 1, &[evaluated(5.0)]));

        let json = serde_json::to_string(&logbook).unwrap();
        let back: Logbook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, logbook);
        assert_eq!(back.min_series(), vec![None, Some(5.0)]);
    }

    #[test]
    fn test_logbook_order() {
        let mut logbook = Logbook::new();
        for generation in 0..4 {
            logbook.record(LogbookEntry::from_population(
                generation,
                1,
                &[evaluated(10.0 - generation as f64)],
            ));
        }
        assert_eq!(logbook.len(), 4);
        assert_eq!(logbook.last().map(|e| e.generation), Some(3));
        assert_eq!(
            logbook.min_series(),
            vec![Some(10.0), Some(9.0), Some(8.0), Some(7.0)]
        );

        let json = serde_json::to_string(&logbook).unwrap();
        let back: Logbook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, logbook);
    }
}
