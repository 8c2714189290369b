//! Evolutionary scheduling engine.
//!
//! Runs the generational loop on a dedicated worker thread and exposes
//! thread-safe accessors to the published state.
//!
//! # Lifecycle
//!
//! ```text
//!            start                pause
//!   Idle ──────────▶ Running ◀──────────▶ Paused
//!    ▲                 │  resume            │
//!    │ stop(true)      │ stopping fired     │ stop
//!    │                 ▼                    ▼
//!   Finished/Failed ◀──────────────── Terminating
//! ```
//!
//! Control calls only set flags; the worker acts on them at the next
//! generation boundary. State is published at generation boundaries only,
//! so readers never observe a partially built generation.
//!
//! # Submodules
//!
//! - `config`: [`EngineConfig`], [`ConfigurationSnapshot`]
//! - `stopping`: [`StoppingConditions`]
//! - `control`: [`RunControl`], [`RunPhase`]
//! - `evolution`: synchronous [`Evolution`] loop
//!
//! # Reference
//! Fortin et al. (2012), "DEAP: Evolutionary Algorithms Made Easy"
//! (`eaSimple` with hall-of-fame elitism)

mod config;
mod control;
mod evolution;
mod hall_of_fame;
mod logbook;
mod stopping;

pub use config::{ConfigurationSnapshot, EngineConfig};
pub use control::{Checkpoint, RunClock, RunControl, RunPhase};
pub use evolution::Evolution;
pub use hall_of_fame::HallOfFame;
pub use logbook::{Logbook, LogbookEntry};
pub use stopping::{
    RunMetrics, StoppingCondition, StoppingConditionKind, StoppingConditions, StoppingProgress,
};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::ga::operators::{CrossoverMethod, MethodSpec, MutationMethod, SelectionMethod};
use crate::models::{FacilityModel, Schedule};
use crate::validation::validate_facility;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State published by the worker at generation boundaries.
#[derive(Debug, Default)]
struct Published {
    hall_of_fame: Vec<Schedule>,
    logbook: Logbook,
}

/// State shared between the engine handle and its worker.
#[derive(Debug)]
struct Shared {
    phase: Mutex<RunPhase>,
    stopping: Mutex<StoppingConditions>,
    published: RwLock<Published>,
    last_error: Mutex<Option<Error>>,
}

impl Shared {
    fn publish(&self, evolution: &Evolution, entry: LogbookEntry) {
        let mut published = self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        published.hall_of_fame = evolution.hall_of_fame().members().to_vec();
        published.logbook.record(entry);
    }

    fn clear_published(&self) {
        let mut published = self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *published = Published::default();
    }

    fn read_published<T>(&self, f: impl FnOnce(&Published) -> T) -> T {
        let published = self
            .published
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&published)
    }
}

/// Threaded evolutionary scheduling engine.
///
/// # Example
/// ```
/// use u_evo_schedule::engine::{Engine, EngineConfig, StoppingConditionKind};
/// use u_evo_schedule::models::{BulkProduct, FacilityModel, Product, ProductionLine, ShiftStructure};
///
/// let facility = FacilityModel::new("demo", ShiftStructure::new(2, 8, 16))
///     .with_line(ProductionLine::new(0).with_product(0, 100.0))
///     .with_product(Product::new(0, 0, "Chips").with_unit_weight(100.0).with_demand(0.0, 10.0))
///     .with_bulk_product(BulkProduct::new(0, 0, 0.5).with_lines(vec![0]))
///     .with_recipe(0, &[("potato", 1.0)]);
///
/// let config = EngineConfig::default()
///     .with_population_size(20)
///     .with_hall_of_fame_size(2)
///     .with_stopping_condition(StoppingConditionKind::Generations, 5.0, true)
///     .unwrap();
///
/// let engine = Engine::new(facility, config).unwrap();
/// engine.start().unwrap();
/// engine.wait().unwrap();
///
/// assert_eq!(engine.statistics_history().len(), 6);
/// assert!(engine.best_solution().is_some());
/// ```
#[derive(Debug)]
pub struct Engine {
    facility: Arc<FacilityModel>,
    config: Mutex<EngineConfig>,
    shared: Arc<Shared>,
    control: Mutex<Arc<RunControl>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    /// Creates an idle engine.
    ///
    /// # Errors
    /// `InvalidFacility` when the facility fails validation, or a
    /// configuration error from `EngineConfig::validate`.
    pub fn new(facility: FacilityModel, config: EngineConfig) -> Result<Self> {
        if let Err(errors) = validate_facility(&facility) {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(Error::InvalidFacility(messages.join("; ")));
        }
        config.validate()?;

        let shared = Shared {
            phase: Mutex::new(RunPhase::Idle),
            stopping: Mutex::new(config.stopping.clone()),
            published: RwLock::new(Published::default()),
            last_error: Mutex::new(None),
        };
        Ok(Self {
            facility: Arc::new(facility),
            config: Mutex::new(config),
            shared: Arc::new(shared),
            control: Mutex::new(Arc::new(RunControl::new())),
            worker: Mutex::new(None),
        })
    }

    /// The facility being scheduled.
    pub fn facility(&self) -> &FacilityModel {
        &self.facility
    }

    // ======================== Lifecycle ========================

    /// Starts a run on a new worker thread.
    ///
    /// No-op while a run is active. After a finished, failed or reset run a
    /// fresh run begins with zeroed progress and empty results.
    pub fn start(&self) -> Result<()> {
        let mut worker = lock(&self.worker);
        let mut phase = lock(&self.shared.phase);
        if phase.is_active() {
            return Ok(());
        }
        if let Some(handle) = worker.take() {
            // Previous run already left its loop
            if handle.join().is_err() {
                log::warn!("Previous optimization worker had panicked");
            }
        }

        let mut config = lock(&self.config).clone();
        {
            let mut stopping = lock(&self.shared.stopping);
            stopping.reset_progress();
            config.stopping = stopping.clone();
        }
        self.shared.clear_published();
        *lock(&self.shared.last_error) = None;

        let control = Arc::new(RunControl::new());
        *lock(&self.control) = Arc::clone(&control);

        let facility = Arc::clone(&self.facility);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("evo-schedule-worker".into())
            .spawn(move || run_worker(facility, config, shared, control))
            .map_err(|e| Error::WorkerSpawn(e.to_string()))?;

        *worker = Some(handle);
        *phase = RunPhase::Running;
        log::info!(
            "Started optimization of '{}' ({} lines, {} products, {} hours)",
            self.facility.title,
            self.facility.num_lines(),
            self.facility.num_products(),
            self.facility.num_hours()
        );
        Ok(())
    }

    /// Requests a pause at the next generation boundary.
    ///
    /// No-op unless running.
    pub fn pause(&self) {
        let mut phase = lock(&self.shared.phase);
        if *phase == RunPhase::Running && self.current_control().pause() {
            *phase = RunPhase::Paused;
            log::info!("Optimization paused");
        }
    }

    /// Releases a pause.
    ///
    /// No-op unless paused.
    pub fn resume(&self) {
        let mut phase = lock(&self.shared.phase);
        if *phase == RunPhase::Paused && self.current_control().resume() {
            *phase = RunPhase::Running;
            log::info!("Optimization resumed");
        }
    }

    /// Terminates the run and joins the worker.
    ///
    /// With `reset_state` the published results and stopping progress are
    /// cleared and the engine returns to `Idle`; otherwise the results of
    /// the terminated run stay readable.
    pub fn stop(&self, reset_state: bool) -> Result<()> {
        {
            let mut phase = lock(&self.shared.phase);
            if phase.is_active() {
                *phase = RunPhase::Terminating;
            }
            self.current_control().terminate();
        }
        let joined = self.join_worker();

        if reset_state {
            self.shared.clear_published();
            lock(&self.shared.stopping).reset_progress();
            *lock(&self.shared.last_error) = None;
            *lock(&self.shared.phase) = RunPhase::Idle;
            *lock(&self.control) = Arc::new(RunControl::new());
            log::info!("Optimization state reset");
        }
        joined
    }

    /// Blocks until the current run ends.
    ///
    /// # Errors
    /// The error that aborted the run, or `WorkerPanicked`.
    pub fn wait(&self) -> Result<()> {
        self.join_worker()?;
        match lock(&self.shared.last_error).clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn join_worker(&self) -> Result<()> {
        let handle = lock(&self.worker).take();
        let Some(handle) = handle else {
            return Ok(());
        };
        if handle.join().is_ok() {
            return Ok(());
        }
        log::error!("Optimization worker panicked");
        *lock(&self.shared.last_error) = Some(Error::WorkerPanicked);
        *lock(&self.shared.phase) = RunPhase::Failed;
        Err(Error::WorkerPanicked)
    }

    fn current_control(&self) -> Arc<RunControl> {
        Arc::clone(&lock(&self.control))
    }

    // ======================== Published state ========================

    /// Current lifecycle phase.
    pub fn phase(&self) -> RunPhase {
        *lock(&self.shared.phase)
    }

    /// The best schedule found so far, with its fitness cached.
    pub fn best_solution(&self) -> Option<Schedule> {
        self.shared
            .read_published(|p| p.hall_of_fame.first().cloned())
    }

    /// Hall-of-fame members, best first.
    pub fn hall_of_fame(&self) -> Vec<Schedule> {
        self.shared.read_published(|p| p.hall_of_fame.clone())
    }

    /// Statistics of every completed generation.
    pub fn statistics_history(&self) -> Vec<LogbookEntry> {
        self.shared
            .read_published(|p| p.logbook.entries().to_vec())
    }

    /// Progress percentages of the stopping conditions.
    pub fn progress(&self) -> StoppingProgress {
        lock(&self.shared.stopping).progress()
    }

    /// Error that aborted the last run.
    pub fn last_error(&self) -> Option<Error> {
        lock(&self.shared.last_error).clone()
    }

    /// Serializable configuration, including live stopping progress.
    pub fn configuration_snapshot(&self) -> ConfigurationSnapshot {
        let mut config = lock(&self.config).clone();
        config.stopping = lock(&self.shared.stopping).clone();
        config.snapshot()
    }

    // ======================== Configuration ========================

    /// Changes the population size of the next run.
    pub fn set_population_size(&self, size: usize) -> Result<()> {
        self.update_config(|c| c.population_size = size)
    }

    /// Changes the hall-of-fame size of the next run.
    pub fn set_hall_of_fame_size(&self, size: usize) -> Result<()> {
        self.update_config(|c| c.hall_of_fame_size = size)
    }

    /// Changes the selection method of the next run.
    pub fn set_selection_method(&self, spec: &MethodSpec) -> Result<()> {
        let method = SelectionMethod::try_from(spec)?;
        self.update_config(|c| c.operators.selection = method)
    }

    /// Changes the crossover method of the next run.
    pub fn set_crossover_method(&self, spec: &MethodSpec) -> Result<()> {
        let method = CrossoverMethod::try_from(spec)?;
        self.update_config(|c| c.operators.crossover = method)
    }

    /// Changes the mutation method of the next run.
    pub fn set_mutation_method(&self, spec: &MethodSpec) -> Result<()> {
        let method = MutationMethod::try_from(spec)?;
        self.update_config(|c| c.operators.mutation = method)
    }

    /// Edits a stopping condition. Takes effect at the next generation
    /// boundary, also during a run.
    pub fn set_stopping_condition(
        &self,
        kind: StoppingConditionKind,
        bound: f64,
        applied: bool,
    ) -> Result<()> {
        lock(&self.shared.stopping).set(kind, bound, applied)
    }

    /// Edits a stopping condition by name (`time`, `fitness`, `generations`).
    ///
    /// # Errors
    /// `UnknownStoppingCondition` for any other name.
    pub fn set_stopping_condition_by_name(
        &self,
        name: &str,
        bound: f64,
        applied: bool,
    ) -> Result<()> {
        self.set_stopping_condition(name.parse()?, bound, applied)
    }

    /// Disables a stopping condition.
    pub fn delete_stopping_condition(&self, kind: StoppingConditionKind) {
        lock(&self.shared.stopping).delete(kind);
    }

    /// Applies an edit to a copy and commits it only when it validates.
    fn update_config(&self, edit: impl FnOnce(&mut EngineConfig)) -> Result<()> {
        let mut config = lock(&self.config);
        let mut candidate = config.clone();
        edit(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.current_control().terminate();
        let _ = self.join_worker();
    }
}

fn run_worker(
    facility: Arc<FacilityModel>,
    config: EngineConfig,
    shared: Arc<Shared>,
    control: Arc<RunControl>,
) {
    let result = evolve(facility, &config, &shared, &control);
    let mut phase = lock(&shared.phase);
    match result {
        Ok(()) => *phase = RunPhase::Finished,
        Err(e) => {
            log::error!("Optimization failed: {e}");
            *lock(&shared.last_error) = Some(e);
            *phase = RunPhase::Failed;
        }
    }
}

fn evolve(
    facility: Arc<FacilityModel>,
    config: &EngineConfig,
    shared: &Shared,
    control: &RunControl,
) -> Result<()> {
    let clock = RunClock::start();
    let mut evolution = Evolution::new(facility, config)?;
    let entry = evolution.initialize()?;
    shared.publish(&evolution, entry);

    loop {
        if control.checkpoint() == Checkpoint::Terminate {
            log::info!(
                "Optimization terminated after generation {}",
                evolution.generation()
            );
            break;
        }
        let metrics = evolution.metrics(clock.active_elapsed(control));
        if lock(&shared.stopping).evaluate(&metrics) {
            break;
        }
        let entry = evolution.step()?;
        shared.publish(&evolution, entry);
    }

    log::info!(
        "Optimization finished: {} generations, best fitness {:?}",
        evolution.generation(),
        evolution.hall_of_fame().best_fitness()
    );
    Ok(())
}
