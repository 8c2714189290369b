//! Pause/resume/terminate token shared by controller and worker.
//!
//! The controller only flips flags and notifies; the worker polls the token
//! at generation boundaries through [`RunControl::checkpoint`], blocking on
//! the condition variable while paused. Paused time is accumulated only
//! while the worker is actually blocked, from the moment it starts waiting
//! to the resume (or terminate) request, so that [`RunClock`] can report
//! active elapsed time. A generation still running when `pause()` is
//! requested counts as active.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Lifecycle phase of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// No run started, or state was reset.
    Idle,
    /// Worker is evolving generations.
    Running,
    /// Pause requested; the worker blocks at the next generation boundary.
    Paused,
    /// Termination requested; the worker exits at the next boundary.
    Terminating,
    /// The run ended and its results are available.
    Finished,
    /// The worker aborted with an error.
    Failed,
}

impl RunPhase {
    /// Whether a worker is attached to the run.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused | Self::Terminating)
    }
}

/// Decision returned to the worker at a generation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Run the next generation.
    Continue,
    /// Exit the loop.
    Terminate,
}

#[derive(Debug, Default)]
struct ControlState {
    paused: bool,
    terminate: bool,
    paused_since: Option<Instant>,
    paused_total: Duration,
}

impl ControlState {
    fn settle_pause(&mut self) {
        if let Some(since) = self.paused_since.take() {
            self.paused_total += since.elapsed();
        }
        self.paused = false;
    }
}

/// Cooperative cancellation-and-pause token.
#[derive(Debug, Default)]
pub struct RunControl {
    state: Mutex<ControlState>,
    wake: Condvar,
}

impl RunControl {
    /// Creates a token in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests a pause. Returns `false` when already paused or terminating.
    ///
    /// The paused-time clock starts when the worker reaches
    /// [`checkpoint`](Self::checkpoint), not here.
    pub fn pause(&self) -> bool {
        let mut state = self.lock();
        if state.paused || state.terminate {
            return false;
        }
        state.paused = true;
        true
    }

    /// Releases a pause. Returns `false` when not paused.
    pub fn resume(&self) -> bool {
        let mut state = self.lock();
        if !state.paused {
            return false;
        }
        state.settle_pause();
        self.wake.notify_all();
        true
    }

    /// Requests termination and wakes a paused worker.
    pub fn terminate(&self) {
        let mut state = self.lock();
        state.terminate = true;
        state.settle_pause();
        self.wake.notify_all();
    }

    /// Whether a pause is pending.
    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// Whether termination was requested.
    pub fn is_terminated(&self) -> bool {
        self.lock().terminate
    }

    /// Generation-boundary check. Blocks while paused.
    pub fn checkpoint(&self) -> Checkpoint {
        let mut state = self.lock();
        while state.paused && !state.terminate {
            if state.paused_since.is_none() {
                state.paused_since = Some(Instant::now());
            }
            state = self
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.terminate {
            Checkpoint::Terminate
        } else {
            Checkpoint::Continue
        }
    }

    /// Total time the worker spent blocked, including an ongoing wait.
    pub fn paused_duration(&self) -> Duration {
        let state = self.lock();
        state.paused_total + state.paused_since.map_or(Duration::ZERO, |s| s.elapsed())
    }
}

/// Wall clock of a run that excludes paused time.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    started: Instant,
}

impl RunClock {
    /// Starts the clock now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Elapsed time minus the time `control` spent paused.
    pub fn active_elapsed(&self, control: &RunControl) -> Duration {
        self.started
            .elapsed()
            .saturating_sub(control.paused_duration())
    }
}
