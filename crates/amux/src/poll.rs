//! Backpressure-driven refresh cadences.
//!
//! Each cadence (pane classification, preview capture) is a small state
//! machine. A timer tick only starts work from `Idle`; finishing work
//! returns to `Idle` and arms the next timer. Since a timer can be pending
//! when out-of-band work starts, every arm carries a generation and fires
//! from older generations are dropped. Out-of-band requests made while
//! work is in flight are remembered and run as soon as it completes, in
//! place of the next timer.

use std::time::Duration;

/// Whether a cadence has work in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CadenceState {
    #[default]
    Idle,
    AwaitingResult,
}

/// A timer to arm: fire a tick for `generation` after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub generation: u64,
    pub delay: Duration,
}

/// What to do once work completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Arm(Timer),
    /// A rerun was requested; start again immediately
    RunNow,
}

/// One refresh cadence.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Duration,
    state: CadenceState,
    generation: u64,
    rerun: bool,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: CadenceState::Idle,
            generation: 0,
            rerun: false,
        }
    }

    pub fn state(&self) -> CadenceState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Timer for the current generation, without changing state.
    pub fn arm(&self) -> Timer {
        Timer {
            generation: self.generation,
            delay: self.interval,
        }
    }

    /// A timer armed for `generation` fired. Returns true if work starts.
    pub fn on_tick(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.state != CadenceState::Idle {
            return false;
        }
        self.state = CadenceState::AwaitingResult;
        true
    }

    /// Out-of-band request. Returns true if work starts now.
    ///
    /// Starting invalidates any pending timer. While work is in flight the
    /// request is folded into a single rerun.
    pub fn request(&mut self) -> bool {
        match self.state {
            CadenceState::Idle => {
                self.generation = self.generation.wrapping_add(1);
                self.state = CadenceState::AwaitingResult;
                true
            }
            CadenceState::AwaitingResult => {
                self.rerun = true;
                false
            }
        }
    }

    /// Work finished (successfully or not).
    ///
    /// Returns `RunNow` with the cadence still awaiting when a rerun was
    /// pending, else arms a fresh generation.
    pub fn complete(&mut self) -> Schedule {
        self.generation = self.generation.wrapping_add(1);
        if std::mem::take(&mut self.rerun) {
            self.state = CadenceState::AwaitingResult;
            return Schedule::RunNow;
        }
        self.state = CadenceState::Idle;
        Schedule::Arm(self.arm())
    }

    /// Work finished with nothing to rerun for; any pending rerun is dropped.
    pub fn abandon(&mut self) -> Timer {
        self.rerun = false;
        self.generation = self.generation.wrapping_add(1);
        self.state = CadenceState::Idle;
        self.arm()
    }
}
