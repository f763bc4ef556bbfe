//! Spawn cadence, paused while the window is hidden

use std::time::Duration;

/// Fires once per `period` of accumulated time
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingTimer {
    period: Duration,
    elapsed: Duration,
}

impl RepeatingTimer {
    /// A zero period is bumped to one millisecond so the timer always terminates
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time accumulated toward the next firing
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advance and return how many whole periods completed
    pub fn tick(&mut self, dt: Duration) -> u32 {
        self.elapsed = self.elapsed.saturating_add(dt);
        let periods = self.elapsed.as_nanos() / self.period.as_nanos();
        let fired = u32::try_from(periods).unwrap_or(u32::MAX);
        // fired * period <= elapsed, so neither step can overflow
        self.elapsed -= self.period * fired;
        fired
    }
}

/// Whether the spawn timer is live
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnerState {
    Running(RepeatingTimer),
    Paused,
}

/// Two-state spawn scheduler with idempotent start and stop
#[derive(Debug, Clone)]
pub struct Spawner {
    period: Duration,
    state: SpawnerState,
}

impl Spawner {
    /// Starts in `Running`
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: SpawnerState::Running(RepeatingTimer::new(period)),
        }
    }

    pub fn state(&self) -> &SpawnerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SpawnerState::Running(_))
    }

    /// Resume with a fresh timer; no-op while running
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.state = SpawnerState::Running(RepeatingTimer::new(self.period));
        log::debug!("Spawner started ({:?} period)", self.period);
    }

    /// Pause, discarding partial progress; no-op while paused
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.state = SpawnerState::Paused;
        log::debug!("Spawner paused");
    }

    /// Number of spawns due after `dt`; always zero while paused
    pub fn tick(&mut self, dt: Duration) -> u32 {
        match &mut self.state {
            SpawnerState::Running(timer) => timer.tick(dt),
            SpawnerState::Paused => 0,
        }
    }
}
