//! Fixed-timestep clock for drivers of the engine.
//!
//! A render loop calls `update()` with variable frame timestamps. The clock
//! converts them into whole ticks at a fixed rate and reports a long gap
//! (suspended tab, sleeping laptop) as a resume, so the driver can route it
//! through offline accounting instead of a regular tick.

use crate::config::EngineConfig;

/// Wall-clock milliseconds as supplied by the caller.
pub type Millis = u64;

/// Ticks per second the engine is designed to be driven at.
pub const TICKS_PER_SECOND: u32 = 10;

/// What a driver should do after feeding a timestamp to [`TickClock::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockStep {
    /// Not enough time accumulated for a tick.
    Idle,
    /// At least one tick boundary passed; call `Engine::tick(now)`.
    Ticks(u32),
    /// The gap exceeded the resume threshold; call `Engine::resume(now)`.
    Resume { gap_ms: Millis },
}

pub struct TickClock {
    /// Milliseconds per tick (e.g. 100ms = 10 ticks/sec)
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Total elapsed ticks since creation
    pub total_ticks: u64,
    /// Timestamp of the last update, None before the first frame
    last_timestamp: Option<Millis>,
    resume_threshold_ms: Millis,
}

impl TickClock {
    /// `ticks_per_sec`: game ticks per real-time second.
    /// `resume_threshold_ms`: frame gaps above this become [`ClockStep::Resume`].
    pub fn new(ticks_per_sec: u32, resume_threshold_ms: Millis) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
            resume_threshold_ms,
        }
    }

    /// Clock at [`TICKS_PER_SECOND`] using the configured resume threshold.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(TICKS_PER_SECOND, config.resume_threshold_ms())
    }

    /// Feed a wall-clock timestamp. Call once per frame.
    pub fn update(&mut self, now_ms: Millis) -> ClockStep {
        let delta = match self.last_timestamp {
            // Clock moved backwards: resync without producing time.
            Some(prev) => now_ms.saturating_sub(prev),
            None => 0,
        };
        self.last_timestamp = Some(now_ms);

        if delta > self.resume_threshold_ms {
            self.accumulator = 0.0;
            return ClockStep::Resume { gap_ms: delta };
        }

        self.accumulator += delta as f64;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        if ticks == 0 {
            ClockStep::Idle
        } else {
            ClockStep::Ticks(ticks)
        }
    }
}
