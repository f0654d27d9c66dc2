//! Offline accounting: credit production for time spent away.

use log::info;

use crate::config::OfflineCooldownPolicy;
use crate::time::Millis;

use super::catalog;
use super::ledger;
use super::prestige;
use super::state::EngineState;

/// What a [`resume`] credited.
#[derive(Clone, Debug, PartialEq)]
pub struct OfflineReport {
    /// Seconds between the last tick and `now`.
    pub gap_secs: f64,
    /// Seconds actually credited after the `max_offline_secs` cap.
    pub credited_secs: f64,
    /// Event-free production rate the gap was credited at.
    pub rate: f64,
    pub efficiency: f64,
    pub produced: f64,
}

/// Base offline efficiency plus the prestige point bonus, at most 1.
pub fn offline_efficiency(state: &EngineState) -> f64 {
    (state.config.offline.efficiency + prestige::offline_bonus(state)).min(1.0)
}

/// Credit the gap since the last tick at reduced efficiency.
///
/// The gap earns the base rate only: running events never boost time spent
/// away, whichever cooldown policy is set. Under [`OfflineCooldownPolicy::Shift`] the prestige cooldown, running
/// events and the next event draw are pushed forward by the gap, so time
/// away does not count toward them.
pub fn resume(state: &mut EngineState, now: Millis) -> OfflineReport {
    let gap_ms = now.saturating_sub(state.last_tick_at);
    let gap_secs = gap_ms as f64 / 1000.0;
    let credited_secs = match state.config.offline.max_offline_secs {
        Some(cap) => gap_secs.min(cap as f64),
        None => gap_secs,
    };
    let rate = ledger::base_production_rate(state);
    let efficiency = offline_efficiency(state);
    let produced = ledger::accrue(&mut state.resources, rate, credited_secs * efficiency);
    state.stats.offline_secs += gap_secs;

    if state.config.offline.cooldown_policy == OfflineCooldownPolicy::Shift {
        let p = &mut state.prestige;
        p.next_available_at = p.next_available_at.saturating_add(gap_ms);
        state.events.shift(gap_ms);
    }
    state.last_tick_at = now;

    let transitions = state.events.advance(now, &state.config.events);
    state.notifications.extend(transitions);
    ledger::recompute_per_second(state);
    catalog::check_unlocks(state);

    info!(
        "resumed after {:.0}s away: {} energy at {:.0}% efficiency",
        gap_secs,
        produced,
        efficiency * 100.0
    );

    OfflineReport {
        gap_secs,
        credited_secs,
        rate,
        efficiency,
        produced,
    }
}
