//! Resource ledger and the tick loop: production accrual, clicks, and the
//! derived per-second rate.

use crate::config::{BoostKind, EventKind, ItemEffect};
use crate::time::Millis;

use super::catalog;
use super::prestige;
use super::state::{EngineState, ResourceState};

/// Result of a single [`tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub elapsed_secs: f64,
    pub produced: f64,
    pub per_second: f64,
}

/// Accrue `per_second * delta_secs`. Negative or non-finite deltas are a
/// no-op. Returns the amount produced.
pub fn apply_elapsed(resources: &mut ResourceState, delta_secs: f64) -> f64 {
    let rate = resources.per_second;
    accrue(resources, rate, delta_secs)
}

/// Accrue `rate * delta_secs` regardless of the live `per_second`.
pub fn accrue(resources: &mut ResourceState, rate: f64, delta_secs: f64) -> f64 {
    if !delta_secs.is_finite() || delta_secs <= 0.0 {
        return 0.0;
    }
    let produced = rate * delta_secs;
    resources.current += produced;
    resources.lifetime += produced;
    produced
}

/// Credit a click. Returns the amount credited.
pub fn apply_click(resources: &mut ResourceState, click_power: f64) -> f64 {
    if !click_power.is_finite() || click_power <= 0.0 {
        return 0.0;
    }
    resources.current += click_power;
    resources.lifetime += click_power;
    click_power
}

/// Production rate from owned entries, prestige and boosts, leaving out
/// events. Offline time is credited at this rate.
pub fn base_production_rate(state: &EngineState) -> f64 {
    let mut base = 0.0;
    let mut factor = 1.0;
    for (def, item) in state.config.catalog.iter().zip(&state.items) {
        if item.owned == 0 {
            continue;
        }
        match def.effect {
            ItemEffect::Generator { base_production } => {
                base += base_production * item.owned as f64;
            }
            ItemEffect::Multiplier { factor: f } => {
                factor *= f.powf(item.owned as f64);
            }
        }
    }
    base * factor
        * state.global_multiplier()
        * prestige::energy_multiplier(state)
        * state.boost_multiplier(BoostKind::Production)
}

/// Live production rate: the base rate under the running events. Pure.
pub fn production_rate(state: &EngineState) -> f64 {
    base_production_rate(state)
        * state.events.multiplier_for(EventKind::Production)
        * state.events.multiplier_for(EventKind::Bonus)
}

/// Refresh `resources.per_second`. Call after any change to owned counts,
/// boosts, prestige or events.
pub fn recompute_per_second(state: &mut EngineState) -> f64 {
    let rate = production_rate(state);
    state.resources.per_second = rate;
    if rate > state.stats.best_per_second {
        state.stats.best_per_second = rate;
    }
    rate
}

/// Energy credited by one non-critical click right now.
pub fn compute_click_power(state: &EngineState) -> f64 {
    state.config.click.base_power
        * state.global_multiplier()
        * (1.0 + prestige::click_bonus(state))
        * state.boost_multiplier(BoostKind::Click)
        * state.events.multiplier_for(EventKind::Click)
        * state.events.multiplier_for(EventKind::Bonus)
}

/// Manual click: credit click power and count it. A critical click, rolled
/// against the prestige crit chance, multiplies the power.
pub fn click(state: &mut EngineState) -> f64 {
    let mut power = compute_click_power(state);
    if state.events.roll(prestige::crit_chance(state)) {
        power *= state.config.prestige.crit_multiplier;
        state.stats.critical_clicks += 1;
    }
    let credited = apply_click(&mut state.resources, power);
    state.stats.total_clicks += 1;
    catalog::check_unlocks(state);
    credited
}

/// Advance the game to `now`.
///
/// Production accrues at the rate in effect since the previous tick; events
/// are then expired or started and the rate refreshed. A timestamp earlier
/// than the previous tick resyncs the clock without producing anything.
pub fn tick(state: &mut EngineState, now: Millis) -> TickReport {
    let delta_ms = now.saturating_sub(state.last_tick_at);
    state.last_tick_at = now;
    let elapsed_secs = delta_ms as f64 / 1000.0;

    let produced = apply_elapsed(&mut state.resources, elapsed_secs);
    state.stats.play_time_secs += elapsed_secs;

    let transitions = state.events.advance(now, &state.config.events);
    state.notifications.extend(transitions);

    recompute_per_second(state);
    catalog::check_unlocks(state);

    TickReport {
        elapsed_secs,
        produced,
        per_second: state.resources.per_second,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, EventDef, ItemDef};
    use crate::progression::state::ActiveEvent;

    /// Two generators (0.1/s and 0.5/s), no multipliers, no events.
    fn scenario_config() -> EngineConfig {
        let mut config = EngineConfig {
            catalog: vec![
                ItemDef::generator(1, "A", 10.0, 0.1, 0.0),
                ItemDef::generator(2, "B", 50.0, 0.5, 0.0),
            ],
            ..EngineConfig::default()
        };
        config.events.catalog.clear();
        config
    }

    #[test]
    fn per_second_sums_generators() {
        let mut state = EngineState::new(scenario_config(), 0);
        state.items[0].owned = 3;
        state.items[1].owned = 1;
        let rate = recompute_per_second(&mut state);
        assert!((rate - 0.8).abs() < 1e-9);
    }

    #[test]
    fn production_event_doubles_rate_until_it_ends() {
        let mut config = scenario_config();
        config.events = crate::config::EventConfig {
            catalog: vec![EventDef {
                kind: EventKind::Production,
                multiplier: 2.0,
                duration_secs: 60,
            }],
            interval_secs: 3_600,
            max_concurrent: 1,
            seed: 1,
        };
        let mut state = EngineState::new(config, 0);
        state.items[0].owned = 3;
        state.items[1].owned = 1;
        state.events.active.push(ActiveEvent {
            kind: EventKind::Production,
            multiplier: 2.0,
            started_at: 0,
            ends_at: 60_000,
        });
        assert!((recompute_per_second(&mut state) - 1.6).abs() < 1e-9);

        tick(&mut state, 30_000);
        assert!((state.resources.per_second - 1.6).abs() < 1e-9);

        tick(&mut state, 60_000);
        assert!((state.resources.per_second - 0.8).abs() < 1e-9);
    }

    #[test]
    fn multipliers_compound_per_unit() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.items[0].owned = 10; // 1.0/s
        state.items[6].owned = 2; // Efficiency I, 1.1^2
        let rate = recompute_per_second(&mut state);
        assert!((rate - 1.21).abs() < 1e-9);
    }

    #[test]
    fn prestige_and_boost_scale_rate() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.items[0].owned = 10;
        state.prestige.level = 2; // x2.0
        state.boosts[1] = true; // x5
        assert!((recompute_per_second(&mut state) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn apply_elapsed_credits_both_totals() {
        let mut r = ResourceState {
            current: 5.0,
            lifetime: 20.0,
            per_second: 2.0,
        };
        let produced = apply_elapsed(&mut r, 1.5);
        assert!((produced - 3.0).abs() < 1e-9);
        assert!((r.current - 8.0).abs() < 1e-9);
        assert!((r.lifetime - 23.0).abs() < 1e-9);
    }

    #[test]
    fn apply_elapsed_ignores_negative_delta() {
        let mut r = ResourceState {
            current: 5.0,
            lifetime: 5.0,
            per_second: 2.0,
        };
        assert_eq!(apply_elapsed(&mut r, -3.0), 0.0);
        assert_eq!(apply_elapsed(&mut r, f64::NAN), 0.0);
        assert!((r.current - 5.0).abs() < 1e-9);
    }

    #[test]
    fn click_uses_base_power() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        assert!((click(&mut state) - 1.0).abs() < 1e-9);
        assert!((state.resources.current - 1.0).abs() < 1e-9);
        assert_eq!(state.stats.total_clicks, 1);
    }

    #[test]
    fn click_power_stacks_prestige_boost_and_events() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.prestige.level = 1; // x1.5
        state.boosts[0] = true; // x2
        state.events.active.push(ActiveEvent {
            kind: EventKind::Click,
            multiplier: 3.0,
            started_at: 0,
            ends_at: 1_000,
        });
        assert!((compute_click_power(&state) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn bonus_event_scales_clicks_and_production() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.items[0].owned = 10;
        state.events.active.push(ActiveEvent {
            kind: EventKind::Bonus,
            multiplier: 2.0,
            started_at: 0,
            ends_at: 1_000,
        });
        assert!((compute_click_power(&state) - 2.0).abs() < 1e-9);
        assert!((recompute_per_second(&mut state) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn prestige_points_multiply_production() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.items[0].owned = 10; // 1.0/s
        state.prestige.points = 50.0; // x1.5
        assert!((recompute_per_second(&mut state) - 1.5).abs() < 1e-9);
        assert!((base_production_rate(&state) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn prestige_points_raise_click_power_up_to_cap() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.prestige.points = 100.0; // +20%
        assert!((compute_click_power(&state) - 1.2).abs() < 1e-9);
        state.prestige.points = 1_000.0; // capped at +50%
        assert!((compute_click_power(&state) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn critical_clicks_follow_chance() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.config.prestige.click_bonus_per_point = 0.0;
        state.config.prestige.crit_chance_cap = 1.0;
        state.prestige.points = 1_000.0; // every click critical
        assert!((click(&mut state) - 2.0).abs() < 1e-9);
        assert_eq!(state.stats.critical_clicks, 1);

        state.prestige.points = 0.0;
        for _ in 0..100 {
            click(&mut state);
        }
        assert_eq!(state.stats.critical_clicks, 1);
        assert_eq!(state.stats.total_clicks, 101);
    }

    #[test]
    fn capped_crit_chance_lands_near_a_fifth() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.prestige.points = 1e6; // chance capped at 0.2
        for _ in 0..10_000 {
            click(&mut state);
        }
        let crits = state.stats.critical_clicks;
        assert!((1_700..=2_300).contains(&crits), "crits = {}", crits);
    }

    #[test]
    fn base_rate_ignores_events() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.items[0].owned = 10;
        state.events.active.push(ActiveEvent {
            kind: EventKind::Production,
            multiplier: 2.0,
            started_at: 0,
            ends_at: 60_000,
        });
        assert!((production_rate(&state) - 2.0).abs() < 1e-9);
        assert!((base_production_rate(&state) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tick_accrues_at_previous_rate() {
        let mut state = EngineState::new(scenario_config(), 0);
        state.items[1].owned = 2; // 1.0/s
        recompute_per_second(&mut state);
        let report = tick(&mut state, 10_000);
        assert!((report.elapsed_secs - 10.0).abs() < 1e-9);
        assert!((report.produced - 10.0).abs() < 1e-9);
        assert!((state.resources.lifetime - 10.0).abs() < 1e-9);
        assert!((state.stats.play_time_secs - 10.0).abs() < 1e-9);
    }

    #[test]
    fn tick_with_backwards_clock_produces_nothing() {
        let mut state = EngineState::new(scenario_config(), 10_000);
        state.items[1].owned = 2;
        recompute_per_second(&mut state);
        let report = tick(&mut state, 4_000);
        assert_eq!(report.produced, 0.0);
        assert_eq!(state.last_tick_at, 4_000);
        let report = tick(&mut state, 5_000);
        assert!((report.produced - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tick_unlocks_when_threshold_crossed() {
        let mut state = EngineState::new(EngineConfig::default(), 0);
        state.items[0].owned = 50; // 5.0/s
        recompute_per_second(&mut state);
        tick(&mut state, 10_000); // +50 lifetime, Wind Turbine threshold
        assert!(state.items[1].unlocked);
    }
}
