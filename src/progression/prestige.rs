//! Prestige controller: eligibility, progress and the reset itself.

use log::info;

use crate::config::PrestigeConfig;
use crate::error::{EngineError, EngineResult};
use crate::notify::Notification;
use crate::time::Millis;

use super::catalog;
use super::ledger;
use super::state::{EngineState, ResourceState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrestigePhase {
    /// Lifetime requirement or cooldown still unmet.
    Accumulating,
    Eligible,
}

/// How far the player is from the next prestige.
#[derive(Clone, Debug, PartialEq)]
pub struct PrestigeProgress {
    /// `lifetime / requirement`, capped at 1.
    pub resource_ratio: f64,
    /// Fraction of the cooldown already elapsed, capped at 1.
    pub cooldown_ratio: f64,
    /// The smaller of the two ratios.
    pub overall: f64,
    pub missing_resource: f64,
    pub cooldown_remaining_ms: Millis,
}

/// Everything the accumulated prestige points currently buy.
#[derive(Clone, Debug, PartialEq)]
pub struct PrestigeBonuses {
    pub energy_multiplier: f64,
    pub click_bonus: f64,
    pub crit_chance: f64,
    pub offline_bonus: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrestigeOutcome {
    pub points_earned: f64,
    pub new_level: u32,
    pub global_multiplier: f64,
    pub next_available_at: Millis,
}

/// Lifetime energy required to prestige from `level`.
pub fn requirement(config: &PrestigeConfig, level: u32) -> f64 {
    config.base_requirement * config.requirement_growth.powf(level as f64)
}

fn missing_resource(state: &EngineState) -> f64 {
    let req = requirement(&state.config.prestige, state.prestige.level);
    (req - state.resources.lifetime).max(0.0)
}

pub fn can_prestige(state: &EngineState, now: Millis) -> bool {
    missing_resource(state) <= 0.0 && now >= state.prestige.next_available_at
}

pub fn phase(state: &EngineState, now: Millis) -> PrestigePhase {
    if can_prestige(state, now) {
        PrestigePhase::Eligible
    } else {
        PrestigePhase::Accumulating
    }
}

pub fn progress(state: &EngineState, now: Millis) -> PrestigeProgress {
    let req = requirement(&state.config.prestige, state.prestige.level);
    let resource_ratio = (state.resources.lifetime / req).clamp(0.0, 1.0);

    let p = &state.prestige;
    let window = p.next_available_at.saturating_sub(p.last_prestige_at);
    let cooldown_remaining_ms = p.next_available_at.saturating_sub(now);
    let cooldown_ratio = if window == 0 {
        1.0
    } else {
        (1.0 - cooldown_remaining_ms as f64 / window as f64).clamp(0.0, 1.0)
    };

    PrestigeProgress {
        resource_ratio,
        cooldown_ratio,
        overall: resource_ratio.min(cooldown_ratio),
        missing_resource: missing_resource(state),
        cooldown_remaining_ms,
    }
}

/// Reset the run in exchange for prestige points and a permanent multiplier.
///
/// Clears energy, owned counts and boosts, keeps stats and running events.
/// With `reset_unlocks_on_prestige` every entry with a non-zero threshold is
/// locked again; otherwise unlocks carry over.
pub fn execute(state: &mut EngineState, now: Millis) -> EngineResult<PrestigeOutcome> {
    if !can_prestige(state, now) {
        return Err(EngineError::Ineligible {
            missing_resource: missing_resource(state),
            cooldown_remaining_ms: state.prestige.next_available_at.saturating_sub(now),
        });
    }

    let req = requirement(&state.config.prestige, state.prestige.level);
    let points_earned = (state.resources.lifetime / req).floor().max(1.0);

    state.prestige.level += 1;
    state.prestige.points += points_earned;
    state.prestige.last_prestige_at = now;
    state.prestige.next_available_at = now.saturating_add(state.config.cooldown_ms());

    state.resources = ResourceState::default();
    if state.config.prestige.reset_unlocks_on_prestige {
        state.items = EngineState::fresh_items(&state.config);
    } else {
        for item in &mut state.items {
            item.owned = 0;
        }
    }
    state.boosts.iter_mut().for_each(|b| *b = false);

    ledger::recompute_per_second(state);
    catalog::check_unlocks(state);

    let new_level = state.prestige.level;
    info!(
        "prestige {} performed: +{} points ({} total), x{} global",
        new_level,
        points_earned,
        state.prestige.points,
        state.global_multiplier()
    );
    state.notifications.push(Notification::PrestigePerformed {
        level: new_level,
        points_earned,
    });

    Ok(PrestigeOutcome {
        points_earned,
        new_level,
        global_multiplier: state.global_multiplier(),
        next_available_at: state.prestige.next_available_at,
    })
}

// ── Point bonuses ────────────────────────────────────────────

/// Production multiplier bought with prestige points.
pub fn energy_multiplier(state: &EngineState) -> f64 {
    1.0 + state.prestige.points * state.config.prestige.energy_per_point
}

/// Fractional click power bonus bought with prestige points.
pub fn click_bonus(state: &EngineState) -> f64 {
    let p = &state.config.prestige;
    (state.prestige.points * p.click_bonus_per_point).min(p.click_bonus_cap)
}

/// Chance that a click is critical.
pub fn crit_chance(state: &EngineState) -> f64 {
    let p = &state.config.prestige;
    (state.prestige.points * p.crit_chance_per_point).min(p.crit_chance_cap)
}

/// Offline efficiency bonus bought with prestige points.
pub fn offline_bonus(state: &EngineState) -> f64 {
    let o = &state.config.offline;
    (state.prestige.points * o.bonus_per_point).min(o.bonus_cap)
}

pub fn bonuses(state: &EngineState) -> PrestigeBonuses {
    PrestigeBonuses {
        energy_multiplier: energy_multiplier(state),
        click_bonus: click_bonus(state),
        crit_chance: crit_chance(state),
        offline_bonus: offline_bonus(state),
    }
}
