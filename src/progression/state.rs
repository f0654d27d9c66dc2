/// Progression engine state definitions.

use serde::{Deserialize, Serialize};

use crate::config::{BoostKind, EngineConfig, EventKind, ItemDef};
use crate::notify::Notifications;
use crate::time::Millis;

use super::events::EventModulator;

/// Spendable and lifetime energy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Spendable balance.
    pub current: f64,
    /// Energy earned since the last prestige. Drives unlocks and prestige.
    pub lifetime: f64,
    /// Derived production rate, refreshed by `ledger::recompute_per_second`.
    pub per_second: f64,
}

/// Mutable state of one catalog entry, parallel to `EngineConfig::catalog`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    pub owned: u32,
    pub unlocked: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrestigeState {
    /// Number of prestiges performed. Increments by exactly one each time.
    pub level: u32,
    /// Cumulative prestige points, never decreases.
    pub points: f64,
    pub last_prestige_at: Millis,
    pub next_available_at: Millis,
}

impl PrestigeState {
    /// Permanent production and click multiplier from prestige levels.
    pub fn global_multiplier(&self, bonus_per_level: f64) -> f64 {
        1.0 + self.level as f64 * bonus_per_level
    }
}

/// A running timed event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub kind: EventKind,
    pub multiplier: f64,
    pub started_at: Millis,
    pub ends_at: Millis,
}

impl ActiveEvent {
    pub fn remaining_ms(&self, now: Millis) -> Millis {
        self.ends_at.saturating_sub(now)
    }
}

/// Per-session statistics, kept across prestiges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub total_clicks: u64,
    pub critical_clicks: u64,
    /// Seconds of live (ticked) play.
    pub play_time_secs: f64,
    /// Seconds spent away, credited through offline accounting.
    pub offline_secs: f64,
    pub best_per_second: f64,
}

/// Full state of one player's progression.
pub struct EngineState {
    pub config: EngineConfig,
    pub resources: ResourceState,
    /// One entry per `config.catalog` definition, same order.
    pub items: Vec<ItemState>,
    /// Whether each `config.boosts` entry is active, same order.
    pub boosts: Vec<bool>,
    pub prestige: PrestigeState,
    pub events: EventModulator,
    pub stats: SessionStats,
    /// Timestamp of the last tick or resume.
    pub last_tick_at: Millis,
    pub notifications: Notifications,
}

impl EngineState {
    /// Fresh state for a new game started at `now`. `config` must be valid.
    pub fn new(config: EngineConfig, now: Millis) -> Self {
        let items = Self::fresh_items(&config);
        let boosts = vec![false; config.boosts.len()];
        let prestige = PrestigeState {
            level: 0,
            points: 0.0,
            last_prestige_at: now,
            next_available_at: now.saturating_add(config.cooldown_ms()),
        };
        let events = EventModulator::new(now, &config.events);
        let notifications = Notifications::new(config.notifications_capacity);

        Self {
            resources: ResourceState::default(),
            items,
            boosts,
            prestige,
            events,
            stats: SessionStats::default(),
            last_tick_at: now,
            notifications,
            config,
        }
    }

    /// Item states as they are at the start of a game: nothing owned, entries
    /// with a zero threshold unlocked.
    pub fn fresh_items(config: &EngineConfig) -> Vec<ItemState> {
        config
            .catalog
            .iter()
            .map(|def| ItemState {
                owned: 0,
                unlocked: def.unlock_threshold <= 0.0,
            })
            .collect()
    }

    pub fn def(&self, idx: usize) -> &ItemDef {
        &self.config.catalog[idx]
    }

    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.config.catalog.iter().position(|d| d.id == id)
    }

    pub fn global_multiplier(&self) -> f64 {
        self.prestige
            .global_multiplier(self.config.prestige.bonus_per_level)
    }

    /// Product of active boost factors of `kind`.
    pub fn boost_multiplier(&self, kind: BoostKind) -> f64 {
        self.config
            .boosts
            .iter()
            .zip(&self.boosts)
            .filter(|(def, owned)| **owned && def.kind == kind)
            .map(|(def, _)| def.factor)
            .product()
    }
}
