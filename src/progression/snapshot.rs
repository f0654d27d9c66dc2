//! Snapshot in/out.
//!
//! ## Versioning
//!
//! - `SNAPSHOT_VERSION`: current format. Bump it whenever a field is added.
//! - `MIN_COMPATIBLE_VERSION`: oldest format still accepted. Only bump it for
//!   breaking changes (a field removed or its meaning changed).
//!
//! Snapshots at or above `MIN_COMPATIBLE_VERSION` load with missing optional
//! sections filled from defaults. Anything else is rejected as
//! [`EngineError::InvalidSnapshot`] before the engine state is touched.
//!
//! Version 1 carried resources, items and prestige. Version 2 added boosts,
//! the event scheduler with its RNG position, session stats and the display
//! name.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::time::Millis;

use super::events::{EventModulator, RngSave};
use super::ledger;
use super::state::{ActiveEvent, EngineState, ItemState, PrestigeState, ResourceState, SessionStats};

pub const SNAPSHOT_VERSION: u32 = 2;
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// When the snapshot was taken; the offline gap on load starts here.
    pub saved_at: Millis,
    pub resources: ResourceSave,
    pub items: Vec<ItemSave>,
    pub prestige: PrestigeState,
    #[serde(default)]
    pub boosts: Vec<BoostSave>,
    #[serde(default)]
    pub events: EventsSave,
    #[serde(default)]
    pub stats: SessionStats,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `per_second` is derived, so only the two totals are stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceSave {
    pub current: f64,
    pub lifetime: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSave {
    pub id: u32,
    pub owned: u32,
    pub unlocked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostSave {
    pub id: u32,
    pub owned: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsSave {
    pub active: Vec<ActiveEvent>,
    pub next_event_at: Option<Millis>,
    pub rng: Option<RngSave>,
}

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::InvalidSnapshot(msg.into())
}

fn check_amount(field: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{field} must be finite and non-negative, got {value}")))
    }
}

impl Snapshot {
    /// Capture the full engine state at `now`.
    pub fn extract(state: &EngineState, now: Millis) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: now,
            resources: ResourceSave {
                current: state.resources.current,
                lifetime: state.resources.lifetime,
            },
            items: state
                .config
                .catalog
                .iter()
                .zip(&state.items)
                .map(|(def, item)| ItemSave {
                    id: def.id,
                    owned: item.owned,
                    unlocked: item.unlocked,
                })
                .collect(),
            prestige: state.prestige.clone(),
            boosts: state
                .config
                .boosts
                .iter()
                .zip(&state.boosts)
                .map(|(def, &owned)| BoostSave { id: def.id, owned })
                .collect(),
            events: EventsSave {
                active: state.events.active.clone(),
                next_event_at: Some(state.events.next_event_at),
                rng: Some(state.events.rng_save()),
            },
            stats: state.stats.clone(),
            display_name: Some(state.config.display_name.clone()),
        }
    }

    pub fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string(self).map_err(|e| invalid(e.to_string()))
    }

    /// Parse without checking it against a catalog; see [`Snapshot::validate`].
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| invalid(e.to_string()))
    }

    /// Check the snapshot against the catalog the engine runs with.
    pub fn validate(&self, state: &EngineState) -> EngineResult<()> {
        if self.version < MIN_COMPATIBLE_VERSION || self.version > SNAPSHOT_VERSION {
            return Err(invalid(format!(
                "unsupported version {} (accepted {}..={})",
                self.version, MIN_COMPATIBLE_VERSION, SNAPSHOT_VERSION
            )));
        }

        check_amount("resources.current", self.resources.current)?;
        check_amount("resources.lifetime", self.resources.lifetime)?;
        check_amount("prestige.points", self.prestige.points)?;
        check_amount("stats.play_time_secs", self.stats.play_time_secs)?;
        check_amount("stats.offline_secs", self.stats.offline_secs)?;
        check_amount("stats.best_per_second", self.stats.best_per_second)?;

        let mut seen = HashSet::new();
        for item in &self.items {
            if state.index_of(item.id).is_none() {
                return Err(invalid(format!("unknown item id {}", item.id)));
            }
            if !seen.insert(item.id) {
                return Err(invalid(format!("duplicate item id {}", item.id)));
            }
        }

        let mut seen = HashSet::new();
        for boost in &self.boosts {
            if state.config.boost(boost.id).is_none() {
                return Err(invalid(format!("unknown boost id {}", boost.id)));
            }
            if !seen.insert(boost.id) {
                return Err(invalid(format!("duplicate boost id {}", boost.id)));
            }
        }

        for event in &self.events.active {
            if !event.multiplier.is_finite() || event.multiplier <= 0.0 {
                return Err(invalid(format!(
                    "event {:?} has multiplier {}",
                    event.kind, event.multiplier
                )));
            }
        }

        Ok(())
    }

    /// Validate, then replace the engine state with the snapshot. On error
    /// the state is untouched.
    ///
    /// The clock is left at `saved_at`; call `offline::resume` afterwards to
    /// credit the time since.
    pub fn restore(&self, state: &mut EngineState) -> EngineResult<()> {
        self.validate(state)?;

        let mut items = EngineState::fresh_items(&state.config);
        for save in &self.items {
            if let Some(idx) = state.index_of(save.id) {
                items[idx] = ItemState {
                    owned: save.owned,
                    unlocked: save.unlocked || items[idx].unlocked,
                };
            }
        }

        let mut boosts = vec![false; state.config.boosts.len()];
        for save in &self.boosts {
            if let Some((idx, _)) = state.config.boost(save.id) {
                boosts[idx] = save.owned;
            }
        }

        let mut events = EventModulator::new(self.saved_at, &state.config.events);
        events.active = self.events.active.clone();
        if let Some(at) = self.events.next_event_at {
            events.next_event_at = at;
        }
        if let Some(rng) = &self.events.rng {
            events.restore_rng(rng);
        }

        state.resources = ResourceState {
            current: self.resources.current,
            lifetime: self.resources.lifetime,
            per_second: 0.0,
        };
        state.items = items;
        state.boosts = boosts;
        state.prestige = self.prestige.clone();
        state.events = events;
        state.stats = self.stats.clone();
        state.last_tick_at = self.saved_at;
        if let Some(name) = &self.display_name {
            state.config.display_name = name.clone();
        }
        state.notifications.clear();
        ledger::recompute_per_second(state);

        Ok(())
    }
}
