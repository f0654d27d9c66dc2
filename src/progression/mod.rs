/// Progression engine: one player's economy, driven by caller-supplied time.

pub mod catalog;
pub mod events;
pub mod ledger;
pub mod offline;
pub mod prestige;
pub mod snapshot;
pub mod state;

mod simulator;

use log::warn;

use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError, EngineResult};
use crate::leaderboard::LeaderboardSummary;
use crate::notify::Notification;
use crate::time::Millis;

use catalog::{Purchase, PurchaseScope};
use events::EventPhase;
use ledger::TickReport;
use offline::OfflineReport;
use prestige::{PrestigeBonuses, PrestigeOutcome, PrestigePhase, PrestigeProgress};
use snapshot::Snapshot;
use state::{ActiveEvent, EngineState, ItemState, PrestigeState, ResourceState, SessionStats};

/// Result of [`Engine::load_or_fresh`].
pub struct LoadOutcome {
    pub engine: Engine,
    /// Why the snapshot was discarded, if it was.
    pub error: Option<EngineError>,
    /// Offline credit applied after a successful load.
    pub offline: Option<OfflineReport>,
}

/// Session-scoped progression engine. Every mutating call is all-or-nothing.
pub struct Engine {
    state: EngineState,
}

impl Engine {
    pub fn new(config: EngineConfig, now: Millis) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: EngineState::new(config, now),
        })
    }

    /// Restore a snapshot and credit the time since it was taken.
    pub fn from_snapshot(
        config: EngineConfig,
        json: &str,
        now: Millis,
    ) -> Result<(Self, OfflineReport), EngineError> {
        config.validate()?;
        let mut state = EngineState::new(config, now);
        Snapshot::from_json(json)?.restore(&mut state)?;
        let report = offline::resume(&mut state, now);
        Ok((Self { state }, report))
    }

    /// Load `json` if it is a valid snapshot, otherwise start a fresh game and
    /// report why. `None` means there was nothing to load.
    pub fn load_or_fresh(
        config: EngineConfig,
        json: Option<&str>,
        now: Millis,
    ) -> Result<LoadOutcome, ConfigError> {
        config.validate()?;
        let Some(json) = json else {
            return Ok(LoadOutcome {
                engine: Self::new(config, now)?,
                error: None,
                offline: None,
            });
        };
        match Self::from_snapshot(config.clone(), json, now) {
            Ok((engine, report)) => Ok(LoadOutcome {
                engine,
                error: None,
                offline: Some(report),
            }),
            Err(err) => {
                warn!("discarding snapshot, starting fresh: {}", err);
                Ok(LoadOutcome {
                    engine: Self::new(config, now)?,
                    error: Some(err),
                    offline: None,
                })
            }
        }
    }

    // ── Time ──────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Millis) -> TickReport {
        ledger::tick(&mut self.state, now)
    }

    pub fn resume(&mut self, now: Millis) -> OfflineReport {
        offline::resume(&mut self.state, now)
    }

    // ── Clicking and buying ───────────────────────────────────────

    pub fn click(&mut self) -> f64 {
        ledger::click(&mut self.state)
    }

    pub fn click_power(&self) -> f64 {
        ledger::compute_click_power(&self.state)
    }

    /// List price of the next unit of `id`, before any discount.
    pub fn cost_of(&self, id: u32) -> EngineResult<f64> {
        let idx = self.index(id)?;
        Ok(catalog::cost_of(
            self.state.def(idx),
            self.state.items[idx].owned,
            self.state.prestige.level,
            self.state.config.prestige.cost_multiplier,
        ))
    }

    /// Amount a purchase of `id` would debit right now.
    pub fn price_of(&self, id: u32) -> EngineResult<f64> {
        let idx = self.index(id)?;
        Ok(catalog::price_of(&self.state, idx))
    }

    pub fn can_afford(&self, id: u32) -> EngineResult<bool> {
        Ok(catalog::can_afford(&self.state.resources, self.price_of(id)?))
    }

    pub fn buy(&mut self, id: u32) -> EngineResult<Purchase> {
        catalog::buy_one(&mut self.state, id)
    }

    pub fn buy_n(&mut self, id: u32, n: u32) -> EngineResult<u32> {
        catalog::buy_n(&mut self.state, id, n)
    }

    pub fn buy_cheapest(&mut self, n: u32, scope: PurchaseScope) -> u32 {
        catalog::buy_cheapest(&mut self.state, n, scope)
    }

    pub fn buy_max(&mut self, scope: PurchaseScope) -> u32 {
        catalog::buy_max(&mut self.state, scope)
    }

    pub fn buy_boost(&mut self, id: u32) -> EngineResult<f64> {
        catalog::buy_boost(&mut self.state, id)
    }

    // ── Prestige ──────────────────────────────────────────────────

    pub fn can_prestige(&self, now: Millis) -> bool {
        prestige::can_prestige(&self.state, now)
    }

    pub fn prestige_phase(&self, now: Millis) -> PrestigePhase {
        prestige::phase(&self.state, now)
    }

    pub fn prestige_requirement(&self) -> f64 {
        prestige::requirement(&self.state.config.prestige, self.state.prestige.level)
    }

    pub fn prestige_progress(&self, now: Millis) -> PrestigeProgress {
        prestige::progress(&self.state, now)
    }

    pub fn prestige(&mut self, now: Millis) -> EngineResult<PrestigeOutcome> {
        prestige::execute(&mut self.state, now)
    }

    /// What the accumulated prestige points currently buy.
    pub fn prestige_bonuses(&self) -> PrestigeBonuses {
        prestige::bonuses(&self.state)
    }

    // ── Queries ───────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.state.config
    }

    pub fn resources(&self) -> &ResourceState {
        &self.state.resources
    }

    pub fn item(&self, id: u32) -> Option<&ItemState> {
        self.state.index_of(id).map(|idx| &self.state.items[idx])
    }

    pub fn boost_active(&self, id: u32) -> bool {
        self.state
            .config
            .boost(id)
            .map_or(false, |(idx, _)| self.state.boosts[idx])
    }

    pub fn prestige_state(&self) -> &PrestigeState {
        &self.state.prestige
    }

    pub fn global_multiplier(&self) -> f64 {
        self.state.global_multiplier()
    }

    pub fn active_events(&self) -> &[ActiveEvent] {
        &self.state.events.active
    }

    pub fn event_phase(&self) -> EventPhase {
        self.state.events.phase()
    }

    pub fn next_event_at(&self) -> Millis {
        self.state.events.next_event_at
    }

    pub fn stats(&self) -> &SessionStats {
        &self.state.stats
    }

    pub fn offline_efficiency(&self) -> f64 {
        offline::offline_efficiency(&self.state)
    }

    // ── Snapshot, notifications, leaderboard ──────────────────────

    pub fn snapshot(&self, now: Millis) -> Snapshot {
        Snapshot::extract(&self.state, now)
    }

    /// Replace the current state with `snapshot`. On error nothing changes.
    pub fn restore(&mut self, snapshot: &Snapshot) -> EngineResult<()> {
        snapshot.restore(&mut self.state)
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.state.notifications.drain()
    }

    pub fn summary(&self) -> LeaderboardSummary {
        LeaderboardSummary {
            display_name: self.state.config.display_name.clone(),
            lifetime_resource: self.state.resources.lifetime,
            prestige_level: self.state.prestige.level,
            total_play_time_secs: self.state.stats.play_time_secs + self.state.stats.offline_secs,
        }
    }

    fn index(&self, id: u32) -> EngineResult<usize> {
        self.state.index_of(id).ok_or(EngineError::UnknownItem { id })
    }
}
