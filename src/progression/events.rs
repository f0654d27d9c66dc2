//! Timed event modulator: expires running events and draws new ones from
//! the configured table on a fixed interval.
//!
//! Draws are scheduled from the start of the previous draw, not its end, so
//! the cadence does not depend on event duration. Randomness comes from a
//! seeded `ChaCha8Rng` whose position is saved with the snapshot; critical
//! click rolls draw from the same stream.

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{EventConfig, EventKind};
use crate::notify::Notification;
use crate::time::Millis;

use super::state::ActiveEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventPhase {
    Idle,
    Active,
}

/// Serializable position of the event RNG.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSave {
    pub seed: [u8; 32],
    pub stream: u64,
    pub word_pos: u128,
}

#[derive(Clone, Debug)]
pub struct EventModulator {
    pub active: Vec<ActiveEvent>,
    pub next_event_at: Millis,
    rng: ChaCha8Rng,
}

impl EventModulator {
    pub fn new(now: Millis, config: &EventConfig) -> Self {
        Self {
            active: Vec::new(),
            next_event_at: now.saturating_add(config.interval_ms()),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    pub fn phase(&self) -> EventPhase {
        if self.active.is_empty() {
            EventPhase::Idle
        } else {
            EventPhase::Active
        }
    }

    /// Expire finished events, then start a new one if a slot is free and the
    /// next draw is due. Returns the transitions that happened.
    pub fn advance(&mut self, now: Millis, config: &EventConfig) -> Vec<Notification> {
        let mut out = Vec::new();

        let (ended, running): (Vec<ActiveEvent>, Vec<ActiveEvent>) =
            self.active.drain(..).partition(|e| e.ends_at <= now);
        self.active = running;
        for e in ended {
            info!("event ended: {:?} x{}", e.kind, e.multiplier);
            out.push(Notification::EventEnded { kind: e.kind });
        }

        if config.catalog.is_empty() || self.active.len() >= config.max_concurrent.max(1) {
            return out;
        }
        if now < self.next_event_at {
            return out;
        }

        let idx = self.rng.gen_range(0..config.catalog.len());
        let def = &config.catalog[idx];
        let event = ActiveEvent {
            kind: def.kind,
            multiplier: def.multiplier,
            started_at: now,
            ends_at: now.saturating_add(def.duration_secs.saturating_mul(1_000)),
        };
        info!(
            "event started: {:?} x{} until {}",
            event.kind, event.multiplier, event.ends_at
        );
        out.push(Notification::EventStarted {
            kind: event.kind,
            multiplier: event.multiplier,
            ends_at: event.ends_at,
        });
        self.active.push(event);
        self.next_event_at = now.saturating_add(config.interval_ms());

        out
    }

    /// Product of active multipliers of `kind`; 1.0 when none is running.
    pub fn multiplier_for(&self, kind: EventKind) -> f64 {
        self.active
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.multiplier)
            .product()
    }

    pub fn is_active(&self, kind: EventKind) -> bool {
        self.active.iter().any(|e| e.kind == kind)
    }

    /// Bernoulli draw from the same stream as the event table. A chance of
    /// zero or less consumes nothing.
    pub fn roll(&mut self, chance: f64) -> bool {
        chance > 0.0 && self.rng.gen_bool(chance.min(1.0))
    }

    /// Push every pending deadline forward by `gap_ms`.
    pub fn shift(&mut self, gap_ms: Millis) {
        for e in &mut self.active {
            e.started_at = e.started_at.saturating_add(gap_ms);
            e.ends_at = e.ends_at.saturating_add(gap_ms);
        }
        self.next_event_at = self.next_event_at.saturating_add(gap_ms);
    }

    pub fn rng_save(&self) -> RngSave {
        RngSave {
            seed: self.rng.get_seed(),
            stream: self.rng.get_stream(),
            word_pos: self.rng.get_word_pos(),
        }
    }

    pub fn restore_rng(&mut self, save: &RngSave) {
        let mut rng = ChaCha8Rng::from_seed(save.seed);
        rng.set_stream(save.stream);
        rng.set_word_pos(save.word_pos);
        self.rng = rng;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventDef;

    fn config_with(defs: Vec<EventDef>) -> EventConfig {
        EventConfig {
            catalog: defs,
            interval_secs: 60,
            max_concurrent: 1,
            seed: 7,
        }
    }

    fn production_only() -> EventConfig {
        config_with(vec![EventDef {
            kind: EventKind::Production,
            multiplier: 2.0,
            duration_secs: 10,
        }])
    }

    #[test]
    fn idle_until_first_interval() {
        let config = production_only();
        let mut m = EventModulator::new(0, &config);
        assert!(m.advance(59_999, &config).is_empty());
        assert_eq!(m.phase(), EventPhase::Idle);
    }

    #[test]
    fn starts_event_when_due() {
        let config = production_only();
        let mut m = EventModulator::new(0, &config);
        let notes = m.advance(60_000, &config);
        assert_eq!(
            notes,
            vec![Notification::EventStarted {
                kind: EventKind::Production,
                multiplier: 2.0,
                ends_at: 70_000,
            }]
        );
        assert_eq!(m.phase(), EventPhase::Active);
        assert_eq!(m.next_event_at, 120_000);
        assert!((m.multiplier_for(EventKind::Production) - 2.0).abs() < 0.001);
        assert!((m.multiplier_for(EventKind::Click) - 1.0).abs() < 0.001);
    }

    #[test]
    fn expires_at_end_time() {
        let config = production_only();
        let mut m = EventModulator::new(0, &config);
        m.advance(60_000, &config);
        assert!(m.advance(69_999, &config).is_empty());
        let notes = m.advance(70_000, &config);
        assert_eq!(notes, vec![Notification::EventEnded { kind: EventKind::Production }]);
        assert_eq!(m.phase(), EventPhase::Idle);
    }

    #[test]
    fn next_draw_is_relative_to_previous_start() {
        let config = config_with(vec![EventDef {
            kind: EventKind::Click,
            multiplier: 3.0,
            duration_secs: 90, // longer than the interval
        }]);
        let mut m = EventModulator::new(0, &config);
        m.advance(60_000, &config);
        // Draw is due at 120s but the single slot is still busy.
        assert!(m.advance(120_000, &config).is_empty());
        assert_eq!(m.active.len(), 1);
        // At 150s the event ends and the overdue draw fires immediately.
        let notes = m.advance(150_000, &config);
        assert_eq!(notes.len(), 2);
        assert!(matches!(notes[0], Notification::EventEnded { .. }));
        assert!(matches!(notes[1], Notification::EventStarted { .. }));
        assert_eq!(m.next_event_at, 210_000);
    }

    #[test]
    fn multi_slot_allows_overlap() {
        let mut config = config_with(vec![EventDef {
            kind: EventKind::Production,
            multiplier: 2.0,
            duration_secs: 300,
        }]);
        config.max_concurrent = 2;
        let mut m = EventModulator::new(0, &config);
        m.advance(60_000, &config);
        m.advance(120_000, &config);
        assert_eq!(m.active.len(), 2);
        assert!((m.multiplier_for(EventKind::Production) - 4.0).abs() < 0.001);
    }

    #[test]
    fn empty_table_never_draws() {
        let config = config_with(Vec::new());
        let mut m = EventModulator::new(0, &config);
        assert!(m.advance(10_000_000, &config).is_empty());
    }

    #[test]
    fn shift_moves_deadlines() {
        let config = production_only();
        let mut m = EventModulator::new(0, &config);
        m.advance(60_000, &config);
        m.shift(5_000);
        assert_eq!(m.active[0].ends_at, 75_000);
        assert_eq!(m.next_event_at, 125_000);
    }

    #[test]
    fn same_seed_draws_same_sequence() {
        let config = EventConfig::default();
        let mut a = EventModulator::new(0, &config);
        let mut b = EventModulator::new(0, &config);
        for hour in 1..=20u64 {
            let now = hour * 3_600_000;
            assert_eq!(a.advance(now, &config), b.advance(now, &config));
        }
    }

    #[test]
    fn restored_rng_continues_the_sequence() {
        let config = EventConfig::default();
        let mut a = EventModulator::new(0, &config);
        for hour in 1..=5u64 {
            a.advance(hour * 3_600_000, &config);
        }
        let mut b = EventModulator::new(0, &config);
        b.restore_rng(&a.rng_save());
        b.active = a.active.clone();
        b.next_event_at = a.next_event_at;
        for hour in 6..=15u64 {
            let now = hour * 3_600_000;
            assert_eq!(a.advance(now, &config), b.advance(now, &config));
        }
    }

    #[test]
    fn rng_position_beyond_u64_survives_json() {
        let config = production_only();
        let mut a = EventModulator::new(0, &config);
        a.rng.set_word_pos((1u128 << 66) + 5);
        let json = serde_json::to_string(&a.rng_save()).unwrap();
        let save: RngSave = serde_json::from_str(&json).unwrap();
        assert_eq!(save.word_pos, (1u128 << 66) + 5);

        let mut b = EventModulator::new(0, &config);
        b.restore_rng(&save);
        assert_eq!(b.rng.get_word_pos(), a.rng.get_word_pos());
        let draws_a: Vec<u32> = (0..8).map(|_| a.rng.gen()).collect();
        let draws_b: Vec<u32> = (0..8).map(|_| b.rng.gen()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn zero_chance_roll_leaves_the_stream_alone() {
        let config = production_only();
        let mut m = EventModulator::new(0, &config);
        let before = m.rng_save();
        assert!(!m.roll(0.0));
        assert_eq!(m.rng_save(), before);
        assert!(!m.roll(-1.0));
        assert_eq!(m.rng_save(), before);
        m.roll(0.5);
        assert_ne!(m.rng_save(), before);
    }

    #[test]
    fn draws_cover_every_kind() {
        let config = EventConfig {
            interval_secs: 1,
            catalog: EventKind::all()
                .iter()
                .map(|&kind| EventDef {
                    kind,
                    multiplier: if kind == EventKind::Discount { 0.5 } else { 2.0 },
                    duration_secs: 0,
                })
                .collect(),
            ..EventConfig::default()
        };
        let mut m = EventModulator::new(0, &config);
        let mut seen = std::collections::HashSet::new();
        for s in 1..=400u64 {
            for n in m.advance(s * 1_000, &config) {
                if let Notification::EventStarted { kind, .. } = n {
                    seen.insert(kind);
                }
            }
        }
        assert_eq!(seen.len(), 4);
    }
}
