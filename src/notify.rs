//! Discrete notifications emitted by the engine for a UI or telemetry sink.
//!
//! The engine never formats display text; each variant carries the ids and
//! numbers a subscriber needs to render its own message.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{EventKind, ItemKind};
use crate::time::Millis;

/// Why a purchase was refused.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PurchaseFailure {
    Locked,
    Insufficient { cost: f64, missing: f64 },
    Unknown,
    AlreadyOwned,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    Unlock {
        id: u32,
        kind: ItemKind,
    },
    EventStarted {
        kind: EventKind,
        multiplier: f64,
        ends_at: Millis,
    },
    EventEnded {
        kind: EventKind,
    },
    PrestigePerformed {
        level: u32,
        points_earned: f64,
    },
    PurchaseFailed {
        id: u32,
        failure: PurchaseFailure,
    },
}

/// Bounded queue of undrained notifications. When full, the oldest entry is
/// dropped.
#[derive(Clone, Debug)]
pub struct Notifications {
    queue: VecDeque<Notification>,
    capacity: usize,
}

impl Notifications {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, notification: Notification) {
        if self.queue.len() >= self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(notification);
    }

    pub fn extend(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        for n in notifications {
            self.push(n);
        }
    }

    /// Take every pending notification, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }
}
