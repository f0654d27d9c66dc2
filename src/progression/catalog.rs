//! Catalog purchases: cost curves, single and bulk buys, boosts and unlocks.

use log::debug;

use crate::config::{EventKind, ItemDef, ItemKind};
use crate::error::{EngineError, EngineResult};
use crate::notify::{Notification, PurchaseFailure};

use super::ledger;
use super::state::{EngineState, ResourceState};

/// Upper bound on purchases made by one `buy_max` call.
pub const BUY_MAX_LIMIT: u32 = 10_000;

/// Which catalog entries a bulk purchase may pick from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurchaseScope {
    All,
    Generators,
    Multipliers,
}

impl PurchaseScope {
    fn includes(self, kind: ItemKind) -> bool {
        match self {
            PurchaseScope::All => true,
            PurchaseScope::Generators => kind == ItemKind::Generator,
            PurchaseScope::Multipliers => kind == ItemKind::Multiplier,
        }
    }
}

/// A completed purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct Purchase {
    pub id: u32,
    pub kind: ItemKind,
    /// Energy debited.
    pub cost: f64,
    pub owned: u32,
    /// Price of the next unit.
    pub next_cost: f64,
}

/// `floor(base_cost * growth_rate^owned * prestige_cost_multiplier^prestige_level)`.
pub fn cost_of(def: &ItemDef, owned: u32, prestige_level: u32, prestige_cost_multiplier: f64) -> f64 {
    (def.base_cost
        * def.growth_rate.powf(owned as f64)
        * prestige_cost_multiplier.powf(prestige_level as f64))
    .floor()
}

/// Non-finite prices are never affordable.
pub fn can_afford(resources: &ResourceState, cost: f64) -> bool {
    cost.is_finite() && resources.current >= cost
}

/// Apply an active discount event to a list price.
fn discounted(state: &EngineState, cost: f64) -> f64 {
    let m = state.events.multiplier_for(EventKind::Discount);
    if m < 1.0 {
        (cost * m).floor()
    } else {
        cost
    }
}

/// Price currently charged for the next unit of catalog entry `idx`.
pub fn price_of(state: &EngineState, idx: usize) -> f64 {
    let cost = cost_of(
        state.def(idx),
        state.items[idx].owned,
        state.prestige.level,
        state.config.prestige.cost_multiplier,
    );
    discounted(state, cost)
}

fn failure_of(err: &EngineError) -> PurchaseFailure {
    match err {
        EngineError::LockedItem { .. } => PurchaseFailure::Locked,
        EngineError::InsufficientResource { cost, missing, .. } => PurchaseFailure::Insufficient {
            cost: *cost,
            missing: *missing,
        },
        EngineError::AlreadyOwned { .. } => PurchaseFailure::AlreadyOwned,
        _ => PurchaseFailure::Unknown,
    }
}

fn report_failure(state: &mut EngineState, id: u32, err: &EngineError) {
    debug!("purchase of {} refused: {}", id, err);
    state.notifications.push(Notification::PurchaseFailed {
        id,
        failure: failure_of(err),
    });
}

/// One purchase without notifications. Either debits and increments, or
/// leaves the state untouched.
fn try_buy(state: &mut EngineState, id: u32) -> EngineResult<Purchase> {
    let idx = state.index_of(id).ok_or(EngineError::UnknownItem { id })?;
    if !state.items[idx].unlocked {
        return Err(EngineError::LockedItem {
            id,
            unlock_threshold: state.def(idx).unlock_threshold,
        });
    }
    let cost = price_of(state, idx);
    if !can_afford(&state.resources, cost) {
        return Err(EngineError::InsufficientResource {
            id,
            cost,
            missing: cost - state.resources.current,
        });
    }

    state.resources.current -= cost;
    state.items[idx].owned += 1;
    ledger::recompute_per_second(state);

    let purchase = Purchase {
        id,
        kind: state.def(idx).kind(),
        cost,
        owned: state.items[idx].owned,
        next_cost: price_of(state, idx),
    };
    debug!(
        "bought {} (#{}) for {}, next {}",
        state.def(idx).name,
        purchase.owned,
        cost,
        purchase.next_cost
    );
    Ok(purchase)
}

/// Buy one unit of `id`.
pub fn buy_one(state: &mut EngineState, id: u32) -> EngineResult<Purchase> {
    let result = try_buy(state, id);
    match &result {
        Ok(_) => {
            check_unlocks(state);
        }
        Err(err) => report_failure(state, id, err),
    }
    result
}

/// Buy up to `n` units of `id`, stopping at the first unaffordable one.
/// Locked or unknown entries fail outright; running out of energy just ends
/// the run. Returns the number bought.
pub fn buy_n(state: &mut EngineState, id: u32, n: u32) -> EngineResult<u32> {
    let mut bought = 0;
    while bought < n {
        match try_buy(state, id) {
            Ok(_) => bought += 1,
            Err(err @ EngineError::InsufficientResource { .. }) => {
                if bought == 0 {
                    report_failure(state, id, &err);
                }
                break;
            }
            Err(err) => {
                report_failure(state, id, &err);
                return Err(err);
            }
        }
    }
    if bought > 0 {
        check_unlocks(state);
    }
    Ok(bought)
}

/// Unlocked entry in `scope` with the lowest price; ties go to catalog order.
pub fn cheapest(state: &EngineState, scope: PurchaseScope) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, (def, item)) in state.config.catalog.iter().zip(&state.items).enumerate() {
        if !item.unlocked || !scope.includes(def.kind()) {
            continue;
        }
        let price = price_of(state, idx);
        if best.map_or(true, |(_, p)| price < p) {
            best = Some((idx, price));
        }
    }
    best
}

/// `n` times, buy the cheapest unlocked entry in `scope`. Stops early when
/// nothing is affordable. Returns the number bought.
pub fn buy_cheapest(state: &mut EngineState, n: u32, scope: PurchaseScope) -> u32 {
    let mut bought = 0;
    while bought < n {
        let Some((idx, price)) = cheapest(state, scope) else {
            break;
        };
        if !can_afford(&state.resources, price) {
            break;
        }
        let id = state.def(idx).id;
        if try_buy(state, id).is_err() {
            break;
        }
        bought += 1;
    }
    if bought > 0 {
        check_unlocks(state);
    }
    bought
}

/// Keep buying the cheapest entry until nothing is affordable.
pub fn buy_max(state: &mut EngineState, scope: PurchaseScope) -> u32 {
    buy_cheapest(state, BUY_MAX_LIMIT, scope)
}

/// Activate boost `id` for the rest of the current prestige cycle.
pub fn buy_boost(state: &mut EngineState, id: u32) -> EngineResult<f64> {
    let result = try_buy_boost(state, id);
    if let Err(err) = &result {
        report_failure(state, id, err);
    }
    result
}

fn try_buy_boost(state: &mut EngineState, id: u32) -> EngineResult<f64> {
    let (idx, def) = state.config.boost(id).ok_or(EngineError::UnknownItem { id })?;
    if state.boosts[idx] {
        return Err(EngineError::AlreadyOwned { id });
    }
    let cost = discounted(state, def.cost);
    if !can_afford(&state.resources, cost) {
        return Err(EngineError::InsufficientResource {
            id,
            cost,
            missing: cost - state.resources.current,
        });
    }
    debug!("boost {} activated for {}", def.name, cost);
    state.resources.current -= cost;
    state.boosts[idx] = true;
    ledger::recompute_per_second(state);
    Ok(cost)
}

/// Unlock every locked entry whose threshold has been reached. Unlocks are
/// one-shot. Returns the ids unlocked by this call.
pub fn check_unlocks(state: &mut EngineState) -> Vec<u32> {
    let lifetime = state.resources.lifetime;
    let mut unlocked = Vec::new();
    for (def, item) in state.config.catalog.iter().zip(state.items.iter_mut()) {
        if item.unlocked || def.unlock_threshold > lifetime {
            continue;
        }
        item.unlocked = true;
        debug!("unlocked {} at {} lifetime", def.name, lifetime);
        unlocked.push((def.id, def.kind()));
    }
    for &(id, kind) in &unlocked {
        state.notifications.push(Notification::Unlock { id, kind });
    }
    unlocked.into_iter().map(|(id, _)| id).collect()
}
