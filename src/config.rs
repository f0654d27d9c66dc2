//! Engine configuration: catalog definitions, prestige tuning, event table
//! and offline policy.
//!
//! Definitions are tagged records validated once, when the config is built or
//! parsed, so a malformed entry is rejected up front instead of surfacing as
//! a NaN cost in the middle of a session.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What a catalog entry does once owned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemEffect {
    /// Flat energy per second per unit owned.
    Generator { base_production: f64 },
    /// Global production factor, compounded once per unit owned.
    Multiplier { factor: f64 },
}

impl ItemEffect {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemEffect::Generator { .. } => ItemKind::Generator,
            ItemEffect::Multiplier { .. } => ItemKind::Multiplier,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Generator,
    Multiplier,
}

/// Immutable definition of a purchasable catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: u32,
    pub name: String,
    pub base_cost: f64,
    pub growth_rate: f64,
    /// Lifetime energy required before the entry can be bought.
    pub unlock_threshold: f64,
    pub effect: ItemEffect,
}

impl ItemDef {
    pub fn generator(id: u32, name: &str, base_cost: f64, base_production: f64, unlock_threshold: f64) -> Self {
        Self {
            id,
            name: name.into(),
            base_cost,
            growth_rate: 1.15,
            unlock_threshold,
            effect: ItemEffect::Generator { base_production },
        }
    }

    pub fn multiplier(id: u32, name: &str, base_cost: f64, factor: f64, unlock_threshold: f64) -> Self {
        Self {
            id,
            name: name.into(),
            base_cost,
            growth_rate: 1.5,
            unlock_threshold,
            effect: ItemEffect::Multiplier { factor },
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.effect.kind()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostKind {
    Click,
    Production,
}

/// One-time purchase that multiplies click or production output until the
/// next prestige.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostDef {
    pub id: u32,
    pub name: String,
    pub kind: BoostKind,
    pub factor: f64,
    pub cost: f64,
}

/// Kinds of timed events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Multiplies passive production.
    Production,
    /// Multiplies click power.
    Click,
    /// Multiplies purchase prices (multiplier in (0, 1]).
    Discount,
    /// Multiplies every energy gain: production and clicks.
    Bonus,
}

impl EventKind {
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::Production,
            EventKind::Click,
            EventKind::Discount,
            EventKind::Bonus,
        ]
    }
}

/// An entry of the event draw table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDef {
    pub kind: EventKind,
    pub multiplier: f64,
    pub duration_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickConfig {
    pub base_power: f64,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self { base_power: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestigeConfig {
    /// Lifetime energy needed for the first prestige.
    pub base_requirement: f64,
    /// Requirement growth per prestige level.
    pub requirement_growth: f64,
    /// Catalog cost growth per prestige level.
    pub cost_multiplier: f64,
    /// Global multiplier gained per prestige level.
    pub bonus_per_level: f64,
    pub cooldown_secs: u64,
    /// Re-lock catalog entries with a non-zero threshold on prestige.
    pub reset_unlocks_on_prestige: bool,
    /// Production multiplier per prestige point, on top of the level bonus.
    pub energy_per_point: f64,
    /// Extra click power per prestige point.
    pub click_bonus_per_point: f64,
    pub click_bonus_cap: f64,
    /// Critical click chance per prestige point.
    pub crit_chance_per_point: f64,
    pub crit_chance_cap: f64,
    /// Click power multiplier on a critical click.
    pub crit_multiplier: f64,
}

impl Default for PrestigeConfig {
    fn default() -> Self {
        Self {
            base_requirement: 1_000_000.0,
            requirement_growth: 2.5,
            cost_multiplier: 2.5,
            bonus_per_level: 0.5,
            cooldown_secs: 4 * 60 * 60,
            reset_unlocks_on_prestige: false,
            energy_per_point: 0.01,
            click_bonus_per_point: 0.002,
            click_bonus_cap: 0.5,
            crit_chance_per_point: 0.001,
            crit_chance_cap: 0.2,
            crit_multiplier: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub catalog: Vec<EventDef>,
    /// Time between two draws, measured from the start of the previous draw.
    pub interval_secs: u64,
    pub max_concurrent: usize,
    pub seed: u64,
}

impl EventConfig {
    pub fn interval_ms(&self) -> u64 {
        self.interval_secs.saturating_mul(1_000)
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        let duration_secs = 15 * 60;
        Self {
            catalog: vec![
                EventDef { kind: EventKind::Production, multiplier: 2.0, duration_secs },
                EventDef { kind: EventKind::Click, multiplier: 3.0, duration_secs },
                EventDef { kind: EventKind::Bonus, multiplier: 2.0, duration_secs },
                EventDef { kind: EventKind::Discount, multiplier: 0.75, duration_secs },
            ],
            interval_secs: 60 * 60,
            max_concurrent: 1,
            seed: 42,
        }
    }
}

/// Whether time spent away counts toward prestige and event timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfflineCooldownPolicy {
    /// Push every pending deadline forward by the offline gap.
    Shift,
    /// Leave absolute deadlines alone; they may expire while away.
    Credit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    /// Fraction of the live production rate credited while away.
    pub efficiency: f64,
    /// Extra efficiency per prestige point.
    pub bonus_per_point: f64,
    /// Cap on the prestige-point efficiency bonus.
    pub bonus_cap: f64,
    /// Longest absence that still earns production; `None` means unlimited.
    pub max_offline_secs: Option<u64>,
    pub cooldown_policy: OfflineCooldownPolicy,
    /// Frame gaps longer than this are reported by the tick clock as a resume.
    pub resume_threshold_secs: u64,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            efficiency: 0.7,
            bonus_per_point: 0.003,
            bonus_cap: 0.3,
            max_offline_secs: None,
            cooldown_policy: OfflineCooldownPolicy::Shift,
            resume_threshold_secs: 60,
        }
    }
}

/// Full engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub display_name: String,
    /// Catalog in ascending id order.
    pub catalog: Vec<ItemDef>,
    pub boosts: Vec<BoostDef>,
    pub click: ClickConfig,
    pub prestige: PrestigeConfig,
    pub events: EventConfig,
    pub offline: OfflineConfig,
    /// Undrained notifications kept before the oldest are dropped.
    pub notifications_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            display_name: "Cosmonaut".into(),
            catalog: vec![
                ItemDef::generator(1, "Solar Panel", 10.0, 0.1, 0.0),
                ItemDef::generator(2, "Wind Turbine", 50.0, 0.5, 50.0),
                ItemDef::generator(3, "Hydro Station", 200.0, 2.0, 200.0),
                ItemDef::generator(4, "Nuclear Reactor", 1_000.0, 10.0, 1_000.0),
                ItemDef::generator(5, "Fusion Plant", 5_000.0, 50.0, 5_000.0),
                ItemDef::generator(6, "Dyson Sphere", 25_000.0, 200.0, 25_000.0),
                ItemDef::multiplier(7, "Efficiency I", 100.0, 1.1, 0.0),
                ItemDef::multiplier(8, "Grid II", 500.0, 1.25, 500.0),
                ItemDef::multiplier(9, "Quantum III", 2_500.0, 1.5, 2_500.0),
                ItemDef::multiplier(10, "Singularity", 10_000.0, 2.0, 10_000.0),
            ],
            boosts: vec![
                BoostDef {
                    id: 1,
                    name: "Double Click".into(),
                    kind: BoostKind::Click,
                    factor: 2.0,
                    cost: 100.0,
                },
                BoostDef {
                    id: 2,
                    name: "Overdrive".into(),
                    kind: BoostKind::Production,
                    factor: 5.0,
                    cost: 500.0,
                },
            ],
            click: ClickConfig::default(),
            prestige: PrestigeConfig::default(),
            events: EventConfig::default(),
            offline: OfflineConfig::default(),
            notifications_capacity: 50,
        }
    }
}

fn positive(id: u32, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { id, field, value })
    }
}

fn non_negative(id: u32, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { id, field, value })
    }
}

fn in_range(
    field: &'static str,
    expected: &'static str,
    value: f64,
    ok: impl Fn(f64) -> bool,
) -> Result<(), ConfigError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, expected, value })
    }
}

impl EngineConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject malformed definitions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut previous: Option<u32> = None;
        for def in &self.catalog {
            if let Some(prev) = previous {
                if def.id == prev {
                    return Err(ConfigError::DuplicateId(def.id));
                }
                if def.id < prev {
                    return Err(ConfigError::UnorderedCatalog {
                        previous: prev,
                        found: def.id,
                    });
                }
            }
            previous = Some(def.id);

            positive(def.id, "base_cost", def.base_cost)?;
            positive(def.id, "growth_rate", def.growth_rate)?;
            if def.growth_rate < 1.0 {
                return Err(ConfigError::OutOfRange {
                    field: "growth_rate",
                    expected: ">= 1",
                    value: def.growth_rate,
                });
            }
            non_negative(def.id, "unlock_threshold", def.unlock_threshold)?;
            match def.effect {
                ItemEffect::Generator { base_production } => {
                    non_negative(def.id, "base_production", base_production)?
                }
                ItemEffect::Multiplier { factor } => positive(def.id, "factor", factor)?,
            }
        }

        for (i, boost) in self.boosts.iter().enumerate() {
            if self.boosts[..i].iter().any(|b| b.id == boost.id) {
                return Err(ConfigError::DuplicateId(boost.id));
            }
            positive(boost.id, "factor", boost.factor)?;
            non_negative(boost.id, "cost", boost.cost)?;
        }

        non_negative(0, "click.base_power", self.click.base_power)?;

        let p = &self.prestige;
        in_range("prestige.base_requirement", "> 0", p.base_requirement, |v| v > 0.0)?;
        in_range("prestige.requirement_growth", ">= 1", p.requirement_growth, |v| v >= 1.0)?;
        in_range("prestige.cost_multiplier", "> 0", p.cost_multiplier, |v| v > 0.0)?;
        in_range("prestige.bonus_per_level", ">= 0", p.bonus_per_level, |v| v >= 0.0)?;
        in_range("prestige.energy_per_point", ">= 0", p.energy_per_point, |v| v >= 0.0)?;
        in_range("prestige.click_bonus_per_point", ">= 0", p.click_bonus_per_point, |v| v >= 0.0)?;
        in_range("prestige.click_bonus_cap", ">= 0", p.click_bonus_cap, |v| v >= 0.0)?;
        in_range("prestige.crit_chance_per_point", ">= 0", p.crit_chance_per_point, |v| v >= 0.0)?;
        in_range("prestige.crit_chance_cap", "within [0, 1]", p.crit_chance_cap, |v| (0.0..=1.0).contains(&v))?;
        in_range("prestige.crit_multiplier", ">= 1", p.crit_multiplier, |v| v >= 1.0)?;

        if !self.events.catalog.is_empty() {
            in_range("events.interval_secs", "> 0", self.events.interval_secs as f64, |v| v > 0.0)?;
            in_range("events.max_concurrent", ">= 1", self.events.max_concurrent as f64, |v| v >= 1.0)?;
        }
        for (i, event) in self.events.catalog.iter().enumerate() {
            positive(i as u32, "multiplier", event.multiplier)?;
            if event.kind == EventKind::Discount && event.multiplier > 1.0 {
                return Err(ConfigError::InvalidDiscount(event.multiplier));
            }
        }

        let o = &self.offline;
        in_range("offline.efficiency", "within [0, 1]", o.efficiency, |v| (0.0..=1.0).contains(&v))?;
        in_range("offline.bonus_cap", "within [0, 1]", o.bonus_cap, |v| (0.0..=1.0).contains(&v))?;
        in_range("offline.bonus_per_point", ">= 0", o.bonus_per_point, |v| v >= 0.0)?;

        Ok(())
    }

    /// Catalog position and definition for `id`.
    pub fn item(&self, id: u32) -> Option<(usize, &ItemDef)> {
        self.catalog.iter().enumerate().find(|(_, d)| d.id == id)
    }

    pub fn boost(&self, id: u32) -> Option<(usize, &BoostDef)> {
        self.boosts.iter().enumerate().find(|(_, b)| b.id == id)
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.prestige.cooldown_secs.saturating_mul(1_000)
    }

    pub fn resume_threshold_ms(&self) -> u64 {
        self.offline.resume_threshold_secs.saturating_mul(1_000)
    }
}
