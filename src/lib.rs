//! Space Incrementor progression engine.
//!
//! The economy of an incremental clicker: clicks and generators produce
//! energy, multipliers compound production, prestige trades a run for a
//! permanent bonus, and timed events modulate output. The caller owns the
//! clock and persistence; the engine only computes.
//!
//! ```no_run
//! use space_incrementor::{Engine, EngineConfig, PurchaseScope};
//!
//! let mut engine = Engine::new(EngineConfig::default(), 0)?;
//! engine.click();
//! engine.buy_max(PurchaseScope::All);
//! engine.tick(100);
//! let _json = engine.snapshot(100).to_json()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod leaderboard;
pub mod notify;
pub mod progression;
pub mod time;

pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, EngineResult};
pub use leaderboard::{LeaderboardSort, LeaderboardSummary};
pub use notify::Notification;
pub use progression::catalog::PurchaseScope;
pub use progression::snapshot::Snapshot;
pub use progression::{Engine, LoadOutcome};
pub use time::{ClockStep, Millis, TickClock};
