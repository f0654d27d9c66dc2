//! Read-only leaderboard summary and ordering helpers. Storage is up to the
//! caller.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Weight of one prestige level in [`LeaderboardSort::Total`].
pub const PRESTIGE_WEIGHT: f64 = 1_000_000.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardSummary {
    pub display_name: String,
    pub lifetime_resource: f64,
    pub prestige_level: u32,
    pub total_play_time_secs: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardSort {
    /// Lifetime energy of the current run.
    #[default]
    Balance,
    Prestige,
    /// `prestige_level * 1e6 + lifetime_resource`.
    Total,
}

impl LeaderboardSummary {
    pub fn score(&self, sort: LeaderboardSort) -> f64 {
        match sort {
            LeaderboardSort::Balance => self.lifetime_resource,
            LeaderboardSort::Prestige => self.prestige_level as f64,
            LeaderboardSort::Total => {
                self.prestige_level as f64 * PRESTIGE_WEIGHT + self.lifetime_resource
            }
        }
    }
}

fn compare(a: &LeaderboardSummary, b: &LeaderboardSummary, sort: LeaderboardSort) -> Ordering {
    let primary = b.score(sort).total_cmp(&a.score(sort));
    match sort {
        // Same level: the richer run ranks first.
        LeaderboardSort::Prestige => {
            primary.then_with(|| b.lifetime_resource.total_cmp(&a.lifetime_resource))
        }
        _ => primary,
    }
}

/// Sort best first. Equal entries keep their input order.
pub fn rank(entries: &mut [LeaderboardSummary], sort: LeaderboardSort) {
    entries.sort_by(|a, b| compare(a, b, sort));
}

/// 1-based position of `name` after ranking, if present.
pub fn position(entries: &[LeaderboardSummary], name: &str, sort: LeaderboardSort) -> Option<usize> {
    let mut ranked = entries.to_vec();
    rank(&mut ranked, sort);
    ranked
        .iter()
        .position(|e| e.display_name == name)
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, lifetime: f64, level: u32) -> LeaderboardSummary {
        LeaderboardSummary {
            display_name: name.into(),
            lifetime_resource: lifetime,
            prestige_level: level,
            total_play_time_secs: 0.0,
        }
    }

    fn names(entries: &[LeaderboardSummary]) -> Vec<&str> {
        entries.iter().map(|e| e.display_name.as_str()).collect()
    }

    #[test]
    fn balance_sort_is_descending() {
        let mut board = vec![entry("a", 10.0, 3), entry("b", 500.0, 0), entry("c", 50.0, 1)];
        rank(&mut board, LeaderboardSort::Balance);
        assert_eq!(names(&board), vec!["b", "c", "a"]);
    }

    #[test]
    fn prestige_sort_breaks_ties_by_balance() {
        let mut board = vec![entry("a", 10.0, 2), entry("b", 500.0, 2), entry("c", 1e9, 1)];
        rank(&mut board, LeaderboardSort::Prestige);
        assert_eq!(names(&board), vec!["b", "a", "c"]);
    }

    #[test]
    fn total_weighs_prestige_heavily() {
        let mut board = vec![entry("rich", 900_000.0, 0), entry("reborn", 0.0, 1)];
        rank(&mut board, LeaderboardSort::Total);
        assert_eq!(names(&board), vec!["reborn", "rich"]);
        assert!((board[0].score(LeaderboardSort::Total) - 1e6).abs() < 1e-9);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let mut board = vec![entry("first", 5.0, 0), entry("second", 5.0, 0)];
        rank(&mut board, LeaderboardSort::Balance);
        assert_eq!(names(&board), vec!["first", "second"]);
    }

    #[test]
    fn position_is_one_based() {
        let board = vec![entry("a", 1.0, 0), entry("b", 2.0, 0)];
        assert_eq!(position(&board, "b", LeaderboardSort::Balance), Some(1));
        assert_eq!(position(&board, "a", LeaderboardSort::Balance), Some(2));
        assert_eq!(position(&board, "zed", LeaderboardSort::Balance), None);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let json = serde_json::to_string(&entry("a", 1.0, 0)).unwrap();
        assert!(json.contains("\"displayName\""));
        assert!(json.contains("\"lifetimeResource\""));
    }
}
