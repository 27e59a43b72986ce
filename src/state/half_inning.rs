//! Edge-triggered detection of half-inning changes from successive state observations.
//!
//! The stored state carries no "side just retired" flag, so subscribers compare each
//! new observation with the previous one.

use crate::state::game::GameState;

/// A half-inning flip inferred from two consecutive observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfInningChange {
    /// Inning now being played.
    pub inning: u32,
    /// True when the new half is the top of the inning.
    pub is_top_inning: bool,
    /// Name of the team now at bat.
    pub batting_team: String,
    /// Away runs at the time of the flip.
    pub away_score: u32,
    /// Home runs at the time of the flip.
    pub home_score: u32,
}

impl HalfInningChange {
    /// Banner line such as `Bottom 3rd — Owls up to bat`.
    pub fn banner(&self) -> String {
        let half = if self.is_top_inning { "Top" } else { "Bottom" };
        format!(
            "{half} {} — {} up to bat",
            ordinal(self.inning),
            self.batting_team
        )
    }
}

/// Remembers the last observed `(outs, inning, half)` and reports flips.
#[derive(Debug, Clone)]
pub struct HalfInningWatcher {
    outs: u8,
    inning: u32,
    is_top_inning: bool,
}

impl Default for HalfInningWatcher {
    fn default() -> Self {
        Self {
            outs: 0,
            inning: 1,
            is_top_inning: true,
        }
    }
}

impl HalfInningWatcher {
    /// Watcher primed with the opening half of a game.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state` and report a flip when the previous observation had at least two
    /// outs, the new one has none, and the inning or half changed.
    pub fn observe(&mut self, state: &GameState) -> Option<HalfInningChange> {
        let side_changed =
            state.inning != self.inning || state.is_top_inning != self.is_top_inning;
        let flipped = self.outs >= 2 && state.outs == 0 && side_changed;

        self.outs = state.outs;
        self.inning = state.inning;
        self.is_top_inning = state.is_top_inning;

        flipped.then(|| HalfInningChange {
            inning: state.inning,
            is_top_inning: state.is_top_inning,
            batting_team: state.batting_team().name.clone(),
            away_score: state.away_team.score,
            home_score: state.home_team.score,
        })
    }
}

/// English ordinal for an inning number (`1st`, `2nd`, `11th`, `23rd`).
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::transitions::{ScoringEvent, compute_transition};

    fn state(outs: u8, inning: u32, is_top_inning: bool) -> GameState {
        GameState {
            outs,
            inning,
            is_top_inning,
            ..GameState::with_team_names("Owls", "Hawks")
        }
    }

    #[test]
    fn detects_flip_after_third_out() {
        let mut watcher = HalfInningWatcher::new();
        assert!(watcher.observe(&state(1, 1, true)).is_none());
        assert!(watcher.observe(&state(2, 1, true)).is_none());

        let change = watcher.observe(&state(0, 1, false)).unwrap();
        assert_eq!(change.batting_team, "Owls");
        assert_eq!(change.banner(), "Bottom 1st — Owls up to bat");
    }

    #[test]
    fn ignores_reset_without_side_change() {
        let mut watcher = HalfInningWatcher::new();
        watcher.observe(&state(2, 4, true));
        assert!(watcher.observe(&state(0, 4, true)).is_none());
    }

    #[test]
    fn ignores_manual_side_switch_with_few_outs() {
        let mut watcher = HalfInningWatcher::new();
        watcher.observe(&state(1, 2, true));
        assert!(watcher.observe(&state(0, 2, false)).is_none());
    }

    #[test]
    fn fires_once_per_flip() {
        let mut watcher = HalfInningWatcher::new();
        watcher.observe(&state(2, 2, false));
        assert!(watcher.observe(&state(0, 3, true)).is_some());
        assert!(watcher.observe(&state(0, 3, true)).is_none());
    }

    #[test]
    fn engine_strikeout_feeds_watcher() {
        let mut watcher = HalfInningWatcher::new();
        let mut current = state(2, 1, true);
        current.strikes = 2;
        watcher.observe(&current);

        let patch = compute_transition(
            &current,
            &ScoringEvent::Strike(crate::state::transitions::StrikeKind::Swinging),
            None,
        )
        .unwrap();
        let next = current.apply(&patch);
        let change = watcher.observe(&next).unwrap();
        assert_eq!(change.inning, 1);
        assert!(!change.is_top_inning);
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(21), "21st");
    }
}
