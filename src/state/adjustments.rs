//! Manual scorer corrections. Like the engine these only build patches; unlike
//! the engine they are not written to the play log.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::state::{
    game::{GameState, TeamSide},
    patch::GameStatePatch,
};

const AT_BAT_RESET: &str = "At-bat reset";

/// One of the three bases a runner can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Base {
    /// First base.
    First,
    /// Second base.
    Second,
    /// Third base.
    Third,
}

/// Correction to one side's team line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamAdjustment {
    /// New display name.
    pub name: Option<String>,
    /// Signed change to the score.
    pub score_delta: i32,
    /// Signed change to the errors.
    pub errors_delta: i32,
}

/// Flip occupancy of `base`.
pub fn toggle_base(state: &GameState, base: Base) -> GameStatePatch {
    let mut patch = GameStatePatch::default();
    match base {
        Base::First => patch.on_first = Some(!state.on_first),
        Base::Second => patch.on_second = Some(!state.on_second),
        Base::Third => patch.on_third = Some(!state.on_third),
    }
    patch
}

/// Hand the bat to the other side without touching the inning number.
pub fn switch_half(state: &GameState) -> GameStatePatch {
    GameStatePatch {
        is_top_inning: Some(!state.is_top_inning),
        balls: Some(0),
        strikes: Some(0),
        outs: Some(0),
        pitch_count: Some(0),
        on_first: Some(false),
        on_second: Some(false),
        on_third: Some(false),
        last_play: Some(String::new()),
        ..GameStatePatch::default()
    }
}

/// Clear balls and strikes for the current batter.
pub fn reset_count() -> GameStatePatch {
    GameStatePatch {
        balls: Some(0),
        strikes: Some(0),
        last_play: Some(AT_BAT_RESET.to_string()),
        ..GameStatePatch::default()
    }
}

/// Patch for the live or finished flag.
pub fn set_active(is_active: bool) -> GameStatePatch {
    GameStatePatch {
        is_active: Some(is_active),
        ..GameStatePatch::default()
    }
}

/// Rename a side or nudge its score and errors; totals never drop below zero.
pub fn adjust_team(state: &GameState, side: TeamSide, adjustment: &TeamAdjustment) -> GameStatePatch {
    let mut team = state.team(side).clone();
    if let Some(name) = &adjustment.name {
        team.name = name.clone();
    }
    team.score = team.score.saturating_add_signed(adjustment.score_delta);
    team.errors = team.errors.saturating_add_signed(adjustment.errors_delta);

    let mut patch = GameStatePatch::default();
    patch.set_team(side, team);
    patch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_flips_only_that_base() {
        let mut state = GameState::default();
        state.on_second = true;
        let next = state.apply(&toggle_base(&state, Base::Second));
        assert!(!next.on_second);
        let next = next.apply(&toggle_base(&next, Base::First));
        assert!(next.on_first);
        assert!(!next.on_third);
    }

    #[test]
    fn switching_half_clears_the_field() {
        let mut state = GameState::default();
        state.inning = 4;
        state.balls = 2;
        state.outs = 1;
        state.pitch_count = 30;
        state.on_third = true;
        state.last_play = "Single".into();

        let next = state.apply(&switch_half(&state));
        assert!(!next.is_top_inning);
        assert_eq!(next.inning, 4);
        assert_eq!((next.balls, next.strikes, next.outs), (0, 0, 0));
        assert_eq!(next.pitch_count, 0);
        assert_eq!(next.runners_on(), 0);
        assert_eq!(next.last_play, "");
    }

    #[test]
    fn reset_count_keeps_outs_and_runners() {
        let mut state = GameState::default();
        state.balls = 3;
        state.strikes = 2;
        state.outs = 2;
        state.on_first = true;
        let next = state.apply(&reset_count());
        assert_eq!((next.balls, next.strikes, next.outs), (0, 0, 2));
        assert!(next.on_first);
        assert_eq!(next.last_play, "At-bat reset");
    }

    #[test]
    fn team_adjustments_floor_at_zero() {
        let mut state = GameState::default();
        state.home_team.score = 1;
        let adjustment = TeamAdjustment {
            name: Some("Owls".into()),
            score_delta: -3,
            errors_delta: 2,
        };
        let next = state.apply(&adjust_team(&state, TeamSide::Home, &adjustment));
        assert_eq!(next.home_team.name, "Owls");
        assert_eq!(next.home_team.score, 0);
        assert_eq!(next.home_team.errors, 2);
        assert_eq!(next.away_team, state.away_team);
    }

    #[test]
    fn active_flag_is_the_only_change() {
        let state = GameState::default();
        let patch = set_active(false);
        assert_eq!(
            patch,
            GameStatePatch {
                is_active: Some(false),
                ..GameStatePatch::default()
            }
        );
        assert!(!state.apply(&patch).is_active);
    }
}
