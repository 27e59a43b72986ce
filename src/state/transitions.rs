//! Scoring rules: pure functions turning a [`GameState`] and a scoring event into a
//! [`GameStatePatch`].
//!
//! Nothing in this module performs I/O or mutates its input, so it can be called
//! from any task without synchronisation. Persisting the patch and logging the play
//! is the caller's job.

use thiserror::Error;

use crate::state::{
    game::{BatterStat, GameState, TeamSide},
    patch::GameStatePatch,
};

/// Description used for an out when the scorer does not supply one.
pub const DEFAULT_OUT_DESCRIPTION: &str = "Out";
const SWINGING_STRIKEOUT: &str = "Strikeout K (Swinging)";
const CALLED_STRIKEOUT: &str = "Strikeout ꓘ (Called)";

/// Flavour of a strike, which only changes the play description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeKind {
    /// Strike without further detail.
    Generic,
    /// Batter swung and missed.
    Swinging,
    /// Batter took a pitch in the zone.
    Called,
}

impl StrikeKind {
    fn label(self) -> &'static str {
        match self {
            StrikeKind::Generic => "Strike",
            StrikeKind::Swinging => "Swinging Strike",
            StrikeKind::Called => "Called Strike",
        }
    }

    fn strikeout_label(self) -> &'static str {
        match self {
            StrikeKind::Generic | StrikeKind::Swinging => SWINGING_STRIKEOUT,
            StrikeKind::Called => CALLED_STRIKEOUT,
        }
    }
}

/// Base hit by number of bases reached by the batter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// One base.
    Single,
    /// Two bases.
    Double,
    /// Three bases.
    Triple,
    /// Four bases.
    HomeRun,
}

impl HitKind {
    /// Label used in play descriptions.
    pub fn label(self) -> &'static str {
        match self {
            HitKind::Single => "Single",
            HitKind::Double => "Double",
            HitKind::Triple => "Triple",
            HitKind::HomeRun => "Home Run",
        }
    }

    /// Move the runners for a hit of this kind, returning the new bases and the runs
    /// that crossed the plate.
    fn advance(self, bases: Bases) -> (Bases, u32) {
        match self {
            HitKind::HomeRun => (Bases::EMPTY, 1 + bases.occupied()),
            HitKind::Triple => (
                Bases {
                    first: false,
                    second: false,
                    third: true,
                },
                bases.occupied(),
            ),
            HitKind::Double => (
                Bases {
                    first: false,
                    second: true,
                    third: bases.first,
                },
                u32::from(bases.second) + u32::from(bases.third),
            ),
            HitKind::Single => (
                Bases {
                    first: true,
                    second: bases.first,
                    third: bases.second,
                },
                u32::from(bases.third),
            ),
        }
    }
}

impl TryFrom<u8> for HitKind {
    type Error = TransitionError;

    fn try_from(bases: u8) -> Result<Self, Self::Error> {
        match bases {
            1 => Ok(HitKind::Single),
            2 => Ok(HitKind::Double),
            3 => Ok(HitKind::Triple),
            4 => Ok(HitKind::HomeRun),
            other => Err(TransitionError::InvalidBases { bases: other }),
        }
    }
}

/// Events the scorer can record against the live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringEvent {
    /// Pitch outside the zone.
    Ball,
    /// Strike of the given kind.
    Strike(StrikeKind),
    /// Foul ball, never a third strike.
    Foul,
    /// Out on a ball in play or any scorer supplied description.
    Out {
        /// Optional description, defaults to [`DEFAULT_OUT_DESCRIPTION`].
        description: Option<String>,
    },
    /// Base hit reaching `bases` bases (1 to 4).
    Hit {
        /// Number of bases reached by the batter.
        bases: u8,
    },
    /// Base on balls.
    Walk,
    /// Batter hit by a pitch, awarded first like a walk.
    HitByPitch,
    /// Batter safe at first on a fielding error.
    ReachedOnError,
    /// Batter safe at first on a fielder's choice.
    FieldersChoice,
    /// Manual run credited to the batting team.
    Run,
}

/// Rejection of a scoring event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Hits can only reach one to four bases.
    #[error("invalid hit: {bases} bases (expected 1 to 4)")]
    InvalidBases {
        /// Number of bases requested.
        bases: u8,
    },
    /// The stored state holds a count no transition can produce.
    #[error("count out of range: {balls} balls, {strikes} strikes, {outs} outs")]
    CountOutOfRange {
        /// Stored balls.
        balls: u8,
        /// Stored strikes.
        strikes: u8,
        /// Stored outs.
        outs: u8,
    },
    /// Innings are numbered from one.
    #[error("invalid inning {0}")]
    InvalidInning(u32),
}

/// Boolean base occupancy; runners have no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bases {
    first: bool,
    second: bool,
    third: bool,
}

impl Bases {
    const EMPTY: Bases = Bases {
        first: false,
        second: false,
        third: false,
    };

    fn of(state: &GameState) -> Self {
        Self {
            first: state.on_first,
            second: state.on_second,
            third: state.on_third,
        }
    }

    fn occupied(self) -> u32 {
        u32::from(self.first) + u32::from(self.second) + u32::from(self.third)
    }

    fn write(self, patch: &mut GameStatePatch) {
        patch.on_first = Some(self.first);
        patch.on_second = Some(self.second);
        patch.on_third = Some(self.third);
    }
}

/// Compute the patch for `event`, crediting `batter_id` where the event records an
/// at-bat.
pub fn compute_transition(
    state: &GameState,
    event: &ScoringEvent,
    batter_id: Option<&str>,
) -> Result<GameStatePatch, TransitionError> {
    ensure_well_formed(state)?;

    let patch = match event {
        ScoringEvent::Ball => apply_ball(state),
        ScoringEvent::Strike(kind) => apply_strike(state, *kind, batter_id),
        ScoringEvent::Foul => apply_foul(state),
        ScoringEvent::Out { description } => apply_out(
            state,
            description.as_deref().unwrap_or(DEFAULT_OUT_DESCRIPTION),
            batter_id,
        ),
        ScoringEvent::Hit { bases } => apply_hit(state, HitKind::try_from(*bases)?, batter_id),
        ScoringEvent::Walk | ScoringEvent::HitByPitch => apply_walk(state),
        // Scored as a single; the batter is not credited.
        ScoringEvent::ReachedOnError | ScoringEvent::FieldersChoice => {
            apply_hit(state, HitKind::Single, None)
        }
        ScoringEvent::Run => score_run(state),
    };

    Ok(patch)
}

/// Reject states that violate the stored-count invariants.
pub fn ensure_well_formed(state: &GameState) -> Result<(), TransitionError> {
    if state.balls > 3 || state.strikes > 2 || state.outs > 2 {
        return Err(TransitionError::CountOutOfRange {
            balls: state.balls,
            strikes: state.strikes,
            outs: state.outs,
        });
    }
    if state.inning == 0 {
        return Err(TransitionError::InvalidInning(state.inning));
    }
    Ok(())
}

/// Ball; the fourth ball is a walk.
pub fn apply_ball(state: &GameState) -> GameStatePatch {
    if state.balls >= 3 {
        return apply_walk(state);
    }

    GameStatePatch {
        balls: Some(state.balls + 1),
        last_play: Some("Ball".into()),
        ..with_pitch(state)
    }
}

/// Strike; the third strike is an out charged to the batter.
pub fn apply_strike(state: &GameState, kind: StrikeKind, batter_id: Option<&str>) -> GameStatePatch {
    if state.strikes >= 2 {
        return apply_out(state, kind.strikeout_label(), batter_id);
    }

    GameStatePatch {
        strikes: Some(state.strikes + 1),
        last_play: Some(kind.label().into()),
        ..with_pitch(state)
    }
}

/// Foul ball; strikes are capped at two.
pub fn apply_foul(state: &GameState) -> GameStatePatch {
    GameStatePatch {
        strikes: Some((state.strikes + 1).min(2)),
        last_play: Some("Foul Ball".into()),
        ..with_pitch(state)
    }
}

/// Out; the third out retires the side.
pub fn apply_out(state: &GameState, description: &str, batter_id: Option<&str>) -> GameStatePatch {
    let mut patch = GameStatePatch::default();
    credit_batter(state, batter_id, false, &mut patch);

    let outs = state.outs + 1;
    if outs >= 3 {
        return GameStatePatch {
            last_play: Some(format!("{description} — 3 Outs, side retired")),
            ..patch.merge(flip_half_inning(state))
        };
    }

    GameStatePatch {
        outs: Some(outs),
        balls: Some(0),
        strikes: Some(0),
        last_play: Some(description.to_string()),
        ..patch.merge(with_pitch(state))
    }
}

/// Base hit; runners advance by the hit's bases and the batter gets a hit.
pub fn apply_hit(state: &GameState, hit: HitKind, batter_id: Option<&str>) -> GameStatePatch {
    let mut patch = with_pitch(state);
    let runs = advance_runners(state, hit, &mut patch);
    credit_batter(state, batter_id, true, &mut patch);
    patch.last_play = Some(format!("{}{}", hit.label(), runs_clause(runs)));
    patch
}

/// Walk; only forced runners advance.
pub fn apply_walk(state: &GameState) -> GameStatePatch {
    let before = Bases::of(state);
    let mut after = before;
    let mut forced_in = false;

    if before.first && before.second && before.third {
        forced_in = true;
    } else if before.first && before.second {
        after.third = true;
    } else if before.first {
        after.second = true;
    }
    after.first = true;

    let mut patch = with_pitch(state);
    after.write(&mut patch);
    patch.balls = Some(0);
    patch.strikes = Some(0);

    if forced_in {
        let side = state.batting_side();
        let mut team = state.team(side).clone();
        team.score = team.score.saturating_add(1);
        patch.set_team(side, team);
        patch.last_play = Some("Walk — Run Forced In".into());
    } else {
        patch.last_play = Some("Walk".into());
    }

    patch
}

/// Manual run for the batting team; the count, bases, and pitch count are untouched.
pub fn score_run(state: &GameState) -> GameStatePatch {
    let side = state.batting_side();
    let mut team = state.team(side).clone();
    team.score = team.score.saturating_add(1);

    let mut patch = GameStatePatch {
        last_play: Some("Run Scored".into()),
        ..Default::default()
    };
    patch.set_team(side, team);
    patch
}

/// Patch for the end of a half-inning: sides flip, everything else resets.
fn flip_half_inning(state: &GameState) -> GameStatePatch {
    let is_top_inning = !state.is_top_inning;
    let inning = if is_top_inning {
        state.inning.saturating_add(1)
    } else {
        state.inning
    };

    let mut patch = GameStatePatch {
        outs: Some(0),
        balls: Some(0),
        strikes: Some(0),
        pitch_count: Some(0),
        is_top_inning: Some(is_top_inning),
        inning: Some(inning),
        ..Default::default()
    };
    Bases::EMPTY.write(&mut patch);
    patch
}

fn advance_runners(state: &GameState, hit: HitKind, patch: &mut GameStatePatch) -> u32 {
    let (bases, runs) = hit.advance(Bases::of(state));
    bases.write(patch);
    patch.balls = Some(0);
    patch.strikes = Some(0);

    let side: TeamSide = state.batting_side();
    let mut team = state.team(side).clone();
    team.score = team.score.saturating_add(runs);
    team.hits = team.hits.saturating_add(1);
    patch.set_team(side, team);

    runs
}

fn credit_batter(
    state: &GameState,
    batter_id: Option<&str>,
    hit: bool,
    patch: &mut GameStatePatch,
) {
    let Some(batter_id) = batter_id.filter(|id| !id.is_empty()) else {
        return;
    };

    let previous = state.batter_stat(batter_id);
    let mut stats = state.batter_stats.clone();
    stats.insert(
        batter_id.to_string(),
        BatterStat {
            at_bats: previous.at_bats.saturating_add(1),
            hits: previous.hits.saturating_add(u32::from(hit)),
        },
    );
    patch.batter_stats = Some(stats);
}

fn with_pitch(state: &GameState) -> GameStatePatch {
    GameStatePatch {
        pitch_count: Some(state.pitch_count.saturating_add(1)),
        ..Default::default()
    }
}

fn runs_clause(runs: u32) -> String {
    match runs {
        0 => String::new(),
        1 => " — 1 Run Scored".into(),
        n => format!(" — {n} Runs Scored"),
    }
}
