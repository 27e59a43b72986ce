use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_team_name,
    state::{
        adjustments::TeamAdjustment,
        game::GameState,
        play::PitchType,
        transitions::{ScoringEvent, StrikeKind},
    },
};

/// Payload creating the scoring document of a game when it does not exist yet.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InitScoringRequest {
    /// Home team name; the configured default when absent.
    #[serde(default)]
    #[validate(custom(function = "validate_team_name"))]
    pub home_name: Option<String>,
    /// Away team name; the configured default when absent.
    #[serde(default)]
    #[validate(custom(function = "validate_team_name"))]
    pub away_name: Option<String>,
}

/// Outcome of initializing a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct InitScoringResponse {
    /// False when the game already had a scoring document, which is left untouched.
    pub created: bool,
    /// Live state after the command.
    pub state: GameState,
}

/// Strike flavour as submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StrikeKindInput {
    /// Plain strike.
    #[default]
    Strike,
    /// Swinging strike.
    Swinging,
    /// Called strike.
    Called,
}

/// Scoring event as submitted by the scorer, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoringEventInput {
    /// Ball.
    Ball,
    /// Strike.
    Strike {
        /// Defaults to a plain strike.
        #[serde(default)]
        kind: StrikeKindInput,
    },
    /// Foul ball.
    Foul,
    /// Out, optionally described.
    Out {
        /// Shown as the play result; `Out` when blank.
        #[serde(default)]
        description: Option<String>,
    },
    /// Base hit.
    Hit {
        /// Bases reached by the batter, 1 to 4.
        bases: u8,
    },
    /// Base on balls.
    Walk,
    /// Hit by pitch.
    HitByPitch,
    /// Safe on an error, scored as a single.
    ReachedOnError,
    /// Fielder's choice, scored as a single.
    FieldersChoice,
    /// Manual run.
    Run,
}

impl From<ScoringEventInput> for ScoringEvent {
    fn from(value: ScoringEventInput) -> Self {
        match value {
            ScoringEventInput::Ball => ScoringEvent::Ball,
            ScoringEventInput::Strike { kind } => ScoringEvent::Strike(match kind {
                StrikeKindInput::Strike => StrikeKind::Generic,
                StrikeKindInput::Swinging => StrikeKind::Swinging,
                StrikeKindInput::Called => StrikeKind::Called,
            }),
            ScoringEventInput::Foul => ScoringEvent::Foul,
            ScoringEventInput::Out { description } => ScoringEvent::Out {
                description: description.filter(|text| !text.trim().is_empty()),
            },
            ScoringEventInput::Hit { bases } => ScoringEvent::Hit { bases },
            ScoringEventInput::Walk => ScoringEvent::Walk,
            ScoringEventInput::HitByPitch => ScoringEvent::HitByPitch,
            ScoringEventInput::ReachedOnError => ScoringEvent::ReachedOnError,
            ScoringEventInput::FieldersChoice => ScoringEvent::FieldersChoice,
            ScoringEventInput::Run => ScoringEvent::Run,
        }
    }
}

/// Apply one scoring event and log it.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoringEventRequest {
    /// What happened.
    pub event: ScoringEventInput,
    /// Roster id of the batter, credited with at-bats and hits.
    #[serde(default)]
    pub batter_id: Option<String>,
    /// Roster id of the pitcher, only used for the log.
    #[serde(default)]
    pub pitcher_id: Option<String>,
    /// Pitch classification stored with the play.
    #[serde(default)]
    pub pitch_type: Option<PitchType>,
}

impl Validate for ScoringEventRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let ScoringEventInput::Out {
            description: Some(description),
        } = &self.event
            && description.chars().count() > 80
        {
            let mut err = validator::ValidationError::new("description_length");
            err.message = Some("Out description must be at most 80 characters".into());
            errors.add("event", err);
        }

        for (field, id) in [("batterId", &self.batter_id), ("pitcherId", &self.pitcher_id)] {
            if id.as_deref().is_some_and(|id| id.trim().is_empty()) {
                let mut err = validator::ValidationError::new("blank_player_id");
                err.message = Some("Player id must not be blank".into());
                errors.add(field, err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// State after the event and the id of the logged play.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoringEventResponse {
    /// Live state after the command.
    pub state: GameState,
    /// Identifier of the appended play.
    pub play_id: String,
}

/// Outcome of an undo.
#[derive(Debug, Serialize, ToSchema)]
pub struct UndoResponse {
    /// False when the log was empty or the removed play carried no usable snapshot.
    pub restored: bool,
    /// Live state after the command.
    pub state: GameState,
}

/// Manual correction of one team line.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    /// New display name.
    #[serde(default)]
    #[validate(custom(function = "validate_team_name"))]
    pub name: Option<String>,
    /// Added to the score, floored at 0.
    #[serde(default)]
    #[validate(range(min = -99, max = 99))]
    pub score_delta: i32,
    /// Added to the errors, floored at 0.
    #[serde(default)]
    #[validate(range(min = -99, max = 99))]
    pub errors_delta: i32,
}

impl From<UpdateTeamRequest> for TeamAdjustment {
    fn from(value: UpdateTeamRequest) -> Self {
        Self {
            name: value.name.map(|name| name.trim().to_string()),
            score_delta: value.score_delta,
            errors_delta: value.errors_delta,
        }
    }
}

/// Live or finished flag.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    /// False once the game is over.
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let request: ScoringEventRequest = serde_json::from_value(json!({
            "event": { "type": "strike", "kind": "called" },
            "batterId": "p1",
            "pitchType": "Curveball"
        }))
        .unwrap();
        assert_eq!(
            ScoringEvent::from(request.event.clone()),
            ScoringEvent::Strike(StrikeKind::Called)
        );
        assert_eq!(request.batter_id.as_deref(), Some("p1"));
        assert_eq!(request.pitch_type, Some(PitchType::Curveball));
        assert!(request.validate().is_ok());

        let plain: ScoringEventInput = serde_json::from_value(json!({ "type": "strike" })).unwrap();
        assert_eq!(
            ScoringEvent::from(plain),
            ScoringEvent::Strike(StrikeKind::Generic)
        );

        let hit: ScoringEventInput =
            serde_json::from_value(json!({ "type": "hit", "bases": 2 })).unwrap();
        assert_eq!(ScoringEvent::from(hit), ScoringEvent::Hit { bases: 2 });
    }

    #[test]
    fn blank_out_description_falls_back_to_default() {
        let out: ScoringEventInput =
            serde_json::from_value(json!({ "type": "out", "description": "  " })).unwrap();
        assert_eq!(
            ScoringEvent::from(out),
            ScoringEvent::Out { description: None }
        );
    }

    #[test]
    fn blank_player_ids_are_rejected() {
        let request: ScoringEventRequest = serde_json::from_value(json!({
            "event": { "type": "ball" },
            "batterId": " "
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn team_update_validates_name_and_deltas() {
        let ok = UpdateTeamRequest {
            name: Some("Owls".into()),
            score_delta: -1,
            errors_delta: 0,
        };
        assert!(ok.validate().is_ok());

        let blank = UpdateTeamRequest {
            name: Some(" ".into()),
            ..UpdateTeamRequest::default()
        };
        assert!(blank.validate().is_err());

        let huge = UpdateTeamRequest {
            score_delta: 500,
            ..UpdateTeamRequest::default()
        };
        assert!(huge.validate().is_err());
    }
}
