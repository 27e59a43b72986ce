//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_TEAM_NAME_LEN: usize = 40;
const MAX_GAME_ID_LEN: usize = 64;

/// Validates a team display name: not blank and at most 40 characters.
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("team_name_blank");
        err.message = Some("Team name must not be blank".into());
        return Err(err);
    }

    let len = name.chars().count();
    if len > MAX_TEAM_NAME_LEN {
        let mut err = ValidationError::new("team_name_length");
        err.message = Some(
            format!("Team name must be at most {MAX_TEAM_NAME_LEN} characters (got {len})").into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates a game identifier used as a document path segment.
///
/// ```ignore
/// validate_game_id("spring-league_07") // Ok
/// validate_game_id("a/b")              // Err - would escape its path segment
/// ```
pub fn validate_game_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_GAME_ID_LEN {
        let mut err = ValidationError::new("game_id_length");
        err.message = Some(
            format!("Game ID must be 1 to {MAX_GAME_ID_LEN} characters (got {})", id.len()).into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("game_id_format");
        err.message = Some("Game ID may only contain letters, digits, `-` and `_`".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_team_name() {
        assert!(validate_team_name("Owls").is_ok());
        assert!(validate_team_name("").is_err());
        assert!(validate_team_name("   ").is_err());
        assert!(validate_team_name(&"x".repeat(41)).is_err());
    }

    #[test]
    fn test_validate_game_id() {
        assert!(validate_game_id("spring-league_07").is_ok());
        assert!(validate_game_id("").is_err());
        assert!(validate_game_id("a/b").is_err()); // path separator
        assert!(validate_game_id("a b").is_err());
        assert!(validate_game_id(&"a".repeat(65)).is_err());
    }
}
