//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted participant name.
const MAX_NAME_LENGTH: usize = 32;

/// Validates that a participant name is non-blank and reasonably short.
///
/// # Examples
///
/// ```ignore
/// validate_player_name("alice")  // Ok
/// validate_player_name("   ")    // Err - blank
/// ```
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("player_name_blank");
        err.message = Some("Participant name must not be blank".into());
        return Err(err);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("player_name_length");
        err.message = Some(
            format!(
                "Participant name must be at most {} characters",
                MAX_NAME_LENGTH
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_name_valid() {
        assert!(validate_player_name("alice").is_ok());
        assert!(validate_player_name("Player One").is_ok());
        assert!(validate_player_name("x").is_ok());
    }

    #[test]
    fn test_validate_player_name_blank() {
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name("   ").is_err());
        assert!(validate_player_name("\t\n").is_err());
    }

    #[test]
    fn test_validate_player_name_too_long() {
        let name = "a".repeat(33);
        assert!(validate_player_name(&name).is_err());
        let name = "a".repeat(32);
        assert!(validate_player_name(&name).is_ok());
    }
}
