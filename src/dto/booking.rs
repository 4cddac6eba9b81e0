use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::validate_player_name;

/// Payload sent by a participant claiming a block.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClaimRequest {
    /// Display name of the claiming participant.
    pub name: String,
}

impl Validate for ClaimRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_player_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Confirmation returned for an accepted claim.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimResponse {
    /// Block that was claimed.
    pub block_id: u32,
    /// Participant the block now belongs to.
    pub owner: String,
}
