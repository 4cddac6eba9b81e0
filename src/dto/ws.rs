use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

use crate::dto::validation::validate_player_name;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from participant WebSocket clients.
#[serde(tag = "type")]
pub enum PlayerInboundMessage {
    /// First message of a session, naming the participant.
    #[serde(rename = "identification")]
    Identification {
        /// Display name for the roster.
        name: String,
    },
    /// Any unrecognised message type.
    #[serde(other)]
    Unknown,
}

/// Error raised while parsing or validating an inbound socket message.
#[derive(Debug, thiserror::Error)]
pub enum InboundMessageError {
    /// The frame was not valid JSON for the message schema.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The message parsed but carried an invalid field.
    #[error("invalid message: {0}")]
    Invalid(#[from] ValidationError),
}

impl PlayerInboundMessage {
    /// Parse a raw text frame and validate its fields.
    pub fn from_json_str(raw: &str) -> Result<Self, InboundMessageError> {
        let message: Self = serde_json::from_str(raw)?;
        if let PlayerInboundMessage::Identification { name } = &message {
            validate_player_name(name)?;
        }
        Ok(message)
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Positive acknowledgement sent after successful identification.
pub struct PresenceAck {
    /// Name the session was registered under.
    pub name: String,
    /// Always `"connected"`.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identification_parses_and_validates() {
        let message = PlayerInboundMessage::from_json_str(
            r#"{"type":"identification","name":"alice"}"#,
        )
        .unwrap();
        match message {
            PlayerInboundMessage::Identification { name } => assert_eq!(name, "alice"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn blank_identification_name_is_rejected() {
        let err = PlayerInboundMessage::from_json_str(r#"{"type":"identification","name":" "}"#)
            .unwrap_err();
        assert!(matches!(err, InboundMessageError::Invalid(_)));
    }

    #[test]
    fn unknown_message_types_fall_through() {
        let message =
            PlayerInboundMessage::from_json_str(r#"{"type":"emote","name":"alice"}"#).unwrap();
        assert!(matches!(message, PlayerInboundMessage::Unknown));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            PlayerInboundMessage::from_json_str("not json"),
            Err(InboundMessageError::Malformed(_))
        ));
    }
}
