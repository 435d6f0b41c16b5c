//! JSON codec for the ticket service's response envelope and request bodies.
//!
//! Every response is wrapped as `{"success": bool, "message": str, "data": T}`.
//! Transports decode bodies here so the board sees typed values only.

use crate::{
    backend::{StatusUpdate, TicketGroups},
    domain::{StatusCode, StatusDefinition, UserId},
    error::{BoardError, Result},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload; an explicit `success: false` becomes an error
    pub fn into_data(self) -> Result<Option<T>> {
        if self.success == Some(false) {
            return Err(BoardError::Backend(
                self.message
                    .unwrap_or_else(|| "request rejected".to_string()),
            ));
        }
        Ok(self.data)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<Option<T>> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    envelope.into_data()
}

/// Decodes the status catalogue; a missing `data` is an empty catalogue
pub fn decode_statuses(body: &str) -> Result<Vec<StatusDefinition>> {
    Ok(decode(body)?.unwrap_or_default())
}

/// Decodes grouped tickets; a missing `data` means no tickets
pub fn decode_ticket_groups(body: &str) -> Result<TicketGroups> {
    Ok(decode(body)?.unwrap_or_default())
}

/// Extracts the message of an error response, if the body carries one
pub fn decode_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
}

/// Body of `PATCH /ticket/{id}/estado`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateBody {
    #[serde(rename = "nuevoEstado")]
    pub new_status: StatusCode,
    #[serde(rename = "idUsuario")]
    pub acting_user: UserId,
}

impl From<&StatusUpdate> for StatusUpdateBody {
    fn from(update: &StatusUpdate) -> Self {
        Self {
            new_status: update.new_status,
            acting_user: update.acting_user,
        }
    }
}

/// Relative path of the status update endpoint
pub fn status_update_path(update: &StatusUpdate) -> String {
    format!("/ticket/{}/estado", update.ticket_id)
}

pub fn encode_status_update(update: &StatusUpdate) -> Result<String> {
    Ok(serde_json::to_string(&StatusUpdateBody::from(update))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TicketId;

    #[test]
    fn test_decode_statuses() {
        let body = r#"{
            "success": true,
            "message": "ok",
            "data": [
                {"idEstado": 1, "descripcionEstado": "Abierto"},
                {"idEstado": 2, "descripcionEstado": "En Revisión"}
            ]
        }"#;

        let statuses = decode_statuses(body).unwrap();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[1], StatusDefinition::new(2, "En Revisión"));
    }

    #[test]
    fn test_missing_data_decodes_empty() {
        assert!(decode_statuses(r#"{"success": true}"#).unwrap().is_empty());
        assert!(decode_ticket_groups(r#"{"data": null}"#).unwrap().is_empty());
        assert!(decode_ticket_groups("{}").unwrap().is_empty());
    }

    #[test]
    fn test_generic_envelope_without_data() {
        let envelope: Envelope<Vec<StatusDefinition>> =
            serde_json::from_str(r#"{"message": "sin datos"}"#).unwrap();
        assert!(envelope.success.is_none());
        assert_eq!(envelope.message.as_deref(), Some("sin datos"));
        assert!(envelope.into_data().unwrap().is_none());
    }

    #[test]
    fn test_decode_ticket_groups() {
        let body = r#"{"data": {
            "abierto ": [{"idTicket": 1, "estado": 1, "titulo": "A"}],
            "Cerrado": []
        }}"#;

        let groups = decode_ticket_groups(body).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["abierto "][0].id, TicketId(1));
        assert!(groups["Cerrado"].is_empty());
    }

    #[test]
    fn test_malformed_body_is_serialization_error() {
        let result = decode_statuses(r#"{"data": [{"idEstado": "x"}]}"#);
        assert!(matches!(result, Err(BoardError::SerializationError(_))));

        assert!(decode_ticket_groups("not json").is_err());
    }

    #[test]
    fn test_rejected_envelope_is_backend_error() {
        let result = decode_statuses(r#"{"success": false, "message": "Token expirado"}"#);
        match result {
            Err(BoardError::Backend(message)) => assert_eq!(message, "Token expirado"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_message() {
        assert_eq!(
            decode_error_message(r#"{"success": false, "message": "No autorizado"}"#),
            Some("No autorizado".to_string())
        );
        assert_eq!(decode_error_message("<html>"), None);
    }

    #[test]
    fn test_encode_status_update() {
        let update = StatusUpdate {
            ticket_id: TicketId(12),
            new_status: StatusCode(4),
            acting_user: UserId(7),
        };

        assert_eq!(status_update_path(&update), "/ticket/12/estado");

        let body: serde_json::Value =
            serde_json::from_str(&encode_status_update(&update).unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"nuevoEstado": 4, "idUsuario": 7}));
    }
}
