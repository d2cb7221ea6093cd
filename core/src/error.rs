//! Error types for the truck API client.
//!
//! # Design
//! Every failure a view can surface collapses into `ApiError`, and every
//! variant yields a single human-readable line through `message()`. For
//! non-2xx responses the message comes from the body's `error` field, then
//! `detail`, then a status-coded fallback.

use thiserror::Error;

use crate::http::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The host could not reach the backend.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The server returned a non-2xx status. `message` is already the
    /// user-facing text extracted from the body.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A truck lookup by id found nothing in the listing.
    #[error("truck not found")]
    NotFound,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Text shown in the inline error banner.
    pub fn message(&self) -> String {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            ApiError::NotFound => "Caminhão não encontrado.".to_string(),
            ApiError::Transport(e) => format!("Falha de comunicação com a API: {e}"),
            ApiError::Deserialization(_) => "Resposta inválida da API.".to_string(),
            ApiError::Serialization(e) => format!("Erro ao montar requisição: {e}"),
        }
    }

    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        ApiError::Http {
            status,
            message: extract_message(body).unwrap_or_else(|| format!("Erro ao chamar API ({status})")),
        }
    }
}

/// Pull `error`, then `detail`, out of a JSON object body. Empty strings,
/// nulls and `false` count as absent; other non-string values are rendered
/// as JSON text.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    ["error", "detail"]
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(|field| match field {
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            other => Some(other.to_string()),
        })
}
