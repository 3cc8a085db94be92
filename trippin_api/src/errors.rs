//! Error types for the OData client.

/// Errors that can occur while building or executing OData requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A query referenced a property the entity type does not have, or used
    /// it in a position its kind does not allow. Raised while building.
    #[error("invalid query field `{field}` on {entity}: {reason}")]
    InvalidQueryField {
        entity: &'static str,
        field: String,
        reason: String,
    },
    /// A key lookup found no entity.
    #[error("{entity_set}({key}) not found")]
    EntityNotFound { entity_set: &'static str, key: String },
    /// The request never produced a response (connection, DNS, TLS or timeout).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// The payload was malformed or did not match the expected entity shape.
    #[error("failed to deserialize payload: {0}")]
    Deserialization(String),
    /// The service returned a non-success status with a body snippet.
    #[error("request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// A URL could not be built from the service root.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// The operation was cancelled before a response arrived.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn invalid_field(entity: &'static str, field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidQueryField {
            entity,
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
