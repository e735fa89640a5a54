//! Error types for workout construction, the store and persistence

/// Bad user input. Recovered locally: the form stays open and nothing is mutated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NonNumeric { field: &'static str },

    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("{field} must be a whole number")]
    NotWhole { field: &'static str },

    #[error("coordinates out of range: {lat}, {lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
}

impl ValidationError {
    /// Short machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NonNumeric { .. } => "non-numeric",
            ValidationError::NonPositive { .. } => "non-positive",
            ValidationError::NotWhole { .. } => "not-whole",
            ValidationError::InvalidCoordinates { .. } => "invalid-coordinates",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("workout id already present: {0}")]
    DuplicateId(String),
}

/// Durable data could not be read. Callers fall back to an empty store.
#[derive(Debug, thiserror::Error)]
pub enum StorageReadError {
    #[error("storage backend failed: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("stored workouts are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("current location unavailable: {reason}")]
pub struct LocationUnavailable {
    pub reason: String,
}

impl LocationUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Failure of a form submission
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("pick a location on the map first")]
    NoPendingLocation,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_codes() {
        assert_eq!(ValidationError::NonNumeric { field: "distance" }.code(), "non-numeric");
        assert_eq!(ValidationError::NonPositive { field: "duration" }.code(), "non-positive");
        assert_eq!(ValidationError::NotWhole { field: "cadence" }.code(), "not-whole");
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = ValidationError::NonPositive { field: "distance" };
        assert_eq!(err.to_string(), "distance must be positive");
    }

    #[test]
    fn test_session_error_is_transparent() {
        let err = SessionError::from(ValidationError::NonNumeric { field: "cadence" });
        assert_eq!(err.to_string(), "cadence must be a finite number");
    }
}
