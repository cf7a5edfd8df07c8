use thiserror::Error;

use crate::validation::Violations;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Entity not found: {entity}")]
    NotFound { entity: String },

    #[error("Uniqueness conflict: {field}")]
    Uniqueness { field: String },

    #[error("Forbidden action")]
    Forbidden,

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    Validation(Violations),

    #[error("Authentication error: {reason}")]
    Authentication { reason: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl Error {
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound { entity: entity.into() }
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Single-field validation failure.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut violations = Violations::default();
        violations.push(field, reason);
        Self::Validation(violations)
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_field() {
        let err = Error::invalid("guardianInfo.name", "required");
        assert_eq!(err.to_string(), "Validation error: guardianInfo.name required");
    }

    #[test]
    fn transition_message() {
        let err = Error::invalid_transition("approved", "estimated");
        assert_eq!(
            err.to_string(),
            "Invalid state transition from approved to estimated"
        );
    }
}
