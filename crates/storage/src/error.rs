use thiserror::Error;
use validator::ValidationErrors;

use crate::models::{CompetitionId, VoteId};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Competition {0} not found")]
    CompetitionNotFound(CompetitionId),

    #[error("Vote {0} not found")]
    VoteNotFound(VoteId),

    #[error("Competition {0} is not active")]
    Inactive(CompetitionId),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Already voted on competition {0}")]
    DuplicateVote(CompetitionId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Caller-visible classification of a rejected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    InactiveResource,
    Forbidden,
    Conflict,
    Internal,
}

pub type Result<T> = std::result::Result<T, RegistryError>;

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::CompetitionNotFound(_) | Self::VoteNotFound(_) => ErrorKind::NotFound,
            Self::Inactive(_) => ErrorKind::InactiveResource,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::DuplicateVote(_) => ErrorKind::Conflict,
            Self::Database(_) | Self::Migration(_) => ErrorKind::Internal,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            RegistryError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }
}

impl From<ValidationErrors> for RegistryError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    )
                })
            })
            .collect();

        // HashMap iteration order is unstable
        messages.sort();

        Self::InvalidInput(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_kinds_cover_every_rejection() {
        assert_eq!(
            RegistryError::InvalidInput("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            RegistryError::CompetitionNotFound(1).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(RegistryError::VoteNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            RegistryError::Inactive(1).kind(),
            ErrorKind::InactiveResource
        );
        assert_eq!(
            RegistryError::Forbidden("x".into()).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(RegistryError::DuplicateVote(1).kind(), ErrorKind::Conflict);
        assert_eq!(
            RegistryError::Database(sqlx::Error::RowNotFound).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_validation_errors_become_invalid_input() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("blank");
        err.message = Some("Title must not be blank".into());
        errors.add("title", err);

        match RegistryError::from(errors) {
            RegistryError::InvalidInput(msg) => assert_eq!(msg, "title: Title must not be blank"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_row_not_found_is_not_a_unique_violation() {
        assert!(!RegistryError::Database(sqlx::Error::RowNotFound).is_unique_violation());
    }
}
