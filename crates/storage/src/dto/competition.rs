use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::CompetitionId;

/// Request payload for creating a new competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCompetitionRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Title must not be blank"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[validate(custom(
        function = "validate_not_blank",
        message = "Description must not be blank"
    ))]
    pub description: String,

    #[validate(length(max = 100, message = "Game type must be at most 100 characters"))]
    #[validate(custom(
        function = "validate_not_blank",
        message = "Game type must not be blank"
    ))]
    pub game_type: String,
}

impl CreateCompetitionRequest {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        game_type: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            game_type: game_type.into(),
        }
    }

    /// Copy of the request with surrounding whitespace removed, as stored.
    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            game_type: self.game_type.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HasVotedResponse {
    pub competition_id: CompetitionId,
    pub has_voted: bool,
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        Err(validator::ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request_passes() {
        let req = CreateCompetitionRequest::new("Cup", "Finals", "MOBA");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_whitespace_only_fields_are_rejected() {
        for req in [
            CreateCompetitionRequest::new("", "d", "g"),
            CreateCompetitionRequest::new("t", "   ", "g"),
            CreateCompetitionRequest::new("t", "d", "\t\n"),
        ] {
            assert!(req.validate().is_err(), "{req:?} should be rejected");
        }
    }

    #[test]
    fn test_overlong_title_is_rejected() {
        let req = CreateCompetitionRequest::new("x".repeat(201), "d", "g");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_trimmed_strips_whitespace() {
        let req = CreateCompetitionRequest::new(" Cup ", "Finals\n", " MOBA").trimmed();
        assert_eq!(req.title, "Cup");
        assert_eq!(req.description, "Finals");
        assert_eq!(req.game_type, "MOBA");
    }
}
