use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request payload for casting a vote.
///
/// `rating` accepts any JSON number. Values that are not a whole number in
/// `i64` range decode to [`RATING_OUT_OF_RANGE`], so they are reported as
/// invalid input by validation rather than failing to decode.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitVoteRequest {
    pub choice: bool,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[serde(deserialize_with = "deserialize_rating")]
    pub rating: i64,

    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    #[serde(default)]
    pub comment: Option<String>,
}

impl SubmitVoteRequest {
    pub fn new(choice: bool, rating: i64) -> Self {
        Self {
            choice,
            rating,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// The comment as stored: trimmed, with blank comments dropped.
    pub fn stored_comment(&self) -> Option<String> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
    }
}

/// Rating used for numbers that cannot be represented exactly.
pub const RATING_OUT_OF_RANGE: i64 = i64::MAX;

fn deserialize_rating<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct RatingVisitor;

    impl Visitor<'_> for RatingVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            Ok(i64::try_from(v).unwrap_or(RATING_OUT_OF_RANGE))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            // 2^63 itself is out of range, hence the strict upper bound.
            let whole = v.is_finite() && v.fract() == 0.0;
            if whole && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Ok(RATING_OUT_OF_RANGE)
            }
        }
    }

    deserializer.deserialize_any(RatingVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MAX_RATING, MIN_RATING};

    #[test]
    fn test_rating_bounds() {
        for rating in MIN_RATING..=MAX_RATING {
            assert!(SubmitVoteRequest::new(true, rating).validate().is_ok());
        }
        for rating in [i64::MIN, -1, MIN_RATING - 1, MAX_RATING + 1, 255, 256] {
            assert!(SubmitVoteRequest::new(true, rating).validate().is_err());
        }
    }

    #[test]
    fn test_any_json_number_decodes_as_rating() {
        let rating = |json: &str| {
            serde_json::from_str::<SubmitVoteRequest>(&format!(
                r#"{{"choice": true, "rating": {json}}}"#
            ))
            .unwrap()
            .rating
        };

        assert_eq!(rating("4"), 4);
        assert_eq!(rating("-3"), -3);
        assert_eq!(rating("3.0"), 3);
        assert_eq!(rating("2.5"), RATING_OUT_OF_RANGE);
        assert_eq!(rating("1e20"), RATING_OUT_OF_RANGE);
        assert_eq!(rating("100000000000000000000"), RATING_OUT_OF_RANGE);
        assert_eq!(rating("18446744073709551615"), RATING_OUT_OF_RANGE);
    }

    #[test]
    fn test_out_of_range_number_fails_validation() {
        let req: SubmitVoteRequest =
            serde_json::from_str(r#"{"choice": true, "rating": 2.5}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_non_numeric_rating_fails_to_decode() {
        assert!(serde_json::from_str::<SubmitVoteRequest>(r#"{"choice": true, "rating": "3"}"#).is_err());
    }

    #[test]
    fn test_comment_is_optional_when_deserializing() {
        let req: SubmitVoteRequest =
            serde_json::from_str(r#"{"choice": false, "rating": 2}"#).unwrap();
        assert!(!req.choice);
        assert_eq!(req.rating, 2);
        assert!(req.comment.is_none());
    }

    #[test]
    fn test_blank_comment_is_not_stored() {
        let req = SubmitVoteRequest::new(true, 3).with_comment("   ");
        assert_eq!(req.stored_comment(), None);

        let req = SubmitVoteRequest::new(true, 3).with_comment(" great match ");
        assert_eq!(req.stored_comment().as_deref(), Some("great match"));
    }

    #[test]
    fn test_overlong_comment_is_rejected() {
        let req = SubmitVoteRequest::new(true, 3).with_comment("a".repeat(501));
        assert!(req.validate().is_err());
    }
}
