use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{CompetitionId, Identity};

pub type VoteId = i64;

/// Lowest accepted rating.
pub const MIN_RATING: i64 = 1;
/// Highest accepted rating.
pub const MAX_RATING: i64 = 5;

/// A single immutable ballot cast against a competition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vote {
    pub id: VoteId,
    pub competition_id: CompetitionId,
    pub voter: Identity,
    /// `true` supports the competition, `false` opposes it.
    pub choice: bool,
    pub rating: i16,
    pub comment: Option<String>,
    pub cast_at: DateTime<Utc>,
}

/// Running totals of everything the registry has ever accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Counts {
    pub total_competitions: i64,
    pub total_votes: i64,
}
