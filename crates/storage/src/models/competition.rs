use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::Identity;

pub type CompetitionId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub id: CompetitionId,
    pub title: String,
    pub description: String,
    pub game_type: String,
    pub organizer: Identity,
    pub created_at: DateTime<Utc>,
    pub vote_count: i64,
    pub is_active: bool,
}

impl Competition {
    pub fn is_organized_by(&self, identity: &Identity) -> bool {
        &self.organizer == identity
    }
}
