use async_trait::async_trait;
use sqlx::PgConnection;
use tokio::sync::broadcast;
use validator::Validate;

use crate::Database;
use crate::dto::{CreateCompetitionRequest, SubmitVoteRequest};
use crate::error::{RegistryError, Result};
use crate::events::{EventBus, RegistryEvent};
use crate::models::{Competition, CompetitionId, Counts, Identity, Vote, VoteId};
use crate::services::rules::{self, AccessPolicy};

use super::Registry;

/// Registry persisted in PostgreSQL.
///
/// Mutations lock the competition row for the length of their transaction,
/// so checks and writes on one competition never interleave.
pub struct PgRegistry {
    db: Database,
    policy: AccessPolicy,
    events: EventBus,
}

impl PgRegistry {
    pub fn new(db: Database, policy: AccessPolicy) -> Self {
        Self {
            db,
            policy,
            events: EventBus::default(),
        }
    }

    async fn lock_competition(
        conn: &mut PgConnection,
        competition_id: CompetitionId,
    ) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(
            r#"
            SELECT id, title, description, game_type, organizer, created_at,
                   vote_count, is_active
            FROM competitions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(competition_id)
        .fetch_optional(conn)
        .await?
        .ok_or(RegistryError::CompetitionNotFound(competition_id))
    }

    async fn set_active(
        conn: &mut PgConnection,
        competition_id: CompetitionId,
        is_active: bool,
    ) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            UPDATE competitions
            SET is_active = $2
            WHERE id = $1
            RETURNING id, title, description, game_type, organizer, created_at,
                      vote_count, is_active
            "#,
        )
        .bind(competition_id)
        .bind(is_active)
        .fetch_one(conn)
        .await?;

        Ok(competition)
    }
}

#[async_trait]
impl Registry for PgRegistry {
    async fn create_competition(
        &self,
        caller: &Identity,
        request: &CreateCompetitionRequest,
    ) -> Result<Competition> {
        let request = request.trimmed();
        request.validate()?;

        let competition = sqlx::query_as::<_, Competition>(
            r#"
            INSERT INTO competitions (title, description, game_type, organizer)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, game_type, organizer, created_at,
                      vote_count, is_active
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.game_type)
        .bind(caller)
        .fetch_one(self.db.pool())
        .await?;

        tracing::info!(
            competition_id = competition.id,
            organizer = %caller,
            game_type = %competition.game_type,
            "competition created"
        );
        self.events
            .publish(RegistryEvent::competition_created(&competition));

        Ok(competition)
    }

    async fn submit_vote(
        &self,
        caller: &Identity,
        competition_id: CompetitionId,
        request: &SubmitVoteRequest,
    ) -> Result<Vote> {
        let mut tx = self.db.pool().begin().await?;

        let competition = Self::lock_competition(&mut tx, competition_id).await?;
        let already_voted: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM votes WHERE competition_id = $1 AND voter = $2
            )
            "#,
        )
        .bind(competition_id)
        .bind(caller)
        .fetch_one(&mut *tx)
        .await?;

        if let Err(err) = rules::check_vote(&competition, caller, already_voted, request) {
            tracing::debug!(competition_id, voter = %caller, error = %err, "vote rejected");
            return Err(err);
        }

        let rating = i16::try_from(request.rating)
            .map_err(|_| RegistryError::InvalidInput("rating out of range".to_string()))?;

        let vote = sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO votes (competition_id, voter, choice, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, competition_id, voter, choice, rating, comment, cast_at
            "#,
        )
        .bind(competition_id)
        .bind(caller)
        .bind(request.choice)
        .bind(rating)
        .bind(request.stored_comment())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let err = RegistryError::from(e);
            if err.is_unique_violation() {
                RegistryError::DuplicateVote(competition_id)
            } else {
                err
            }
        })?;

        sqlx::query("UPDATE competitions SET vote_count = vote_count + 1 WHERE id = $1")
            .bind(competition_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            vote_id = vote.id,
            competition_id,
            voter = %caller,
            "vote submitted"
        );
        self.events.publish(RegistryEvent::vote_submitted(&vote));

        Ok(vote)
    }

    async fn toggle_competition_status(
        &self,
        caller: &Identity,
        competition_id: CompetitionId,
    ) -> Result<Competition> {
        let mut tx = self.db.pool().begin().await?;

        let current = Self::lock_competition(&mut tx, competition_id).await?;
        rules::check_organizer(&current, caller)?;
        let competition = Self::set_active(&mut tx, competition_id, !current.is_active).await?;

        tx.commit().await?;

        tracing::info!(
            competition_id,
            is_active = competition.is_active,
            "competition status toggled"
        );
        self.events
            .publish(RegistryEvent::status_changed(&competition, caller));

        Ok(competition)
    }

    async fn deactivate_competition(
        &self,
        caller: &Identity,
        competition_id: CompetitionId,
    ) -> Result<Competition> {
        let mut tx = self.db.pool().begin().await?;

        let current = Self::lock_competition(&mut tx, competition_id).await?;
        self.policy.check_owner(caller)?;
        if !current.is_active {
            tracing::debug!(competition_id, "competition already inactive");
            return Ok(current);
        }
        let competition = Self::set_active(&mut tx, competition_id, false).await?;

        tx.commit().await?;

        tracing::info!(competition_id, owner = %caller, "competition deactivated");
        self.events
            .publish(RegistryEvent::status_changed(&competition, caller));

        Ok(competition)
    }

    async fn competitions_for_voting(&self, caller: &Identity) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(
            r#"
            SELECT c.id, c.title, c.description, c.game_type, c.organizer, c.created_at,
                   c.vote_count, c.is_active
            FROM competitions c
            WHERE c.is_active
              AND c.organizer <> $1
              AND NOT EXISTS (
                  SELECT 1 FROM votes v WHERE v.competition_id = c.id AND v.voter = $1
              )
            ORDER BY c.id
            "#,
        )
        .bind(caller)
        .fetch_all(self.db.pool())
        .await?;

        Ok(competitions)
    }

    async fn organized_competitions(&self, caller: &Identity) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(
            r#"
            SELECT id, title, description, game_type, organizer, created_at,
                   vote_count, is_active
            FROM competitions
            WHERE organizer = $1
            ORDER BY id
            "#,
        )
        .bind(caller)
        .fetch_all(self.db.pool())
        .await?;

        Ok(competitions)
    }

    async fn competition_votes(
        &self,
        caller: Option<&Identity>,
        competition_id: CompetitionId,
    ) -> Result<Vec<Vote>> {
        let competition = self.competition(competition_id).await?;
        self.policy.check_can_view_votes(caller, &competition)?;

        let votes = sqlx::query_as::<_, Vote>(
            r#"
            SELECT id, competition_id, voter, choice, rating, comment, cast_at
            FROM votes
            WHERE competition_id = $1
            ORDER BY id
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(votes)
    }

    async fn competition(&self, competition_id: CompetitionId) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(
            r#"
            SELECT id, title, description, game_type, organizer, created_at,
                   vote_count, is_active
            FROM competitions
            WHERE id = $1
            "#,
        )
        .bind(competition_id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or(RegistryError::CompetitionNotFound(competition_id))
    }

    async fn vote(&self, caller: Option<&Identity>, vote_id: VoteId) -> Result<Vote> {
        let vote = sqlx::query_as::<_, Vote>(
            r#"
            SELECT id, competition_id, voter, choice, rating, comment, cast_at
            FROM votes
            WHERE id = $1
            "#,
        )
        .bind(vote_id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or(RegistryError::VoteNotFound(vote_id))?;

        let competition = self.competition(vote.competition_id).await?;
        self.policy.check_can_view_votes(caller, &competition)?;

        Ok(vote)
    }

    async fn has_voted(&self, voter: &Identity, competition_id: CompetitionId) -> Result<bool> {
        self.competition(competition_id).await?;

        let has_voted = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM votes WHERE competition_id = $1 AND voter = $2
            )
            "#,
        )
        .bind(competition_id)
        .bind(voter)
        .fetch_one(self.db.pool())
        .await?;

        Ok(has_voted)
    }

    async fn counts(&self) -> Result<Counts> {
        let (total_competitions, total_votes): (i64, i64) = sqlx::query_as(
            r#"
            SELECT (SELECT COUNT(*) FROM competitions), (SELECT COUNT(*) FROM votes)
            "#,
        )
        .fetch_one(self.db.pool())
        .await?;

        Ok(Counts {
            total_competitions,
            total_votes,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }
}
