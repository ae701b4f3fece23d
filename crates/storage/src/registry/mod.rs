use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::dto::{CreateCompetitionRequest, SubmitVoteRequest};
use crate::error::Result;
use crate::events::RegistryEvent;
use crate::models::{Competition, CompetitionId, Counts, Identity, Vote, VoteId};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRegistry;
pub use postgres::PgRegistry;

/// The competition and vote state machine.
///
/// Every mutating operation validates completely before changing anything, so
/// a rejected call leaves the registry untouched. Implementations serialize
/// mutations that touch the same competition.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Create a competition organized by `caller`. The returned record
    /// carries the newly allocated id.
    async fn create_competition(
        &self,
        caller: &Identity,
        request: &CreateCompetitionRequest,
    ) -> Result<Competition>;

    /// Cast `caller`'s single vote on a competition.
    async fn submit_vote(
        &self,
        caller: &Identity,
        competition_id: CompetitionId,
        request: &SubmitVoteRequest,
    ) -> Result<Vote>;

    /// Flip the active flag. Organizer only.
    async fn toggle_competition_status(
        &self,
        caller: &Identity,
        competition_id: CompetitionId,
    ) -> Result<Competition>;

    /// Force a competition inactive. Registry owner only.
    async fn deactivate_competition(
        &self,
        caller: &Identity,
        competition_id: CompetitionId,
    ) -> Result<Competition>;

    /// Active competitions `caller` neither organizes nor has voted on,
    /// ascending by id.
    async fn competitions_for_voting(&self, caller: &Identity) -> Result<Vec<Competition>>;

    /// Competitions created by `caller`, in creation order.
    async fn organized_competitions(&self, caller: &Identity) -> Result<Vec<Competition>>;

    /// Votes for a competition in submission order, subject to the vote
    /// visibility policy.
    async fn competition_votes(
        &self,
        caller: Option<&Identity>,
        competition_id: CompetitionId,
    ) -> Result<Vec<Vote>>;

    async fn competition(&self, competition_id: CompetitionId) -> Result<Competition>;

    /// A single vote, subject to the same visibility policy as listing.
    async fn vote(&self, caller: Option<&Identity>, vote_id: VoteId) -> Result<Vote>;

    async fn has_voted(&self, voter: &Identity, competition_id: CompetitionId) -> Result<bool>;

    async fn counts(&self) -> Result<Counts>;

    fn subscribe(&self) -> broadcast::Receiver<RegistryEvent>;
}
