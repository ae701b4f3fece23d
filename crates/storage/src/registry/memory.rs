use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{RwLock, broadcast};
use validator::Validate;

use crate::dto::{CreateCompetitionRequest, SubmitVoteRequest};
use crate::error::{RegistryError, Result};
use crate::events::{EventBus, RegistryEvent};
use crate::models::{Competition, CompetitionId, Counts, Identity, Vote, VoteId};
use crate::services::rules::{self, AccessPolicy};

use super::Registry;

/// Registry state. Ids are dense and never reused, so record `n` lives at
/// index `n - 1`.
#[derive(Debug, Default)]
struct State {
    competitions: Vec<Competition>,
    votes: Vec<Vote>,
    votes_by_competition: HashMap<CompetitionId, Vec<VoteId>>,
    competitions_by_organizer: HashMap<Identity, Vec<CompetitionId>>,
    voters_by_competition: HashMap<CompetitionId, HashSet<Identity>>,
}

fn slot(id: i64) -> Option<usize> {
    id.checked_sub(1).and_then(|i| usize::try_from(i).ok())
}

impl State {
    fn competition_slot(&self, id: CompetitionId) -> Result<usize> {
        slot(id)
            .filter(|&i| i < self.competitions.len())
            .ok_or(RegistryError::CompetitionNotFound(id))
    }

    fn competition(&self, id: CompetitionId) -> Result<&Competition> {
        let i = self.competition_slot(id)?;
        Ok(&self.competitions[i])
    }

    fn vote(&self, id: VoteId) -> Result<&Vote> {
        slot(id)
            .and_then(|i| self.votes.get(i))
            .ok_or(RegistryError::VoteNotFound(id))
    }

    fn has_voted(&self, voter: &Identity, competition_id: CompetitionId) -> bool {
        self.voters_by_competition
            .get(&competition_id)
            .is_some_and(|voters| voters.contains(voter))
    }

    fn next_competition_id(&self) -> CompetitionId {
        self.competitions.len() as CompetitionId + 1
    }

    fn next_vote_id(&self) -> VoteId {
        self.votes.len() as VoteId + 1
    }
}

/// Registry held entirely in process memory behind a single lock.
pub struct MemoryRegistry {
    state: RwLock<State>,
    policy: AccessPolicy,
    events: EventBus,
}

impl MemoryRegistry {
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            state: RwLock::new(State::default()),
            policy,
            events: EventBus::default(),
        }
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new(AccessPolicy::default())
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn create_competition(
        &self,
        caller: &Identity,
        request: &CreateCompetitionRequest,
    ) -> Result<Competition> {
        let request = request.trimmed();
        request.validate()?;

        let mut state = self.state.write().await;
        let competition = Competition {
            id: state.next_competition_id(),
            title: request.title,
            description: request.description,
            game_type: request.game_type,
            organizer: caller.clone(),
            created_at: Utc::now(),
            vote_count: 0,
            is_active: true,
        };

        state.competitions.push(competition.clone());
        state
            .competitions_by_organizer
            .entry(caller.clone())
            .or_default()
            .push(competition.id);

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
        let mut state = self.state.write().await;

        let index = state.competition_slot(competition_id)?;
        let already_voted = state.has_voted(caller, competition_id);
        if let Err(err) =
            rules::check_vote(&state.competitions[index], caller, already_voted, request)
        {
            tracing::debug!(competition_id, voter = %caller, error = %err, "vote rejected");
            return Err(err);
        }

        let rating = i16::try_from(request.rating)
            .map_err(|_| RegistryError::InvalidInput("rating out of range".to_string()))?;
        let vote = Vote {
            id: state.next_vote_id(),
            competition_id,
            voter: caller.clone(),
            choice: request.choice,
            rating,
            comment: request.stored_comment(),
            cast_at: Utc::now(),
        };

        state.votes.push(vote.clone());
        state
            .votes_by_competition
            .entry(competition_id)
            .or_default()
            .push(vote.id);
        state
            .voters_by_competition
            .entry(competition_id)
            .or_default()
            .insert(caller.clone());
        state.competitions[index].vote_count += 1;

        tracing::info!(
            vote_id = vote.id,
            competition_id,
            voter = %caller,
            vote_count = state.competitions[index].vote_count,
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
        let mut state = self.state.write().await;

        let index = state.competition_slot(competition_id)?;
        rules::check_organizer(&state.competitions[index], caller)?;

        let competition = &mut state.competitions[index];
        competition.is_active = !competition.is_active;
        let competition = competition.clone();

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
        let mut state = self.state.write().await;

        let index = state.competition_slot(competition_id)?;
        self.policy.check_owner(caller)?;

        let competition = &mut state.competitions[index];
        if !competition.is_active {
            tracing::debug!(competition_id, "competition already inactive");
            return Ok(competition.clone());
        }
        competition.is_active = false;
        let competition = competition.clone();

        tracing::info!(competition_id, owner = %caller, "competition deactivated");
        self.events
            .publish(RegistryEvent::status_changed(&competition, caller));

        Ok(competition)
    }

    async fn competitions_for_voting(&self, caller: &Identity) -> Result<Vec<Competition>> {
        let state = self.state.read().await;

        Ok(state
            .competitions
            .iter()
            .filter(|c| {
                c.is_active && !c.is_organized_by(caller) && !state.has_voted(caller, c.id)
            })
            .cloned()
            .collect())
    }

    async fn organized_competitions(&self, caller: &Identity) -> Result<Vec<Competition>> {
        let state = self.state.read().await;

        let Some(ids) = state.competitions_by_organizer.get(caller) else {
            return Ok(Vec::new());
        };
        ids.iter()
            .map(|&id| state.competition(id).cloned())
            .collect()
    }

    async fn competition_votes(
        &self,
        caller: Option<&Identity>,
        competition_id: CompetitionId,
    ) -> Result<Vec<Vote>> {
        let state = self.state.read().await;

        let competition = state.competition(competition_id)?;
        self.policy.check_can_view_votes(caller, competition)?;

        let Some(ids) = state.votes_by_competition.get(&competition_id) else {
            return Ok(Vec::new());
        };
        ids.iter().map(|&id| state.vote(id).cloned()).collect()
    }

    async fn competition(&self, competition_id: CompetitionId) -> Result<Competition> {
        let state = self.state.read().await;
        state.competition(competition_id).cloned()
    }

    async fn vote(&self, caller: Option<&Identity>, vote_id: VoteId) -> Result<Vote> {
        let state = self.state.read().await;

        let vote = state.vote(vote_id)?;
        let competition = state.competition(vote.competition_id)?;
        self.policy.check_can_view_votes(caller, competition)?;

        Ok(vote.clone())
    }

    async fn has_voted(&self, voter: &Identity, competition_id: CompetitionId) -> Result<bool> {
        let state = self.state.read().await;
        state.competition(competition_id)?;
        Ok(state.has_voted(voter, competition_id))
    }

    async fn counts(&self) -> Result<Counts> {
        let state = self.state.read().await;
        Ok(Counts {
            total_competitions: state.competitions.len() as i64,
            total_votes: state.votes.len() as i64,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }
}
