//! Notifications emitted by the registry after every accepted mutation.
//!
//! Events are fire-and-forget: publishing never fails, and subscribers that
//! fall more than [`DEFAULT_CAPACITY`] events behind observe
//! `RecvError::Lagged` and skip ahead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::models::{Competition, CompetitionId, Identity, Vote, VoteId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    CompetitionCreated {
        competition_id: CompetitionId,
        organizer: Identity,
        title: String,
        game_type: String,
        at: DateTime<Utc>,
    },
    /// Choice and rating are not broadcast.
    VoteSubmitted {
        vote_id: VoteId,
        competition_id: CompetitionId,
        voter: Identity,
        at: DateTime<Utc>,
    },
    CompetitionStatusChanged {
        competition_id: CompetitionId,
        is_active: bool,
        changed_by: Identity,
        at: DateTime<Utc>,
    },
}

impl RegistryEvent {
    pub fn competition_created(competition: &Competition) -> Self {
        Self::CompetitionCreated {
            competition_id: competition.id,
            organizer: competition.organizer.clone(),
            title: competition.title.clone(),
            game_type: competition.game_type.clone(),
            at: competition.created_at,
        }
    }

    pub fn vote_submitted(vote: &Vote) -> Self {
        Self::VoteSubmitted {
            vote_id: vote.id,
            competition_id: vote.competition_id,
            voter: vote.voter.clone(),
            at: vote.cast_at,
        }
    }

    pub fn status_changed(competition: &Competition, changed_by: &Identity) -> Self {
        Self::CompetitionStatusChanged {
            competition_id: competition.id,
            is_active: competition.is_active,
            changed_by: changed_by.clone(),
            at: Utc::now(),
        }
    }

    /// Event name, identical to the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CompetitionCreated { .. } => "competition_created",
            Self::VoteSubmitted { .. } => "vote_submitted",
            Self::CompetitionStatusChanged { .. } => "competition_status_changed",
        }
    }

    pub fn competition_id(&self) -> CompetitionId {
        match self {
            Self::CompetitionCreated { competition_id, .. }
            | Self::VoteSubmitted { competition_id, .. }
            | Self::CompetitionStatusChanged { competition_id, .. } => *competition_id,
        }
    }
}

pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out of [`RegistryEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RegistryEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: RegistryEvent) {
        tracing::debug!(
            event = event.name(),
            competition_id = event.competition_id(),
            "publishing registry event"
        );
        // Zero receivers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competition() -> Competition {
        Competition {
            id: 3,
            title: "Cup".into(),
            description: "Finals".into(),
            game_type: "MOBA".into(),
            organizer: Identity::new("alice").unwrap(),
            created_at: Utc::now(),
            vote_count: 0,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let c = competition();
        let bob = Identity::new("bob").unwrap();

        bus.publish(RegistryEvent::competition_created(&c));
        bus.publish(RegistryEvent::status_changed(&c, &bob));

        assert_eq!(rx.recv().await.unwrap().name(), "competition_created");
        assert_eq!(rx.recv().await.unwrap().name(), "competition_status_changed");
    }

    #[test]
    fn test_publish_without_subscribers() {
        EventBus::default().publish(RegistryEvent::competition_created(&competition()));
    }

    #[test]
    fn test_serialized_tag_matches_name() {
        let event = RegistryEvent::competition_created(&competition());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
        assert_eq!(json["competition_id"], 3);
        assert_eq!(json["organizer"], "alice");
    }

    #[test]
    fn test_vote_event_omits_choice_and_rating() {
        let vote = Vote {
            id: 1,
            competition_id: 3,
            voter: Identity::new("bob").unwrap(),
            choice: true,
            rating: 5,
            comment: Some("gg".into()),
            cast_at: Utc::now(),
        };
        let json = serde_json::to_value(RegistryEvent::vote_submitted(&vote)).unwrap();
        assert!(json.get("choice").is_none());
        assert!(json.get("rating").is_none());
        assert_eq!(json["vote_id"], 1);
    }
}
