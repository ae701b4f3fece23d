use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::SubmitVoteRequest;
use crate::error::{RegistryError, Result};
use crate::models::{Competition, Identity};

/// Checks a vote against an existing competition in the order callers observe:
/// inactive, self-vote, duplicate, then the request itself.
pub fn check_vote(
    competition: &Competition,
    voter: &Identity,
    already_voted: bool,
    request: &SubmitVoteRequest,
) -> Result<()> {
    if !competition.is_active {
        return Err(RegistryError::Inactive(competition.id));
    }
    if competition.is_organized_by(voter) {
        return Err(RegistryError::Forbidden(
            "organizers cannot vote on their own competition".to_string(),
        ));
    }
    if already_voted {
        return Err(RegistryError::DuplicateVote(competition.id));
    }
    request.validate()?;
    Ok(())
}

pub fn check_organizer(competition: &Competition, caller: &Identity) -> Result<()> {
    if competition.is_organized_by(caller) {
        Ok(())
    } else {
        Err(RegistryError::Forbidden(
            "only the organizer can change competition status".to_string(),
        ))
    }
}

/// Who may read the individual votes of a competition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteVisibility {
    /// Anyone, authenticated or not.
    Public,
    /// Only the competition organizer and the registry owner.
    #[default]
    Restricted,
}

impl FromStr for VoteVisibility {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "restricted" => Ok(Self::Restricted),
            other => Err(RegistryError::InvalidInput(format!(
                "unknown vote visibility '{other}', expected 'public' or 'restricted'"
            ))),
        }
    }
}

impl fmt::Display for VoteVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Restricted => f.write_str("restricted"),
        }
    }
}

/// Privilege settings that sit outside the per-competition organizer checks.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    pub owner: Option<Identity>,
    pub vote_visibility: VoteVisibility,
}

impl AccessPolicy {
    pub fn new(owner: Option<Identity>, vote_visibility: VoteVisibility) -> Self {
        Self {
            owner,
            vote_visibility,
        }
    }

    pub fn is_owner(&self, identity: &Identity) -> bool {
        self.owner.as_ref() == Some(identity)
    }

    pub fn check_owner(&self, caller: &Identity) -> Result<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(RegistryError::Forbidden(
                "registry owner privilege required".to_string(),
            ))
        }
    }

    pub fn check_can_view_votes(
        &self,
        caller: Option<&Identity>,
        competition: &Competition,
    ) -> Result<()> {
        match self.vote_visibility {
            VoteVisibility::Public => Ok(()),
            VoteVisibility::Restricted => match caller {
                Some(caller) if competition.is_organized_by(caller) || self.is_owner(caller) => {
                    Ok(())
                }
                _ => Err(RegistryError::Forbidden(
                    "votes are visible to the organizer and registry owner only".to_string(),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity(name: &str) -> Identity {
        Identity::new(name).unwrap()
    }

    fn competition(organizer: &str, is_active: bool) -> Competition {
        Competition {
            id: 7,
            title: "Cup".into(),
            description: "Finals".into(),
            game_type: "MOBA".into(),
            organizer: identity(organizer),
            created_at: Utc::now(),
            vote_count: 0,
            is_active,
        }
    }

    #[test]
    fn test_inactive_wins_over_every_other_failure() {
        let c = competition("alice", false);
        let err = check_vote(&c, &identity("alice"), true, &SubmitVoteRequest::new(true, 0))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Inactive(7)));
    }

    #[test]
    fn test_self_vote_is_forbidden_regardless_of_rating() {
        let c = competition("alice", true);
        for rating in [0, 3, 9] {
            let err = check_vote(&c, &identity("alice"), false, &SubmitVoteRequest::new(true, rating))
                .unwrap_err();
            assert!(matches!(err, RegistryError::Forbidden(_)));
        }
    }

    #[test]
    fn test_duplicate_checked_before_rating() {
        let c = competition("alice", true);
        let err = check_vote(&c, &identity("bob"), true, &SubmitVoteRequest::new(true, 6))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateVote(7)));
    }

    #[test]
    fn test_rating_checked_last() {
        let c = competition("alice", true);
        let err = check_vote(&c, &identity("bob"), false, &SubmitVoteRequest::new(true, 6))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidInput(_)));
        assert!(check_vote(&c, &identity("bob"), false, &SubmitVoteRequest::new(true, 5)).is_ok());
    }

    #[test]
    fn test_only_organizer_passes_organizer_check() {
        let c = competition("alice", true);
        assert!(check_organizer(&c, &identity("alice")).is_ok());
        assert!(matches!(
            check_organizer(&c, &identity("bob")),
            Err(RegistryError::Forbidden(_))
        ));
    }

    #[test]
    fn test_owner_check() {
        let policy = AccessPolicy::new(Some(identity("root")), VoteVisibility::Public);
        assert!(policy.check_owner(&identity("root")).is_ok());
        assert!(policy.check_owner(&identity("alice")).is_err());
        assert!(AccessPolicy::default().check_owner(&identity("root")).is_err());
    }

    #[test]
    fn test_restricted_visibility() {
        let policy = AccessPolicy::new(Some(identity("root")), VoteVisibility::Restricted);
        let c = competition("alice", true);
        assert!(policy.check_can_view_votes(Some(&identity("alice")), &c).is_ok());
        assert!(policy.check_can_view_votes(Some(&identity("root")), &c).is_ok());
        assert!(policy.check_can_view_votes(Some(&identity("bob")), &c).is_err());
        assert!(policy.check_can_view_votes(None, &c).is_err());
    }

    #[test]
    fn test_public_visibility() {
        let policy = AccessPolicy::new(None, VoteVisibility::Public);
        let c = competition("alice", true);
        assert!(policy.check_can_view_votes(None, &c).is_ok());
        assert!(policy.check_can_view_votes(Some(&identity("bob")), &c).is_ok());
    }

    #[test]
    fn test_parse_vote_visibility() {
        assert_eq!("public".parse::<VoteVisibility>().unwrap(), VoteVisibility::Public);
        assert_eq!(
            " Restricted ".parse::<VoteVisibility>().unwrap(),
            VoteVisibility::Restricted
        );
        assert!("everyone".parse::<VoteVisibility>().is_err());
        assert_eq!(VoteVisibility::default(), VoteVisibility::Restricted);
    }
}
