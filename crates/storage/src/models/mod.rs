pub mod competition;
pub mod identity;
pub mod vote;

pub use competition::{Competition, CompetitionId};
pub use identity::Identity;
pub use vote::{Counts, MAX_RATING, MIN_RATING, Vote, VoteId};
