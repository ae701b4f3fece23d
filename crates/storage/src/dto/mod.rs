pub mod competition;
pub mod vote;

pub use competition::{CreateCompetitionRequest, HasVotedResponse};
pub use vote::SubmitVoteRequest;
