pub mod rules;

pub use rules::{AccessPolicy, VoteVisibility};
