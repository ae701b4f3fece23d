pub mod competitions;
pub mod events;
pub mod stats;
pub mod votes;
