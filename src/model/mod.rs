pub mod ids;
pub mod raw;
pub mod tables;

pub use ids::Key;
pub use raw::{Constituency, Party, Province, RecordTable};
pub use tables::{CandidateVote, ConstituencySummary, PartyListCandidate};
