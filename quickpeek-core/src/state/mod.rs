//! Coordinator state
//!
//! Plain data guarded by the coordinator's locks: the command queue and
//! its flags, the vote masks, and the rules for legal request sequences.

pub mod machine;
pub mod queue;
pub mod votes;

pub use machine::{validate, SequencerPhase, ValidationError};
pub use queue::{CommandQueue, CoordinatorState, Enqueued, IDLE_WAITERS, QUEUE_DEPTH};
pub use votes::{Exchange, VoteState, VoterId, FULL_ENABLE_MASK};
