mod compose;
mod debounce;
mod vote;

pub use compose::ComposeSession;
pub use debounce::Debouncer;
pub use vote::{VoteOutcome, VoteSession};
