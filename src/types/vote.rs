use serde::{Deserialize, Serialize};

/// Outcome of a ledger toggle. The ledger row itself ("voter V currently
/// has a vote on question Q") lives only in the store, keyed uniquely by
/// (question, voter); clients only ever see the state a toggle produced
/// together with the counter value from the same atomic unit.
#[derive(Serialize, Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct VoteState {
    pub voted: bool,
    pub upvotes_count: i32,
}
