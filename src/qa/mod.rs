//! The community Q&A core: the vote ledger, the counter projector, the
//! answer acceptance coordinator and the question read lifecycle.
//!
//! Every piece of derived state on a question (`upvotes_count`,
//! `answers_count`, `solved`) is owned by these modules and mutated only
//! through the atomic store operations they call. Route handlers stay
//! thin and never touch counters or acceptance flags themselves.

pub mod acceptance;
pub mod counters;
pub mod ledger;
pub mod lifecycle;
