use handle_errors::Error;

/// The denormalized counters kept on the question row so reads stay O(1).
/// The ledger (votes) and the answers table remain the source of truth;
/// these columns only ever move by signed deltas applied atomically in
/// the store, never by a read-modify-write cycle in a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Upvotes,
    Answers,
}

impl Counter {
    pub fn column(&self) -> &'static str {
        match self {
            Counter::Upvotes => "upvotes_count",
            Counter::Answers => "answers_count",
        }
    }
}

/// Apply a signed delta to a counter value, refusing to go below zero.
///
/// The ledger's own row-presence semantics already make a negative result
/// impossible; this guard is the projector's second line of defense and
/// rejects instead of clamping, so a broken atomic unit shows up as a
/// loud fault rather than silent corruption.
pub fn checked_apply(counter: Counter, current: i32, delta: i32) -> Result<i32, Error> {
    let next = current + delta;
    if next < 0 {
        return Err(Error::InvariantViolation(format!(
            "{} would drop below zero ({} {:+})",
            counter.column(),
            current,
            delta
        )));
    }
    Ok(next)
}
