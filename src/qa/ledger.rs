use handle_errors::Error;

use crate::store::Storage;
use crate::types::{account::AccountId, question::QuestionId, vote::VoteState};

/// Flip the (question, voter) ledger row and move `upvotes_count` with it.
///
/// The operation is defined purely by row presence: no row means create
/// one and count up, an existing row means delete it and count down. A
/// duplicated request therefore converges back to a well-defined state
/// instead of double-applying; there is no client-supplied delta to
/// trust. Row toggle and counter delta happen in one atomic store unit.
pub async fn toggle_vote<S: Storage>(
    store: &S,
    question_id: QuestionId,
    voter: AccountId,
) -> Result<VoteState, Error> {
    // Reject votes on questions that never existed or were removed by
    // an external moderation process before touching the ledger.
    store.get_question(question_id).await?;

    store.toggle_vote(question_id, voter).await
}
