use handle_errors::Error;

use crate::store::Storage;
use crate::types::{
    account::AccountId,
    question::{QuestionId, QuestionView},
};

/// Assemble the read projection for a single question.
///
/// Pure read, no side effects. `solved` is derived from the acceptance
/// state at read time rather than trusted from the denormalized row, and
/// `my_vote` is looked up in the ledger per viewer; neither is cached.
pub async fn question_view<S: Storage>(
    store: &S,
    question_id: QuestionId,
    viewer: Option<AccountId>,
) -> Result<QuestionView, Error> {
    let question = store.get_question(question_id).await?;
    let accepted = store.accepted_answer(question_id).await?;

    let my_vote = match viewer {
        Some(account_id) => Some(store.has_vote(question_id, account_id).await?),
        None => None,
    };

    Ok(QuestionView {
        id: question.id,
        title: question.title,
        content: question.content,
        tags: question.tags,
        upvotes_count: question.upvotes_count,
        answers_count: question.answers_count,
        solved: accepted.is_some(),
        accepted_answer: accepted,
        my_vote,
    })
}
