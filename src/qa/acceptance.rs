use handle_errors::Error;

use crate::qa::lifecycle;
use crate::store::Storage;
use crate::types::{
    account::AccountId,
    answer::AnswerId,
    question::{QuestionId, QuestionView},
};

/// Mark `answer_id` as the accepted answer for `question_id`.
///
/// Only the question's author may accept. The transition itself (clear
/// every sibling answer, mark the target, flag the question solved) runs
/// as a single store unit serialized per question, so readers never
/// observe zero or two accepted answers mid-flight. Accepting a different
/// answer re-runs the same transition and implicitly revokes the previous
/// acceptance; there is no transition back to an unsolved question.
pub async fn accept<S: Storage>(
    store: &S,
    question_id: QuestionId,
    answer_id: AnswerId,
    acting_user: AccountId,
) -> Result<QuestionView, Error> {
    let question = store.get_question(question_id).await?;

    if question.account_id != acting_user {
        return Err(Error::Unauthorized);
    }

    store.accept_answer(question_id, answer_id).await?;

    lifecycle::question_view(store, question_id, Some(acting_user)).await
}
