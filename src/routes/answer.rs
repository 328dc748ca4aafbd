use tracing::instrument;

use crate::qa;
use crate::store::Storage;
use crate::types::account::Session;
use crate::types::answer::{AnswerId, NewAnswer};
use crate::types::question::QuestionId;

/// `POST /questions/{id}/answers`. The store moves `answers_count` in the
/// same unit as the insert.
#[instrument]
pub async fn add_answer<S: Storage>(
    question_id: i32,
    session: Session,
    store: S,
    new_answer: NewAnswer,
) -> Result<impl warp::Reply, warp::Rejection> {
    match store
        .add_answer(QuestionId(question_id), new_answer, session.account_id)
        .await
    {
        Ok(answer) => Ok(warp::reply::json(&answer)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

/// `POST /questions/{id}/answers/{answer_id}/accept`. Returns the updated
/// question view so the client can re-render without a second request.
#[instrument]
pub async fn accept_answer<S: Storage>(
    question_id: i32,
    answer_id: i32,
    session: Session,
    store: S,
) -> Result<impl warp::Reply, warp::Rejection> {
    match qa::acceptance::accept(
        &store,
        QuestionId(question_id),
        AnswerId(answer_id),
        session.account_id,
    )
    .await
    {
        Ok(view) => Ok(warp::reply::json(&view)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
