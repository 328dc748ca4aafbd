use tracing::{Level, event, instrument};

use crate::qa;
use crate::store::Storage;
use crate::types::account::Session;
use crate::types::question::QuestionId;

/// `POST /questions/{id}/vote/toggle`. Cast or retract, decided by the
/// ledger; the response carries the new state and counter.
#[instrument]
pub async fn toggle_vote<S: Storage>(
    question_id: i32,
    session: Session,
    store: S,
) -> Result<impl warp::Reply, warp::Rejection> {
    event!(target: "campus_qa", Level::INFO, "toggling vote");
    match qa::ledger::toggle_vote(&store, QuestionId(question_id), session.account_id).await {
        Ok(state) => Ok(warp::reply::json(&state)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
