use std::collections::HashMap;
use tracing::{Level, event, instrument};

use crate::qa;
use crate::store::Storage;
use crate::types::account::Session;
use crate::types::pagination::{Pagination, extract_pagination};
use crate::types::question::{NewQuestion, QuestionId};

#[instrument]
pub async fn get_questions<S: Storage>(
    params: HashMap<String, String>,
    store: S,
) -> Result<impl warp::Reply, warp::Rejection> {
    event!(target: "campus_qa", Level::INFO, "querying questions");
    let mut pagination = Pagination::default();

    if !params.is_empty() {
        event!(Level::INFO, pagination = true);
        pagination = extract_pagination(params).map_err(warp::reject::custom)?;
    }

    match store
        .get_questions(pagination.limit, pagination.offset)
        .await
    {
        Ok(res) => Ok(warp::reply::json(&res)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

/// `GET /questions/{id}`: the read projection. `my_vote` is only present
/// when the request carries an identity.
#[instrument]
pub async fn get_question<S: Storage>(
    id: i32,
    session: Option<Session>,
    store: S,
) -> Result<impl warp::Reply, warp::Rejection> {
    let viewer = session.map(|s| s.account_id);
    match qa::lifecycle::question_view(&store, QuestionId(id), viewer).await {
        Ok(view) => Ok(warp::reply::json(&view)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

#[instrument]
pub async fn add_question<S: Storage>(
    session: Session,
    store: S,
    new_question: NewQuestion,
) -> Result<impl warp::Reply, warp::Rejection> {
    match store.add_question(new_question, session.account_id).await {
        Ok(question) => Ok(warp::reply::json(&question)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
