use warp::{
    Rejection, Reply,
    filters::{body::BodyDeserializeError, cors::CorsForbidden},
    http::StatusCode,
    reject::Reject,
};

use tracing::{Level, event, instrument};

#[derive(Debug)]
pub enum Error {
    ParseError(std::num::ParseIntError),
    MissingParameters,
    Unauthorized,
    QuestionNotFound,
    AnswerNotFound,
    // A counter would go negative, or an acceptance transition would leave
    // the question with other than 0 or 1 accepted answers. Never caused
    // by normal use; treated as a defect, not a recoverable condition.
    InvariantViolation(String),
    DatabaseQueryError(sqlx::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &*self {
            Error::ParseError(err) => {
                write!(f, "Cannot parse parameter: {}", err)
            }
            Error::MissingParameters => {
                write!(f, "Missing parameters")
            }
            Error::Unauthorized => {
                write!(f, "No permission to change the underlying resource")
            }
            Error::QuestionNotFound => {
                write!(f, "Question doesn't exist")
            }
            Error::AnswerNotFound => {
                write!(f, "Answer doesn't exist")
            }
            Error::InvariantViolation(detail) => {
                write!(f, "Invariant violation: {}", detail)
            }
            Error::DatabaseQueryError(_) => {
                write!(f, "Cannot update, invalid data.")
            }
        }
    }
}

impl Reject for Error {}

const DUPLICATE_KEY: u32 = 23505;

#[instrument]
pub async fn return_error(r: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(crate::Error::DatabaseQueryError(e)) = r.find() {
        event!(Level::ERROR, "Database query error");
        match e {
            sqlx::Error::Database(err) => {
                if err
                    .code()
                    .and_then(|c| c.parse::<u32>().ok())
                    .map_or(false, |c| c == DUPLICATE_KEY)
                {
                    // Only the votes table carries a client-reachable unique
                    // key: two in-flight toggles from the same voter raced.
                    Ok(warp::reply::with_status(
                        "Vote already recorded".to_string(),
                        StatusCode::UNPROCESSABLE_ENTITY,
                    ))
                } else {
                    Ok(warp::reply::with_status(
                        "Cannot update data".to_string(),
                        StatusCode::UNPROCESSABLE_ENTITY,
                    ))
                }
            }
            _ => Ok(warp::reply::with_status(
                "Cannot update data".to_string(),
                StatusCode::UNPROCESSABLE_ENTITY,
            )),
        }
    } else if let Some(crate::Error::Unauthorized) = r.find() {
        event!(Level::ERROR, "Not matching account id");
        Ok(warp::reply::with_status(
            "No permission to change underlying resource".to_string(),
            StatusCode::UNAUTHORIZED,
        ))
    } else if let Some(crate::Error::QuestionNotFound) = r.find() {
        Ok(warp::reply::with_status(
            crate::Error::QuestionNotFound.to_string(),
            StatusCode::NOT_FOUND,
        ))
    } else if let Some(crate::Error::AnswerNotFound) = r.find() {
        Ok(warp::reply::with_status(
            crate::Error::AnswerNotFound.to_string(),
            StatusCode::NOT_FOUND,
        ))
    } else if let Some(crate::Error::InvariantViolation(detail)) = r.find() {
        // Should never fire: it means an atomicity contract was broken
        // somewhere upstream. Log loudly and fail the request.
        event!(Level::ERROR, "Invariant violation: {}", detail);
        Ok(warp::reply::with_status(
            "Internal Server Error".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    } else if let Some(error) = r.find::<CorsForbidden>() {
        event!(Level::ERROR, "CORS forbidden error: {}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::FORBIDDEN,
        ))
    } else if let Some(error) = r.find::<BodyDeserializeError>() {
        event!(Level::ERROR, "Cannot deserialize request body: {}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        ))
    } else if let Some(error) = r.find::<Error>() {
        event!(Level::ERROR, "{}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        ))
    } else {
        event!(Level::WARN, "Requested route was not found");
        Ok(warp::reply::with_status(
            "Route not found".to_string(),
            StatusCode::NOT_FOUND,
        ))
    }
}
