use std::future;
use warp::Filter;

use crate::types::account::{AccountId, Session};

// Authentication itself lives in front of this service; the gateway
// verifies the caller and forwards the bare account id in the
// Authorization header. We only parse it into a Session here.
fn parse_identity(token: String) -> Result<Session, handle_errors::Error> {
    let account_id = token
        .trim()
        .parse::<i32>()
        .map_err(handle_errors::Error::ParseError)?;

    Ok(Session {
        account_id: AccountId(account_id),
    })
}

pub fn auth() -> impl Filter<Extract = (Session,), Error = warp::Rejection> + Clone {
    warp::header::<String>("Authorization").and_then(|token: String| {
        future::ready(parse_identity(token).map_err(warp::reject::custom))
    })
}

/// Like `auth`, but the header may be absent: read views work without an
/// identity, they just lose the per-viewer vote state.
pub fn auth_optional()
-> impl Filter<Extract = (Option<Session>,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("Authorization").and_then(|token: Option<String>| {
        future::ready(match token {
            Some(token) => parse_identity(token)
                .map(Some)
                .map_err(warp::reject::custom),
            None => Ok(None),
        })
    })
}

#[cfg(test)]
mod authentication_tests {
    use super::*;

    #[test]
    fn parses_a_forwarded_account_id() {
        let session = parse_identity("42".to_string()).unwrap();
        assert_eq!(session.account_id, AccountId(42));
    }

    #[test]
    fn rejects_a_garbage_header() {
        let result = parse_identity("not-an-id".to_string());
        assert!(matches!(result, Err(handle_errors::Error::ParseError(_))));
    }
}
