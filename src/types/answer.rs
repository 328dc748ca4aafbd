use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::account::AccountId;
use crate::types::question::QuestionId;

#[derive(Serialize, Debug, Deserialize, Clone)]
pub struct Answer {
    pub id: AnswerId,
    pub content: String,
    pub question_id: QuestionId,
    pub account_id: AccountId,
    // Mutated only through the acceptance transition, never set directly.
    pub is_accepted: bool,
    pub created_on: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, Copy, Eq, Hash, Deserialize, PartialEq)]
pub struct AnswerId(pub i32);

// The owning question comes from the request path, not the body.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewAnswer {
    pub content: String,
}
