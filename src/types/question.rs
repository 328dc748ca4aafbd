use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::account::AccountId;
use crate::types::answer::AnswerId;

#[derive(Serialize, Debug, Deserialize, Clone)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub content: String,
    pub tags: Option<Vec<String>>,
    pub account_id: AccountId,
    // Derived columns. Owned by the counter projector and the acceptance
    // coordinator; nothing else writes them.
    pub upvotes_count: i32,
    pub answers_count: i32,
    pub solved: bool,
    pub created_on: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, Copy, Eq, Hash, Deserialize, PartialEq)]
pub struct QuestionId(pub i32);

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewQuestion {
    pub title: String,
    pub content: String,
    pub tags: Option<Vec<String>>,
}

/// Read projection returned by `GET /questions/{id}`. Assembled per
/// request; `solved` comes from the acceptance state and `my_vote` from
/// the vote ledger, both at read time.
#[derive(Serialize, Debug, Clone)]
pub struct QuestionView {
    pub id: QuestionId,
    pub title: String,
    pub content: String,
    pub tags: Option<Vec<String>>,
    pub upvotes_count: i32,
    pub answers_count: i32,
    pub solved: bool,
    pub accepted_answer: Option<AnswerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_vote: Option<bool>,
}
