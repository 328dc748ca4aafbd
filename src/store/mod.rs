use async_trait::async_trait;
use handle_errors::Error;

use crate::qa::counters::Counter;
use crate::types::{
    account::AccountId,
    answer::{Answer, AnswerId, NewAnswer},
    question::{NewQuestion, Question, QuestionId},
    vote::VoteState,
};

mod memory;
mod postgres;

pub use memory::MemStore;
pub use postgres::Store;

/// The persistence contract the Q&A core runs against.
///
/// Every method that touches derived state (`toggle_vote`, `add_answer`,
/// `apply_counter_delta`, `accept_answer`) is a single atomic unit: it
/// either fully applies row mutation plus counter/flag movement or leaves
/// no trace. `accept_answer` is additionally serialized per question so
/// concurrent accepts cannot interleave.
#[async_trait]
pub trait Storage: Clone + Send + Sync + std::fmt::Debug + 'static {
    async fn add_question(
        &self,
        new_question: NewQuestion,
        account_id: AccountId,
    ) -> Result<Question, Error>;

    async fn get_question(&self, question_id: QuestionId) -> Result<Question, Error>;

    async fn get_questions(
        &self,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Question>, Error>;

    /// Insert the answer row and move `answers_count` in the same unit.
    async fn add_answer(
        &self,
        question_id: QuestionId,
        new_answer: NewAnswer,
        account_id: AccountId,
    ) -> Result<Answer, Error>;

    async fn get_answers(&self, question_id: QuestionId) -> Result<Vec<Answer>, Error>;

    /// Flip the (question, voter) ledger row and move `upvotes_count` in
    /// the same unit. Returns the state the toggle produced.
    async fn toggle_vote(
        &self,
        question_id: QuestionId,
        account_id: AccountId,
    ) -> Result<VoteState, Error>;

    async fn has_vote(
        &self,
        question_id: QuestionId,
        account_id: AccountId,
    ) -> Result<bool, Error>;

    /// Raw projector primitive: apply a signed delta atomically, never
    /// producing a negative counter. A delta the guard refuses is an
    /// `InvariantViolation`, not a clamp.
    async fn apply_counter_delta(
        &self,
        question_id: QuestionId,
        counter: Counter,
        delta: i32,
    ) -> Result<i32, Error>;

    /// The acceptance transition: clear all sibling answers, mark the
    /// target, set the question solved. One unit, serialized per question;
    /// losers of the serialization are retried inside the store.
    async fn accept_answer(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<(), Error>;

    async fn accepted_answer(&self, question_id: QuestionId)
    -> Result<Option<AnswerId>, Error>;
}
