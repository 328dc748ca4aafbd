use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use handle_errors::Error;

use crate::qa::counters::{self, Counter};
use crate::types::{
    account::AccountId,
    answer::{Answer, AnswerId, NewAnswer},
    question::{NewQuestion, Question, QuestionId},
    vote::VoteState,
};

/// In-memory stand-in for the hosted database, used by the test suite.
///
/// One lock guards the whole state, so every write method is trivially
/// one atomic unit and acceptance transitions are serialized per
/// construction. Same contract and same guards as the real store.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    questions: HashMap<QuestionId, Question>,
    answers: HashMap<AnswerId, Answer>,
    votes: HashSet<(QuestionId, AccountId)>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[async_trait]
impl super::Storage for MemStore {
    async fn add_question(
        &self,
        new_question: NewQuestion,
        account_id: AccountId,
    ) -> Result<Question, Error> {
        let mut state = self.state.write().await;
        let id = QuestionId(state.next_id());
        let question = Question {
            id,
            title: new_question.title,
            content: new_question.content,
            tags: new_question.tags,
            account_id,
            upvotes_count: 0,
            answers_count: 0,
            solved: false,
            created_on: Utc::now(),
        };
        state.questions.insert(id, question.clone());
        Ok(question)
    }

    async fn get_question(&self, question_id: QuestionId) -> Result<Question, Error> {
        self.state
            .read()
            .await
            .questions
            .get(&question_id)
            .cloned()
            .ok_or(Error::QuestionNotFound)
    }

    async fn get_questions(
        &self,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Question>, Error> {
        let state = self.state.read().await;
        let mut questions: Vec<Question> = state.questions.values().cloned().collect();
        questions.sort_by_key(|q| q.id.0);
        let questions = questions
            .into_iter()
            .skip(offset as usize)
            .take(limit.map_or(usize::MAX, |l| l as usize))
            .collect();
        Ok(questions)
    }

    async fn add_answer(
        &self,
        question_id: QuestionId,
        new_answer: NewAnswer,
        account_id: AccountId,
    ) -> Result<Answer, Error> {
        let mut state = self.state.write().await;
        if !state.questions.contains_key(&question_id) {
            return Err(Error::QuestionNotFound);
        }

        let id = AnswerId(state.next_id());
        let answer = Answer {
            id,
            content: new_answer.content,
            question_id,
            account_id,
            is_accepted: false,
            created_on: Utc::now(),
        };
        state.answers.insert(id, answer.clone());

        // Same unit as the insert: the lock is still held.
        let question = state
            .questions
            .get_mut(&question_id)
            .ok_or(Error::QuestionNotFound)?;
        question.answers_count =
            counters::checked_apply(Counter::Answers, question.answers_count, 1)?;

        Ok(answer)
    }

    async fn get_answers(&self, question_id: QuestionId) -> Result<Vec<Answer>, Error> {
        let state = self.state.read().await;
        if !state.questions.contains_key(&question_id) {
            return Err(Error::QuestionNotFound);
        }
        let mut answers: Vec<Answer> = state
            .answers
            .values()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect();
        answers.sort_by_key(|a| a.id.0);
        Ok(answers)
    }

    async fn toggle_vote(
        &self,
        question_id: QuestionId,
        account_id: AccountId,
    ) -> Result<VoteState, Error> {
        let mut state = self.state.write().await;
        if !state.questions.contains_key(&question_id) {
            return Err(Error::QuestionNotFound);
        }

        let key = (question_id, account_id);
        let voted = if state.votes.contains(&key) {
            state.votes.remove(&key);
            false
        } else {
            state.votes.insert(key);
            true
        };

        let delta = if voted { 1 } else { -1 };
        let question = state
            .questions
            .get_mut(&question_id)
            .ok_or(Error::QuestionNotFound)?;
        question.upvotes_count =
            counters::checked_apply(Counter::Upvotes, question.upvotes_count, delta)?;

        Ok(VoteState {
            voted,
            upvotes_count: question.upvotes_count,
        })
    }

    async fn has_vote(
        &self,
        question_id: QuestionId,
        account_id: AccountId,
    ) -> Result<bool, Error> {
        Ok(self
            .state
            .read()
            .await
            .votes
            .contains(&(question_id, account_id)))
    }

    async fn apply_counter_delta(
        &self,
        question_id: QuestionId,
        counter: Counter,
        delta: i32,
    ) -> Result<i32, Error> {
        let mut state = self.state.write().await;
        let question = state
            .questions
            .get_mut(&question_id)
            .ok_or(Error::QuestionNotFound)?;
        let value = match counter {
            Counter::Upvotes => {
                question.upvotes_count =
                    counters::checked_apply(counter, question.upvotes_count, delta)?;
                question.upvotes_count
            }
            Counter::Answers => {
                question.answers_count =
                    counters::checked_apply(counter, question.answers_count, delta)?;
                question.answers_count
            }
        };
        Ok(value)
    }

    async fn accept_answer(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !state.questions.contains_key(&question_id) {
            return Err(Error::QuestionNotFound);
        }

        match state.answers.get(&answer_id) {
            Some(answer) if answer.question_id == question_id => {}
            _ => return Err(Error::AnswerNotFound),
        }

        // Clear all, mark one, flag the question. The write lock makes
        // the three steps one observable transition.
        for answer in state
            .answers
            .values_mut()
            .filter(|a| a.question_id == question_id)
        {
            answer.is_accepted = answer.id == answer_id;
        }

        let question = state
            .questions
            .get_mut(&question_id)
            .ok_or(Error::QuestionNotFound)?;
        question.solved = true;

        Ok(())
    }

    async fn accepted_answer(
        &self,
        question_id: QuestionId,
    ) -> Result<Option<AnswerId>, Error> {
        let state = self.state.read().await;
        if !state.questions.contains_key(&question_id) {
            return Err(Error::QuestionNotFound);
        }
        let accepted: Vec<AnswerId> = state
            .answers
            .values()
            .filter(|a| a.question_id == question_id && a.is_accepted)
            .map(|a| a.id)
            .collect();

        if accepted.len() > 1 {
            return Err(Error::InvariantViolation(format!(
                "question {} has {} accepted answers",
                question_id.0,
                accepted.len()
            )));
        }
        Ok(accepted.into_iter().next())
    }
}
