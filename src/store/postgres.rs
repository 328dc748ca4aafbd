use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Transaction};

use handle_errors::Error;

use crate::qa::counters::Counter;
use crate::types::{
    account::AccountId,
    answer::{Answer, AnswerId, NewAnswer},
    question::{NewQuestion, Question, QuestionId},
    vote::VoteState,
};

// SQLSTATE codes PostgreSQL reports when an accept transition loses the
// per-question serialization; the transition is simply re-run.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const ACCEPT_RETRIES: u8 = 3;

#[derive(Debug, Clone)]
pub struct Store {
    pub connection: PgPool,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self, sqlx::Error> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;

        Ok(Store {
            connection: db_pool,
        })
    }

    /// Apply a signed delta to a question counter inside `tx`.
    ///
    /// The delta is pushed into the UPDATE itself with a non-negative
    /// guard, so the new value is computed by the database and never by a
    /// caller holding a stale read.
    async fn apply_delta(
        tx: &mut Transaction<'_, Postgres>,
        question_id: QuestionId,
        counter: Counter,
        delta: i32,
    ) -> Result<i32, Error> {
        let update = format!(
            "UPDATE questions
            SET {col} = {col} + $1
            WHERE id = $2 AND {col} + $1 >= 0
            RETURNING {col}",
            col = counter.column()
        );

        match sqlx::query(&update)
            .bind(delta)
            .bind(question_id.0)
            .map(|row: PgRow| row.get::<i32, _>(counter.column()))
            .fetch_optional(&mut **tx)
            .await
        {
            Ok(Some(value)) => Ok(value),
            Ok(None) => {
                // No row updated: either the question is gone or the
                // guard refused a negative counter.
                match sqlx::query("SELECT id FROM questions WHERE id = $1")
                    .bind(question_id.0)
                    .fetch_optional(&mut **tx)
                    .await
                {
                    Ok(Some(_)) => Err(Error::InvariantViolation(format!(
                        "{} on question {} would drop below zero",
                        counter.column(),
                        question_id.0
                    ))),
                    Ok(None) => Err(Error::QuestionNotFound),
                    Err(e) => {
                        tracing::event!(tracing::Level::ERROR, "{:?}", e);
                        Err(Error::DatabaseQueryError(e))
                    }
                }
            }
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                Err(Error::DatabaseQueryError(e))
            }
        }
    }

    async fn try_accept(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<(), Error> {
        let mut tx = self
            .connection
            .begin()
            .await
            .map_err(Error::DatabaseQueryError)?;

        // Locking the question row is the per-question mutual exclusion:
        // every accept transition for this question queues up here.
        match sqlx::query("SELECT id FROM questions WHERE id = $1 FOR UPDATE")
            .bind(question_id.0)
            .fetch_optional(&mut tx)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => return Err(Error::QuestionNotFound),
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                return Err(Error::DatabaseQueryError(e));
            }
        }

        match sqlx::query("SELECT id FROM answers WHERE id = $1 AND question_id = $2")
            .bind(answer_id.0)
            .bind(question_id.0)
            .fetch_optional(&mut tx)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => return Err(Error::AnswerNotFound),
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                return Err(Error::DatabaseQueryError(e));
            }
        }

        // Clear first, then mark, so the partial unique index on accepted
        // answers never sees two at once. Both statements sit behind the
        // row lock above and commit together.
        if let Err(e) = sqlx::query(
            "UPDATE answers SET is_accepted = false
            WHERE question_id = $1 AND is_accepted = true",
        )
        .bind(question_id.0)
        .execute(&mut tx)
        .await
        {
            tracing::event!(tracing::Level::ERROR, "{:?}", e);
            return Err(Error::DatabaseQueryError(e));
        }

        if let Err(e) = sqlx::query("UPDATE answers SET is_accepted = true WHERE id = $1")
            .bind(answer_id.0)
            .execute(&mut tx)
            .await
        {
            tracing::event!(tracing::Level::ERROR, "{:?}", e);
            return Err(Error::DatabaseQueryError(e));
        }

        if let Err(e) = sqlx::query("UPDATE questions SET solved = true WHERE id = $1")
            .bind(question_id.0)
            .execute(&mut tx)
            .await
        {
            tracing::event!(tracing::Level::ERROR, "{:?}", e);
            return Err(Error::DatabaseQueryError(e));
        }

        tx.commit().await.map_err(Error::DatabaseQueryError)
    }
}

fn question_from_row(row: PgRow) -> Question {
    Question {
        id: QuestionId(row.get("id")),
        title: row.get("title"),
        content: row.get("content"),
        tags: row.get("tags"),
        account_id: AccountId(row.get("account_id")),
        upvotes_count: row.get("upvotes_count"),
        answers_count: row.get("answers_count"),
        solved: row.get("solved"),
        created_on: row.get("created_on"),
    }
}

fn answer_from_row(row: PgRow) -> Answer {
    Answer {
        id: AnswerId(row.get("id")),
        content: row.get("content"),
        question_id: QuestionId(row.get("question_id")),
        account_id: AccountId(row.get("account_id")),
        is_accepted: row.get("is_accepted"),
        created_on: row.get("created_on"),
    }
}

fn is_serialization_loss(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
        ),
        _ => false,
    }
}

#[async_trait]
impl super::Storage for Store {
    async fn add_question(
        &self,
        new_question: NewQuestion,
        account_id: AccountId,
    ) -> Result<Question, Error> {
        match sqlx::query(
            "INSERT INTO questions (title, content, tags, account_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, tags, account_id,
                upvotes_count, answers_count, solved, created_on",
        )
        .bind(new_question.title)
        .bind(new_question.content)
        .bind(new_question.tags)
        .bind(account_id.0)
        .map(question_from_row)
        .fetch_one(&self.connection)
        .await
        {
            Ok(question) => Ok(question),
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                Err(Error::DatabaseQueryError(e))
            }
        }
    }

    async fn get_question(&self, question_id: QuestionId) -> Result<Question, Error> {
        match sqlx::query("SELECT * FROM questions WHERE id = $1")
            .bind(question_id.0)
            .map(question_from_row)
            .fetch_optional(&self.connection)
            .await
        {
            Ok(Some(question)) => Ok(question),
            Ok(None) => Err(Error::QuestionNotFound),
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                Err(Error::DatabaseQueryError(e))
            }
        }
    }

    async fn get_questions(
        &self,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Question>, Error> {
        match sqlx::query("SELECT * FROM questions ORDER BY id LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .map(question_from_row)
            .fetch_all(&self.connection)
            .await
        {
            Ok(questions) => Ok(questions),
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                Err(Error::DatabaseQueryError(e))
            }
        }
    }

    async fn add_answer(
        &self,
        question_id: QuestionId,
        new_answer: NewAnswer,
        account_id: AccountId,
    ) -> Result<Answer, Error> {
        let mut tx = self
            .connection
            .begin()
            .await
            .map_err(Error::DatabaseQueryError)?;

        let answer = match sqlx::query(
            "INSERT INTO answers (content, question_id, account_id)
            VALUES ($1, $2, $3)
            RETURNING id, content, question_id, account_id, is_accepted, created_on",
        )
        .bind(new_answer.content)
        .bind(question_id.0)
        .bind(account_id.0)
        .map(answer_from_row)
        .fetch_one(&mut tx)
        .await
        {
            Ok(answer) => answer,
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                return Err(Error::DatabaseQueryError(e));
            }
        };

        Self::apply_delta(&mut tx, question_id, Counter::Answers, 1).await?;

        tx.commit().await.map_err(Error::DatabaseQueryError)?;
        Ok(answer)
    }

    async fn get_answers(&self, question_id: QuestionId) -> Result<Vec<Answer>, Error> {
        match sqlx::query("SELECT * FROM answers WHERE question_id = $1 ORDER BY id")
            .bind(question_id.0)
            .map(answer_from_row)
            .fetch_all(&self.connection)
            .await
        {
            Ok(answers) => Ok(answers),
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                Err(Error::DatabaseQueryError(e))
            }
        }
    }

    async fn toggle_vote(
        &self,
        question_id: QuestionId,
        account_id: AccountId,
    ) -> Result<VoteState, Error> {
        let mut tx = self
            .connection
            .begin()
            .await
            .map_err(Error::DatabaseQueryError)?;

        // Row presence decides the direction. Distinct voters touch
        // distinct rows and only meet at the counter update below.
        let deleted = match sqlx::query(
            "DELETE FROM votes WHERE question_id = $1 AND account_id = $2",
        )
        .bind(question_id.0)
        .bind(account_id.0)
        .execute(&mut tx)
        .await
        {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                return Err(Error::DatabaseQueryError(e));
            }
        };

        let voted = deleted == 0;
        if voted {
            // The composite primary key rejects a second concurrent
            // insert from the same voter, so a racing duplicate toggle
            // cannot double-apply.
            if let Err(e) = sqlx::query(
                "INSERT INTO votes (question_id, account_id) VALUES ($1, $2)",
            )
            .bind(question_id.0)
            .bind(account_id.0)
            .execute(&mut tx)
            .await
            {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                return Err(Error::DatabaseQueryError(e));
            }
        }

        let delta = if voted { 1 } else { -1 };
        let upvotes_count =
            Self::apply_delta(&mut tx, question_id, Counter::Upvotes, delta).await?;

        tx.commit().await.map_err(Error::DatabaseQueryError)?;
        Ok(VoteState {
            voted,
            upvotes_count,
        })
    }

    async fn has_vote(
        &self,
        question_id: QuestionId,
        account_id: AccountId,
    ) -> Result<bool, Error> {
        match sqlx::query("SELECT question_id FROM votes WHERE question_id = $1 AND account_id = $2")
            .bind(question_id.0)
            .bind(account_id.0)
            .fetch_optional(&self.connection)
            .await
        {
            Ok(vote) => Ok(vote.is_some()),
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                Err(Error::DatabaseQueryError(e))
            }
        }
    }

    async fn apply_counter_delta(
        &self,
        question_id: QuestionId,
        counter: Counter,
        delta: i32,
    ) -> Result<i32, Error> {
        let mut tx = self
            .connection
            .begin()
            .await
            .map_err(Error::DatabaseQueryError)?;
        let value = Self::apply_delta(&mut tx, question_id, counter, delta).await?;
        tx.commit().await.map_err(Error::DatabaseQueryError)?;
        Ok(value)
    }

    async fn accept_answer(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<(), Error> {
        let mut attempt = 0;
        loop {
            match self.try_accept(question_id, answer_id).await {
                Err(Error::DatabaseQueryError(e))
                    if attempt < ACCEPT_RETRIES && is_serialization_loss(&e) =>
                {
                    attempt += 1;
                    tracing::event!(
                        tracing::Level::WARN,
                        "accept transition on question {} lost serialization, retrying ({})",
                        question_id.0,
                        attempt
                    );
                }
                other => return other,
            }
        }
    }

    async fn accepted_answer(
        &self,
        question_id: QuestionId,
    ) -> Result<Option<AnswerId>, Error> {
        match sqlx::query(
            "SELECT id FROM answers WHERE question_id = $1 AND is_accepted = true",
        )
        .bind(question_id.0)
        .map(|row: PgRow| AnswerId(row.get("id")))
        .fetch_all(&self.connection)
        .await
        {
            Ok(accepted) if accepted.len() > 1 => Err(Error::InvariantViolation(format!(
                "question {} has {} accepted answers",
                question_id.0,
                accepted.len()
            ))),
            Ok(mut accepted) => Ok(accepted.pop()),
            Err(e) => {
                tracing::event!(tracing::Level::ERROR, "{:?}", e);
                Err(Error::DatabaseQueryError(e))
            }
        }
    }
}
