use campus_qa::qa::{acceptance, counters::Counter, ledger, lifecycle};
use campus_qa::store::{MemStore, Storage};
use campus_qa::types::account::AccountId;
use campus_qa::types::answer::NewAnswer;
use campus_qa::types::question::{NewQuestion, QuestionId};

use handle_errors::Error;

fn question_payload(title: &str) -> NewQuestion {
    NewQuestion {
        title: title.to_string(),
        content: "content".to_string(),
        tags: Some(vec!["cs101".to_string()]),
    }
}

fn answer_payload(content: &str) -> NewAnswer {
    NewAnswer {
        content: content.to_string(),
    }
}

async fn seed_question(store: &MemStore, author: AccountId) -> QuestionId {
    store
        .add_question(question_payload("How do I reverse a linked list?"), author)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn toggle_twice_returns_to_original_state() {
    let store = MemStore::default();
    let author = AccountId(1);
    let voter = AccountId(2);
    let question_id = seed_question(&store, author).await;

    let state = ledger::toggle_vote(&store, question_id, voter).await.unwrap();
    assert!(state.voted);
    assert_eq!(state.upvotes_count, 1);

    let view = lifecycle::question_view(&store, question_id, Some(voter))
        .await
        .unwrap();
    assert_eq!(view.my_vote, Some(true));
    assert_eq!(view.upvotes_count, 1);

    let state = ledger::toggle_vote(&store, question_id, voter).await.unwrap();
    assert!(!state.voted);
    assert_eq!(state.upvotes_count, 0);

    let view = lifecycle::question_view(&store, question_id, Some(voter))
        .await
        .unwrap();
    assert_eq!(view.my_vote, Some(false));
    assert_eq!(view.upvotes_count, 0);
}

#[tokio::test]
async fn voting_on_a_missing_question_fails() {
    let store = MemStore::default();
    let err = ledger::toggle_vote(&store, QuestionId(99), AccountId(1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QuestionNotFound));
}

#[tokio::test]
async fn votes_from_distinct_voters_accumulate() {
    let store = MemStore::default();
    let question_id = seed_question(&store, AccountId(1)).await;

    for voter in 2..=4 {
        let state = ledger::toggle_vote(&store, question_id, AccountId(voter))
            .await
            .unwrap();
        assert!(state.voted);
    }

    let view = lifecycle::question_view(&store, question_id, None)
        .await
        .unwrap();
    assert_eq!(view.upvotes_count, 3);
    assert_eq!(view.my_vote, None);
}

#[tokio::test]
async fn concurrent_toggles_count_every_distinct_voter() {
    let store = MemStore::default();
    let question_id = seed_question(&store, AccountId(1)).await;

    let mut handles = Vec::new();
    for voter in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            ledger::toggle_vote(&store, question_id, AccountId(100 + voter)).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().voted);
    }

    let view = lifecycle::question_view(&store, question_id, None)
        .await
        .unwrap();
    assert_eq!(view.upvotes_count, 10);

    // Re-running the same ten toggles retracts every vote.
    let mut handles = Vec::new();
    for voter in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            ledger::toggle_vote(&store, question_id, AccountId(100 + voter)).await
        }));
    }
    for handle in handles {
        assert!(!handle.await.unwrap().unwrap().voted);
    }

    let view = lifecycle::question_view(&store, question_id, None)
        .await
        .unwrap();
    assert_eq!(view.upvotes_count, 0);
}

#[tokio::test]
async fn posting_answers_moves_the_answer_counter() {
    let store = MemStore::default();
    let question_id = seed_question(&store, AccountId(1)).await;

    store
        .add_answer(question_id, answer_payload("use a stack"), AccountId(2))
        .await
        .unwrap();
    store
        .add_answer(question_id, answer_payload("iterate and swap"), AccountId(3))
        .await
        .unwrap();

    let view = lifecycle::question_view(&store, question_id, None)
        .await
        .unwrap();
    assert_eq!(view.answers_count, 2);
    assert!(!view.solved);
}

#[tokio::test]
async fn accepting_marks_exactly_one_answer() {
    let store = MemStore::default();
    let author = AccountId(1);
    let question_id = seed_question(&store, author).await;
    let a1 = store
        .add_answer(question_id, answer_payload("first"), AccountId(2))
        .await
        .unwrap();
    let a2 = store
        .add_answer(question_id, answer_payload("second"), AccountId(3))
        .await
        .unwrap();

    let view = acceptance::accept(&store, question_id, a1.id, author)
        .await
        .unwrap();
    assert!(view.solved);
    assert_eq!(view.accepted_answer, Some(a1.id));

    let answers = store.get_answers(question_id).await.unwrap();
    assert!(answers.iter().find(|a| a.id == a1.id).unwrap().is_accepted);
    assert!(!answers.iter().find(|a| a.id == a2.id).unwrap().is_accepted);
}

#[tokio::test]
async fn reaccepting_moves_the_acceptance() {
    let store = MemStore::default();
    let author = AccountId(1);
    let question_id = seed_question(&store, author).await;
    let a1 = store
        .add_answer(question_id, answer_payload("first"), AccountId(2))
        .await
        .unwrap();
    let a2 = store
        .add_answer(question_id, answer_payload("second"), AccountId(3))
        .await
        .unwrap();

    acceptance::accept(&store, question_id, a1.id, author)
        .await
        .unwrap();
    let view = acceptance::accept(&store, question_id, a2.id, author)
        .await
        .unwrap();

    assert!(view.solved);
    assert_eq!(view.accepted_answer, Some(a2.id));

    let answers = store.get_answers(question_id).await.unwrap();
    assert!(!answers.iter().find(|a| a.id == a1.id).unwrap().is_accepted);
    assert!(answers.iter().find(|a| a.id == a2.id).unwrap().is_accepted);
}

#[tokio::test]
async fn only_the_author_may_accept() {
    let store = MemStore::default();
    let author = AccountId(1);
    let question_id = seed_question(&store, author).await;
    let a1 = store
        .add_answer(question_id, answer_payload("first"), AccountId(2))
        .await
        .unwrap();

    let err = acceptance::accept(&store, question_id, a1.id, AccountId(3))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized));

    // Nothing moved.
    let answers = store.get_answers(question_id).await.unwrap();
    assert!(!answers[0].is_accepted);
    let view = lifecycle::question_view(&store, question_id, None)
        .await
        .unwrap();
    assert!(!view.solved);
}

#[tokio::test]
async fn accepting_an_answer_of_another_question_fails() {
    let store = MemStore::default();
    let author = AccountId(1);
    let question_id = seed_question(&store, author).await;
    let other_question = seed_question(&store, author).await;
    let foreign = store
        .add_answer(other_question, answer_payload("elsewhere"), AccountId(2))
        .await
        .unwrap();

    let err = acceptance::accept(&store, question_id, foreign.id, author)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AnswerNotFound));
}

#[tokio::test]
async fn concurrent_accepts_leave_exactly_one_accepted() {
    let store = MemStore::default();
    let author = AccountId(1);
    let question_id = seed_question(&store, author).await;
    let a1 = store
        .add_answer(question_id, answer_payload("first"), AccountId(2))
        .await
        .unwrap();
    let a2 = store
        .add_answer(question_id, answer_payload("second"), AccountId(3))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        let target = if i % 2 == 0 { a1.id } else { a2.id };
        handles.push(tokio::spawn(async move {
            acceptance::accept(&store, question_id, target, author).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let answers = store.get_answers(question_id).await.unwrap();
    let accepted: Vec<_> = answers.iter().filter(|a| a.is_accepted).collect();
    assert_eq!(accepted.len(), 1);

    let view = lifecycle::question_view(&store, question_id, None)
        .await
        .unwrap();
    assert!(view.solved);
}

#[tokio::test]
async fn projector_rejects_a_negative_counter() {
    let store = MemStore::default();
    let question_id = seed_question(&store, AccountId(1)).await;

    let err = store
        .apply_counter_delta(question_id, Counter::Upvotes, -1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvariantViolation(_)));

    // The refused delta left the counter untouched.
    let view = lifecycle::question_view(&store, question_id, None)
        .await
        .unwrap();
    assert_eq!(view.upvotes_count, 0);
}

#[tokio::test]
async fn view_reads_solved_from_the_acceptance_state() {
    let store = MemStore::default();
    let author = AccountId(1);
    let question_id = seed_question(&store, author).await;
    let a1 = store
        .add_answer(question_id, answer_payload("first"), AccountId(2))
        .await
        .unwrap();

    let view = lifecycle::question_view(&store, question_id, None)
        .await
        .unwrap();
    assert!(!view.solved);
    assert_eq!(view.accepted_answer, None);

    acceptance::accept(&store, question_id, a1.id, author)
        .await
        .unwrap();

    let view = lifecycle::question_view(&store, question_id, None)
        .await
        .unwrap();
    assert!(view.solved);
    assert_eq!(view.accepted_answer, Some(a1.id));
}
