use campus_qa::build_routes;
use campus_qa::store::{MemStore, Storage};
use campus_qa::types::account::AccountId;
use campus_qa::types::answer::NewAnswer;
use campus_qa::types::question::{NewQuestion, QuestionId};

use serde_json::Value;

async fn seed_question(store: &MemStore, author: AccountId) -> QuestionId {
    store
        .add_question(
            NewQuestion {
                title: "Where is the second-hand bookstore?".to_string(),
                content: "Looking for used course books".to_string(),
                tags: None,
            },
            author,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn vote_toggle_round_trip_over_http() {
    let store = MemStore::default();
    let question_id = seed_question(&store, AccountId(1)).await;
    let filter = build_routes(store);

    let res = warp::test::request()
        .method("POST")
        .path(&format!("/questions/{}/vote/toggle", question_id.0))
        .header("Authorization", "7")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), 200);
    let state: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(state["voted"], Value::Bool(true));
    assert_eq!(state["upvotes_count"], 1);

    let res = warp::test::request()
        .method("POST")
        .path(&format!("/questions/{}/vote/toggle", question_id.0))
        .header("Authorization", "7")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), 200);
    let state: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(state["voted"], Value::Bool(false));
    assert_eq!(state["upvotes_count"], 0);
}

#[tokio::test]
async fn question_view_hides_my_vote_without_identity() {
    let store = MemStore::default();
    let question_id = seed_question(&store, AccountId(1)).await;
    let filter = build_routes(store);

    let res = warp::test::request()
        .method("GET")
        .path(&format!("/questions/{}", question_id.0))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), 200);
    let view: Value = serde_json::from_slice(res.body()).unwrap();
    assert!(view.get("my_vote").is_none());
    assert_eq!(view["solved"], Value::Bool(false));

    let res = warp::test::request()
        .method("GET")
        .path(&format!("/questions/{}", question_id.0))
        .header("Authorization", "7")
        .reply(&filter)
        .await;
    let view: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(view["my_vote"], Value::Bool(false));
}

#[tokio::test]
async fn answering_and_accepting_over_http() {
    let store = MemStore::default();
    let author = AccountId(1);
    let question_id = seed_question(&store, author).await;
    store
        .add_answer(
            question_id,
            NewAnswer {
                content: "Behind the cafeteria".to_string(),
            },
            AccountId(2),
        )
        .await
        .unwrap();
    let filter = build_routes(store.clone());

    let res = warp::test::request()
        .method("POST")
        .path(&format!("/questions/{}/answers", question_id.0))
        .header("Authorization", "3")
        .json(&NewAnswer {
            content: "Second floor of the union building".to_string(),
        })
        .reply(&filter)
        .await;
    assert_eq!(res.status(), 200);
    let answer: Value = serde_json::from_slice(res.body()).unwrap();
    let answer_id = answer["id"].as_i64().unwrap();

    // A non-author may not accept.
    let res = warp::test::request()
        .method("POST")
        .path(&format!(
            "/questions/{}/answers/{}/accept",
            question_id.0, answer_id
        ))
        .header("Authorization", "3")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), 401);

    // The author may.
    let res = warp::test::request()
        .method("POST")
        .path(&format!(
            "/questions/{}/answers/{}/accept",
            question_id.0, answer_id
        ))
        .header("Authorization", "1")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), 200);
    let view: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(view["solved"], Value::Bool(true));
    assert_eq!(view["accepted_answer"], answer_id);
    assert_eq!(view["answers_count"], 2);
}

#[tokio::test]
async fn missing_question_is_a_404() {
    let store = MemStore::default();
    let filter = build_routes(store);

    let res = warp::test::request()
        .method("GET")
        .path("/questions/4711")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn listing_questions_with_pagination() {
    let store = MemStore::default();
    for _ in 0..3 {
        seed_question(&store, AccountId(1)).await;
    }
    let filter = build_routes(store);

    let res = warp::test::request()
        .method("GET")
        .path("/questions?limit=2&offset=1")
        .reply(&filter)
        .await;
    assert_eq!(res.status(), 200);
    let questions: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(questions.as_array().unwrap().len(), 2);
}
