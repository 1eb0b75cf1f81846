use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

fn exam_payload() -> serde_json::Value {
    json!({
        "title": "Rust fundamentals",
        "duration": 30,
        "course": "CS201",
        "metadata": {"semester": "fall"},
        "questions": [
            {
                "question_text": "What does the borrow checker enforce?",
                "question_type": "text",
                "expected_answer": "aliasing xor mutability"
            },
            {
                "question_text": "Which types are Copy?",
                "question_type": "mcq",
                "expected_answer": ["i32", "bool"]
            },
            {
                "question_text": "Which keyword declares a trait?",
                "question_type": "mcq",
                "expected_answer": ["trait"]
            }
        ]
    })
}

async fn create_exam(ctx: &test_support::TestContext, token: &str) -> i64 {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exams",
            Some(token),
            Some(exam_payload()),
        ))
        .await
        .expect("create exam");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["message"], "Exam created");
    created["exam_id"].as_i64().expect("exam id")
}

async fn question_ids(ctx: &test_support::TestContext, token: &str, exam_id: i64) -> Vec<i64> {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exams/{exam_id}"),
            Some(token),
            None,
        ))
        .await
        .expect("get exam");

    let exam = test_support::read_json(response).await;
    exam["questions"]
        .as_array()
        .expect("questions")
        .iter()
        .map(|question| question["id"].as_i64().expect("question id"))
        .collect()
}

#[tokio::test]
async fn admin_creates_and_lists_exam_with_answers() {
    let ctx = test_support::setup_test_context().await;
    let admin = test_support::insert_admin(ctx.state.db(), "admin", "admin-pass").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let exam_id = create_exam(&ctx, &token).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/v1/exams", Some(&token), None))
        .await
        .expect("list exams");

    let status = response.status();
    let list = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {list}");
    let exams = list.as_array().expect("exam list");
    assert_eq!(exams.len(), 1);
    assert_eq!(exams[0]["id"], exam_id);
    assert_eq!(exams[0]["metadata"]["semester"], "fall");
    assert_eq!(exams[0]["questions"][1]["expected_answer"], json!(["i32", "bool"]));
}

#[tokio::test]
async fn student_view_hides_expected_answers() {
    let ctx = test_support::setup_test_context().await;
    let admin = test_support::insert_admin(ctx.state.db(), "admin", "admin-pass").await;
    let student = test_support::insert_user(ctx.state.db(), "student", "student-pass").await;
    let admin_token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let exam_id = create_exam(&ctx, &admin_token).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exams/{exam_id}"),
            Some(&student_token),
            None,
        ))
        .await
        .expect("get exam");

    let status = response.status();
    let exam = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {exam}");
    let questions = exam["questions"].as_array().expect("questions");
    assert_eq!(questions.len(), 3);
    assert!(questions.iter().all(|question| question.get("expected_answer").is_none()));

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/exams",
            Some(&student_token),
            None,
        ))
        .await
        .expect("list exams");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn submission_is_graded_once() {
    let ctx = test_support::setup_test_context().await;
    let admin = test_support::insert_admin(ctx.state.db(), "admin", "admin-pass").await;
    let student = test_support::insert_user(ctx.state.db(), "student", "student-pass").await;
    let admin_token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let exam_id = create_exam(&ctx, &admin_token).await;
    let ids = question_ids(&ctx, &student_token, exam_id).await;

    let mut answers = serde_json::Map::new();
    answers.insert(ids[0].to_string(), json!("Aliasing XOR mutability, always"));
    answers.insert(ids[1].to_string(), json!(["bool", " i32 "]));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{exam_id}/submit"),
            Some(&student_token),
            Some(json!({ "answers": answers })),
        ))
        .await
        .expect("submit");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["message"], "Submitted successfully");
    assert_eq!(body["score"], 66.67);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/exams/{exam_id}/submit"),
            Some(&student_token),
            Some(json!({"answers": {}})),
        ))
        .await
        .expect("resubmit");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["message"], "You have already submitted this exam.");
    assert_eq!(body["score"], 66.67);
}

#[tokio::test]
async fn submitting_to_missing_exam_returns_404() {
    let ctx = test_support::setup_test_context().await;
    let student = test_support::insert_user(ctx.state.db(), "student", "student-pass").await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exams/999/submit",
            Some(&token),
            Some(json!({"answers": {}})),
        ))
        .await
        .expect("submit");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_keeps_metadata_when_omitted_and_delete_cascades() {
    let ctx = test_support::setup_test_context().await;
    let admin = test_support::insert_admin(ctx.state.db(), "admin", "admin-pass").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let exam_id = create_exam(&ctx, &token).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/v1/exams/{exam_id}"),
            Some(&token),
            Some(json!({"title": "Rust advanced", "duration": 45, "course": "CS301"})),
        ))
        .await
        .expect("update exam");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["message"], "Exam updated successfully");

    let exam = crate::repositories::exams::find_by_id(ctx.state.db(), exam_id)
        .await
        .expect("fetch exam")
        .expect("exam exists");
    assert_eq!(exam.title, "Rust advanced");
    assert_eq!(exam.metadata.map(|metadata| metadata.0), Some(json!({"semester": "fall"})));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/exams/{exam_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete exam");
    assert_eq!(response.status(), StatusCode::OK);

    let remaining = crate::repositories::questions::list_by_exam(ctx.state.db(), exam_id)
        .await
        .expect("list questions");
    assert!(remaining.is_empty());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/exams/{exam_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_exam_payload_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let admin = test_support::insert_admin(ctx.state.db(), "admin", "admin-pass").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exams",
            Some(&token),
            Some(json!({"title": "", "duration": 10, "course": "CS"})),
        ))
        .await
        .expect("create exam");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
