use serde_json::Value;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::{Exam, Question};
use crate::repositories;
use crate::schemas::exam::QuestionCreate;

pub(super) async fn fetch_exam(state: &AppState, exam_id: i64) -> Result<Exam, ApiError> {
    repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or(ApiError::NotFound("Exam not found"))
}

/// Expected answers are stored as JSON; `null` is the only value refused up front.
pub(crate) fn ensure_expected_answer(expected_answer: &Value) -> Result<(), ApiError> {
    if expected_answer.is_null() {
        return Err(ApiError::BadRequest("expected_answer may not be null".to_string()));
    }
    Ok(())
}

pub(super) async fn insert_questions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    exam_id: i64,
    questions: &[QuestionCreate],
) -> Result<Vec<Question>, ApiError> {
    let mut created = Vec::with_capacity(questions.len());

    for question in questions {
        let row = repositories::questions::create(
            &mut **tx,
            exam_id,
            repositories::questions::QuestionFields {
                question_text: &question.question_text,
                question_type: question.question_type,
                expected_answer: &question.expected_answer,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create question"))?;
        created.push(row);
    }

    Ok(created)
}
