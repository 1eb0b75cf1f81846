use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::db::models::Question;
use crate::db::types::QuestionType;

const COLUMNS: &str = "id, exam_id, question_text, question_type, expected_answer";

pub(crate) struct QuestionFields<'a> {
    pub(crate) question_text: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) expected_answer: &'a serde_json::Value,
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    exam_id: i64,
    fields: QuestionFields<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (exam_id, question_text, question_type, expected_answer)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(exam_id)
    .bind(fields.question_text)
    .bind(fields.question_type)
    .bind(Json(fields.expected_answer))
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_exam(
    executor: impl PgExecutor<'_>,
    exam_id: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE exam_id = $1 ORDER BY id"
    ))
    .bind(exam_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_by_exams(
    pool: &PgPool,
    exam_ids: &[i64],
) -> Result<Vec<Question>, sqlx::Error> {
    if exam_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE exam_id = ANY($1) ORDER BY exam_id, id"
    ))
    .bind(exam_ids)
    .fetch_all(pool)
    .await
}

/// Returns `false` when no question has the given id.
pub(crate) async fn update(
    pool: &PgPool,
    id: i64,
    fields: QuestionFields<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE questions
         SET question_text = $1, question_type = $2, expected_answer = $3
         WHERE id = $4",
    )
    .bind(fields.question_text)
    .bind(fields.question_type)
    .bind(Json(fields.expected_answer))
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
