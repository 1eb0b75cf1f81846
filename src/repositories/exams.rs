use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Exam;

pub(crate) const COLUMNS: &str = "id, title, duration, course, metadata, created_at, updated_at";

pub(crate) struct CreateExam<'a> {
    pub(crate) title: &'a str,
    pub(crate) duration: i32,
    pub(crate) course: &'a str,
    pub(crate) metadata: Option<serde_json::Value>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl PgExecutor<'_>,
    params: CreateExam<'_>,
) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (title, duration, course, metadata, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.duration)
    .bind(params.course)
    .bind(params.metadata.map(Json))
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams ORDER BY id"))
        .fetch_all(pool)
        .await
}

pub(crate) struct UpdateExam {
    pub(crate) title: String,
    pub(crate) duration: i32,
    pub(crate) course: String,
    pub(crate) metadata: Option<serde_json::Value>,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Returns `false` when no exam has the given id.
pub(crate) async fn update(pool: &PgPool, id: i64, params: UpdateExam) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE exams
         SET title = $1, duration = $2, course = $3, metadata = $4, updated_at = $5
         WHERE id = $6",
    )
    .bind(params.title)
    .bind(params.duration)
    .bind(params.course)
    .bind(params.metadata.map(Json))
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Questions and submissions go with the exam through `ON DELETE CASCADE`.
pub(crate) async fn delete_by_id(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
