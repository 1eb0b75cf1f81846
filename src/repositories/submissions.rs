use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Submission;

const COLUMNS: &str = "id, student_id, exam_id, answers, score, created_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SubmissionDetailRow {
    pub(crate) id: i64,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) exam_id: i64,
    pub(crate) exam_title: String,
    pub(crate) exam_course: String,
    pub(crate) answers: Json<serde_json::Map<String, serde_json::Value>>,
    pub(crate) score: f64,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StudentSubmissionRow {
    pub(crate) student_name: String,
    pub(crate) exam_title: String,
    pub(crate) exam_course: String,
    pub(crate) score: f64,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn find_by_student_and_exam(
    executor: impl PgExecutor<'_>,
    student_id: &str,
    exam_id: i64,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE student_id = $1 AND exam_id = $2"
    ))
    .bind(student_id)
    .bind(exam_id)
    .fetch_optional(executor)
    .await
}

/// Inserts the submission with a zero score. Returns `None` when the student
/// already has a submission for this exam.
pub(crate) async fn create_if_absent(
    executor: impl PgExecutor<'_>,
    student_id: &str,
    exam_id: i64,
    answers: &serde_json::Map<String, serde_json::Value>,
    created_at: PrimitiveDateTime,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (student_id, exam_id, answers, score, created_at)
         VALUES ($1,$2,$3,0,$4)
         ON CONFLICT (student_id, exam_id) DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(student_id)
    .bind(exam_id)
    .bind(Json(answers))
    .bind(created_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn set_score(
    executor: impl PgExecutor<'_>,
    id: i64,
    score: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE submissions SET score = $1 WHERE id = $2")
        .bind(score)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn list_detailed(
    pool: &PgPool,
    exam_id: Option<i64>,
) -> Result<Vec<SubmissionDetailRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT s.id,
                s.student_id,
                u.username AS student_name,
                s.exam_id,
                e.title AS exam_title,
                e.course AS exam_course,
                s.answers,
                s.score,
                s.created_at
         FROM submissions s
         JOIN users u ON u.id = s.student_id
         JOIN exams e ON e.id = s.exam_id",
    );

    if let Some(exam_id) = exam_id {
        builder.push(" WHERE s.exam_id = ");
        builder.push_bind(exam_id);
    }

    builder.push(" ORDER BY s.created_at DESC, s.id DESC");

    builder.build_query_as::<SubmissionDetailRow>().fetch_all(pool).await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<StudentSubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentSubmissionRow>(
        "SELECT u.username AS student_name,
                e.title AS exam_title,
                e.course AS exam_course,
                s.score,
                s.created_at
         FROM submissions s
         JOIN users u ON u.id = s.student_id
         JOIN exams e ON e.id = s.exam_id
         WHERE s.student_id = $1
         ORDER BY s.created_at DESC, s.id DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}
