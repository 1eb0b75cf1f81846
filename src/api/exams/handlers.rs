use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::helpers::{ensure_expected_answer, fetch_exam, insert_questions};
use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Question;
use crate::repositories;
use crate::schemas::exam::{
    AdminExamResponse, ExamCreate, ExamCreatedResponse, ExamUpdate, StudentExamResponse,
};
use crate::schemas::submission::{SubmitRequest, SubmitResponse};
use crate::schemas::MessageResponse;
use crate::services::grading::{self, AnswerSheet, QuestionKey};

const ALREADY_SUBMITTED: &str = "You have already submitted this exam.";

pub(super) async fn create_exam(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ExamCreate>,
) -> Result<(StatusCode, Json<ExamCreatedResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    for question in &payload.questions {
        ensure_expected_answer(&question.expected_answer)?;
    }

    let now = primitive_now_utc();
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let exam = repositories::exams::create(
        &mut *tx,
        repositories::exams::CreateExam {
            title: &payload.title,
            duration: payload.duration,
            course: &payload.course,
            metadata: payload.metadata.clone(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    let questions = insert_questions(&mut tx, exam.id, &payload.questions).await?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit exam"))?;

    tracing::info!(
        exam_id = exam.id,
        admin_id = %admin.id,
        questions = questions.len(),
        "Exam created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ExamCreatedResponse { message: "Exam created".to_string(), exam_id: exam.id }),
    ))
}

pub(super) async fn list_exams(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminExamResponse>>, ApiError> {
    let exams = repositories::exams::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    let exam_ids: Vec<i64> = exams.iter().map(|exam| exam.id).collect();
    let questions = repositories::questions::list_by_exams(state.db(), &exam_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    let mut by_exam: HashMap<i64, Vec<Question>> = HashMap::new();
    for question in questions {
        by_exam.entry(question.exam_id).or_default().push(question);
    }

    let response = exams
        .into_iter()
        .map(|exam| {
            let questions = by_exam.remove(&exam.id).unwrap_or_default();
            AdminExamResponse::from_db(exam, questions)
        })
        .collect();

    Ok(Json(response))
}

pub(super) async fn get_exam(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> Result<Json<StudentExamResponse>, ApiError> {
    let exam = fetch_exam(&state, exam_id).await?;
    let questions = repositories::questions::list_by_exam(state.db(), exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    Ok(Json(StudentExamResponse::from_db(exam, questions)))
}

pub(super) async fn update_exam(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
    Json(payload): Json<ExamUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam = fetch_exam(&state, exam_id).await?;
    let metadata = match payload.metadata {
        Some(metadata) => metadata,
        None => exam.metadata.map(|metadata| metadata.0),
    };

    let updated = repositories::exams::update(
        state.db(),
        exam.id,
        repositories::exams::UpdateExam {
            title: payload.title,
            duration: payload.duration,
            course: payload.course,
            metadata,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam"))?;

    if !updated {
        return Err(ApiError::NotFound("Exam not found"));
    }

    tracing::info!(exam_id, admin_id = %admin.id, "Exam updated");
    Ok(Json(MessageResponse::new("Exam updated successfully")))
}

pub(super) async fn delete_exam(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::exams::delete_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    if !deleted {
        return Err(ApiError::NotFound("Exam not found"));
    }

    tracing::info!(exam_id, admin_id = %admin.id, "Exam deleted");
    Ok(Json(MessageResponse::new("Exam deleted successfully")))
}

fn already_submitted(score: f64) -> (StatusCode, Json<SubmitResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(SubmitResponse { message: ALREADY_SUBMITTED.to_string(), score }),
    )
}

/// Stores the student's answers, grades them against the exam's current questions
/// and persists the score, all in one transaction.
pub(super) async fn submit_exam(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
    Json(payload): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let exam = fetch_exam(&state, exam_id).await?;

    let existing =
        repositories::submissions::find_by_student_and_exam(state.db(), &user.id, exam.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing submission"))?;
    if let Some(existing) = existing {
        return Ok(already_submitted(existing.score));
    }

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let created = repositories::submissions::create_if_absent(
        &mut *tx,
        &user.id,
        exam.id,
        &payload.answers,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create submission"))?;

    let Some(submission) = created else {
        // A concurrent request for the same student and exam won the insert.
        tx.rollback().await.map_err(|e| ApiError::internal(e, "Failed to roll back"))?;
        let winner =
            repositories::submissions::find_by_student_and_exam(state.db(), &user.id, exam.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load existing submission"))?;
        return Ok(already_submitted(winner.map_or(0.0, |submission| submission.score)));
    };

    let questions = repositories::questions::list_by_exam(&mut *tx, exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;
    let keys: Vec<QuestionKey> = questions.iter().map(QuestionKey::from_question).collect();
    let report = grading::grade(&keys, &AnswerSheet::from_map(&payload.answers));

    repositories::submissions::set_score(&mut *tx, submission.id, report.score)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store score"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit submission"))?;

    metrics::record_graded_submission(report.score);
    tracing::info!(
        submission_id = submission.id,
        exam_id = exam.id,
        student_id = %user.id,
        total = report.total,
        answered = report.answered,
        correct = report.correct,
        score = report.score,
        "Submission graded"
    );

    Ok((
        StatusCode::OK,
        Json(SubmitResponse { message: "Submitted successfully".to_string(), score: report.score }),
    ))
}
