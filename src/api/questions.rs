use axum::{
    extract::{Path, State},
    routing::put,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::exams::helpers::ensure_expected_answer;
use crate::api::guards::CurrentAdmin;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::exam::QuestionUpdate;
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:question_id", put(update_question).delete(delete_question))
}

async fn update_question(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Json(payload): Json<QuestionUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    ensure_expected_answer(&payload.expected_answer)?;

    let updated = repositories::questions::update(
        state.db(),
        question_id,
        repositories::questions::QuestionFields {
            question_text: &payload.question_text,
            question_type: payload.question_type,
            expected_answer: &payload.expected_answer,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?;

    if !updated {
        return Err(ApiError::NotFound("Question not found"));
    }

    tracing::info!(
        question_id,
        question_type = payload.question_type.as_str(),
        admin_id = %admin.id,
        "Question updated"
    );
    Ok(Json(MessageResponse::new("Question updated successfully")))
}

/// Existing submissions keep their stored score.
async fn delete_question(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::questions::delete_by_id(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    if !deleted {
        return Err(ApiError::NotFound("Question not found"));
    }

    tracing::info!(question_id, admin_id = %admin.id, "Question deleted");
    Ok(Json(MessageResponse::new("Question deleted successfully")))
}
