use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::submission::{
    AdminSubmissionResponse, StudentSubmissionResponse, SubmissionListQuery,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_submissions))
        .route("/mine", get(list_my_submissions))
}

/// Every submission with student and exam labels, newest first.
async fn list_submissions(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<Vec<AdminSubmissionResponse>>, ApiError> {
    let rows = repositories::submissions::list_detailed(state.db(), query.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(rows.into_iter().map(AdminSubmissionResponse::from_row).collect()))
}

async fn list_my_submissions(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentSubmissionResponse>>, ApiError> {
    let rows = repositories::submissions::list_for_student(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(rows.into_iter().map(StudentSubmissionResponse::from_row).collect()))
}
