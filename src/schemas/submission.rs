use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::time::format_primitive;
use crate::repositories::submissions::{StudentSubmissionRow, SubmissionDetailRow};

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) answers: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) message: String,
    pub(crate) score: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionListQuery {
    pub(crate) exam_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminSubmissionResponse {
    pub(crate) id: i64,
    pub(crate) student: String,
    pub(crate) student_name: String,
    pub(crate) exam: i64,
    pub(crate) exam_title: String,
    pub(crate) exam_course: String,
    pub(crate) answers: Map<String, Value>,
    pub(crate) score: f64,
    pub(crate) created_at: String,
}

impl AdminSubmissionResponse {
    pub(crate) fn from_row(row: SubmissionDetailRow) -> Self {
        Self {
            id: row.id,
            student: row.student_id,
            student_name: row.student_name,
            exam: row.exam_id,
            exam_title: row.exam_title,
            exam_course: row.exam_course,
            answers: row.answers.0,
            score: row.score,
            created_at: format_primitive(row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSubmissionResponse {
    pub(crate) student_name: String,
    pub(crate) exam_title: String,
    pub(crate) exam_course: String,
    pub(crate) score: f64,
    pub(crate) created_at: String,
}

impl StudentSubmissionResponse {
    pub(crate) fn from_row(row: StudentSubmissionRow) -> Self {
        Self {
            student_name: row.student_name,
            exam_title: row.exam_title,
            exam_course: row.exam_course,
            score: row.score,
            created_at: format_primitive(row.created_at),
        }
    }
}
