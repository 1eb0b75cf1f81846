use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::db::models::{Exam, Question};
use crate::db::types::QuestionType;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) expected_answer: Value,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(range(min = 1, message = "duration must be at least one minute"))]
    pub(crate) duration: i32,
    #[validate(length(min = 1, max = 100))]
    pub(crate) course: String,
    #[serde(default)]
    pub(crate) metadata: Option<Value>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

/// Full replacement of an exam's own fields. Questions are edited individually.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamUpdate {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(range(min = 1, message = "duration must be at least one minute"))]
    pub(crate) duration: i32,
    #[validate(length(min = 1, max = 100))]
    pub(crate) course: String,
    /// `None` keeps the stored metadata, `Some(None)` clears it.
    #[serde(default, deserialize_with = "present")]
    pub(crate) metadata: Option<Option<Value>>,
}

pub(crate) type QuestionUpdate = QuestionCreate;

fn present<'de, D>(deserializer: D) -> Result<Option<Option<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminQuestionResponse {
    pub(crate) id: i64,
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) expected_answer: Value,
}

impl AdminQuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            question_text: question.question_text,
            question_type: question.question_type,
            expected_answer: question.expected_answer.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminExamResponse {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) duration: i32,
    pub(crate) course: String,
    pub(crate) metadata: Option<Value>,
    pub(crate) questions: Vec<AdminQuestionResponse>,
}

impl AdminExamResponse {
    pub(crate) fn from_db(exam: Exam, questions: Vec<Question>) -> Self {
        Self {
            id: exam.id,
            title: exam.title,
            duration: exam.duration,
            course: exam.course,
            metadata: exam.metadata.map(|metadata| metadata.0),
            questions: questions.into_iter().map(AdminQuestionResponse::from_db).collect(),
        }
    }
}

/// Question as shown to a student: the expected answer is never exposed.
#[derive(Debug, Serialize)]
pub(crate) struct StudentQuestionResponse {
    pub(crate) id: i64,
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentExamResponse {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) duration: i32,
    pub(crate) course: String,
    pub(crate) questions: Vec<StudentQuestionResponse>,
}

impl StudentExamResponse {
    pub(crate) fn from_db(exam: Exam, questions: Vec<Question>) -> Self {
        Self {
            id: exam.id,
            title: exam.title,
            duration: exam.duration,
            course: exam.course,
            questions: questions
                .into_iter()
                .map(|question| StudentQuestionResponse {
                    id: question.id,
                    question_text: question.question_text,
                    question_type: question.question_type,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamCreatedResponse {
    pub(crate) message: String,
    pub(crate) exam_id: i64,
}
