//! Automatic scoring of exam submissions.
//!
//! Expected answers are decoded once into an [`AnswerKey`] when question rows are
//! loaded, and student answers into a [`SubmittedAnswer`]; grading itself is a pure
//! pass over the exam's questions.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::db::models::Question;
use crate::db::types::QuestionType;

/// Share of reference keywords a text answer must contain to count as correct.
pub(crate) const KEYWORD_MATCH_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AnswerKey {
    /// Lowercased, whitespace-split words of the reference phrase.
    Keywords(Vec<String>),
    /// Trimmed, case-folded and sorted acceptable options.
    Choices(Vec<String>),
    /// Options that could not be decoded. Never matches.
    MalformedChoices,
}

impl AnswerKey {
    pub(crate) fn decode(question_type: QuestionType, expected: &Value) -> Self {
        match question_type {
            QuestionType::Text => {
                let phrase = stringify(expected).trim().to_lowercase();
                Self::Keywords(phrase.split_whitespace().map(str::to_string).collect())
            }
            QuestionType::Mcq => match decode_options(expected) {
                Some(options) => Self::Choices(normalize_choices(&options)),
                None => Self::MalformedChoices,
            },
        }
    }
}

/// A question reduced to what grading needs.
#[derive(Debug, Clone)]
pub(crate) struct QuestionKey {
    pub(crate) id: i64,
    pub(crate) key: AnswerKey,
}

impl QuestionKey {
    pub(crate) fn from_question(question: &Question) -> Self {
        let key = AnswerKey::decode(question.question_type, &question.expected_answer.0);
        if key == AnswerKey::MalformedChoices {
            tracing::warn!(
                question_id = question.id,
                exam_id = question.exam_id,
                "Multiple-choice question has an unreadable expected answer"
            );
        }
        Self { id: question.id, key }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SubmittedAnswer {
    Text(String),
    Choices(Vec<String>),
}

impl SubmittedAnswer {
    /// `null` is treated the same as a missing answer.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(Self::Choices(items.iter().map(stringify).collect())),
            other => Some(Self::Text(stringify(other))),
        }
    }

    fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Choices(items) => items.join(" "),
        }
    }
}

/// Student answers keyed by the question id rendered as a string.
#[derive(Debug, Clone, Default)]
pub(crate) struct AnswerSheet {
    answers: HashMap<String, SubmittedAnswer>,
}

impl AnswerSheet {
    pub(crate) fn from_map(raw: &Map<String, Value>) -> Self {
        let answers = raw
            .iter()
            .filter_map(|(key, value)| {
                SubmittedAnswer::from_value(value).map(|answer| (key.clone(), answer))
            })
            .collect();
        Self { answers }
    }

    pub(crate) fn answer_for(&self, question_id: i64) -> Option<&SubmittedAnswer> {
        self.answers.get(&question_id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GradeReport {
    pub(crate) total: usize,
    pub(crate) answered: usize,
    pub(crate) correct: usize,
    pub(crate) score: f64,
}

/// Scores a sheet as the percentage of correctly answered questions, rounded to
/// two decimals. Unanswered questions still count towards the total.
pub(crate) fn grade(questions: &[QuestionKey], sheet: &AnswerSheet) -> GradeReport {
    let total = questions.len();
    if total == 0 {
        return GradeReport { total, answered: 0, correct: 0, score: 0.0 };
    }

    let mut answered = 0;
    let mut correct = 0;

    for question in questions {
        let Some(answer) = sheet.answer_for(question.id) else {
            continue;
        };
        answered += 1;

        if is_correct(&question.key, answer) {
            correct += 1;
        }
    }

    GradeReport { total, answered, correct, score: percentage(correct, total) }
}

fn is_correct(key: &AnswerKey, answer: &SubmittedAnswer) -> bool {
    match key {
        AnswerKey::Keywords(keywords) => keywords_match(keywords, &answer.as_text()),
        AnswerKey::Choices(expected) => match answer {
            SubmittedAnswer::Choices(selected) => normalize_choices(selected) == *expected,
            SubmittedAnswer::Text(_) => false,
        },
        AnswerKey::MalformedChoices => false,
    }
}

fn keywords_match(keywords: &[String], answer: &str) -> bool {
    if keywords.is_empty() {
        return true;
    }

    let answer = answer.trim().to_lowercase();
    let matched = keywords.iter().filter(|keyword| answer.contains(keyword.as_str())).count();

    matched as f64 / keywords.len() as f64 >= KEYWORD_MATCH_THRESHOLD
}

fn decode_options(expected: &Value) -> Option<Vec<String>> {
    match expected {
        Value::Array(items) => Some(items.iter().map(stringify).collect()),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => Some(items.iter().map(stringify).collect()),
            _ => None,
        },
        _ => None,
    }
}

fn normalize_choices(options: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> =
        options.iter().map(|option| option.trim().to_lowercase()).collect();
    normalized.sort();
    normalized
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Rounds on the exact binary value, so ties such as 3.125 go to the even cent.
fn percentage(correct: usize, total: usize) -> f64 {
    let percent = correct as f64 / total as f64 * 100.0;
    format!("{percent:.2}").parse().unwrap_or(percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(id: i64, expected: &str) -> QuestionKey {
        QuestionKey { id, key: AnswerKey::decode(QuestionType::Text, &json!(expected)) }
    }

    fn mcq(id: i64, expected: Value) -> QuestionKey {
        QuestionKey { id, key: AnswerKey::decode(QuestionType::Mcq, &expected) }
    }

    fn score(questions: &[QuestionKey], sheet: &AnswerSheet) -> f64 {
        grade(questions, sheet).score
    }

    fn sheet(answers: Value) -> AnswerSheet {
        AnswerSheet::from_map(answers.as_object().expect("answers object"))
    }

    #[test]
    fn exam_without_questions_scores_zero() {
        assert_eq!(score(&[], &sheet(json!({"1": "anything"}))), 0.0);
    }

    #[test]
    fn unanswered_exam_scores_zero() {
        let questions = vec![text(1, "paris"), mcq(2, json!(["A"]))];
        assert_eq!(score(&questions, &sheet(json!({}))), 0.0);
    }

    #[test]
    fn exact_answers_score_full_marks() {
        let questions = vec![text(1, "Ownership and borrowing"), mcq(2, json!(["A", "C"]))];
        let answers = sheet(json!({"1": "Ownership and borrowing", "2": ["C", "A"]}));

        assert_eq!(score(&questions, &answers), 100.0);
    }

    #[test]
    fn text_keywords_match_case_insensitive_substrings() {
        let questions = vec![text(1, "A variable stores data")];
        let answers = sheet(json!({"1": "a VARIABLE   stores   data today"}));

        assert_eq!(score(&questions, &answers), 100.0);
    }

    #[test]
    fn text_below_threshold_is_wrong() {
        let questions = vec![text(1, "apple banana cherry")];
        assert_eq!(score(&questions, &sheet(json!({"1": "apple"}))), 0.0);
    }

    #[test]
    fn text_threshold_is_inclusive() {
        let questions = vec![text(1, "one two three four five")];
        let answers = sheet(json!({"1": "one two three"}));

        assert_eq!(score(&questions, &answers), 100.0);
    }

    #[test]
    fn text_keywords_match_inside_longer_words() {
        let questions = vec![text(1, "cat")];
        assert_eq!(score(&questions, &sheet(json!({"1": "concatenate"}))), 100.0);
    }

    #[test]
    fn empty_reference_phrase_accepts_any_answer() {
        let questions = vec![text(1, "   ")];
        assert_eq!(score(&questions, &sheet(json!({"1": "whatever"}))), 100.0);
    }

    #[test]
    fn mcq_ignores_order_whitespace_and_case() {
        let questions = vec![mcq(1, json!(["A", "B"]))];
        assert_eq!(score(&questions, &sheet(json!({"1": ["b", " a "]}))), 100.0);
    }

    #[test]
    fn mcq_accepts_json_encoded_expected_list() {
        let questions = vec![mcq(1, json!("[\"x\", \"y\"]"))];
        assert_eq!(score(&questions, &sheet(json!({"1": ["y", "x"]}))), 100.0);
    }

    #[test]
    fn mcq_requires_same_multiset() {
        let questions = vec![mcq(1, json!(["A", "B"]))];

        assert_eq!(score(&questions, &sheet(json!({"1": ["A"]}))), 0.0);
        assert_eq!(score(&questions, &sheet(json!({"1": ["A", "B", "B"]}))), 0.0);
    }

    #[test]
    fn mcq_plain_string_answer_is_skipped_but_counted() {
        let questions = vec![mcq(1, json!(["A"])), text(2, "rust")];
        let answers = sheet(json!({"1": "A", "2": "rust"}));
        let report = grade(&questions, &answers);

        assert_eq!(report.correct, 1);
        assert_eq!(report.total, 2);
        assert_eq!(report.score, 50.0);
    }

    #[test]
    fn malformed_mcq_key_never_matches() {
        assert_eq!(
            AnswerKey::decode(QuestionType::Mcq, &json!("not json")),
            AnswerKey::MalformedChoices
        );
        assert_eq!(AnswerKey::decode(QuestionType::Mcq, &json!(7)), AnswerKey::MalformedChoices);

        let questions = vec![mcq(1, json!("{\"a\": 1}"))];
        assert_eq!(score(&questions, &sheet(json!({"1": []}))), 0.0);
    }

    #[test]
    fn non_string_options_are_stringified() {
        let questions = vec![mcq(1, json!([1, 2]))];
        assert_eq!(score(&questions, &sheet(json!({"1": ["2", "1"]}))), 100.0);
    }

    #[test]
    fn null_answer_counts_as_unanswered() {
        let questions = vec![text(1, "anything")];
        let report = grade(&questions, &sheet(json!({"1": null})));

        assert_eq!(report.answered, 0);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn partial_exam_rounds_to_two_decimals() {
        let questions = vec![text(1, "alpha"), text(2, "beta"), mcq(3, json!(["C"]))];
        let answers = sheet(json!({"1": "alpha", "3": ["C"]}));

        assert_eq!(score(&questions, &answers), 66.67);
    }

    #[test]
    fn half_cent_ties_round_to_even() {
        let questions: Vec<QuestionKey> = (1..=32).map(|id| text(id, "key")).collect();
        let answered = |count: i64| {
            let raw: Map<String, Value> =
                (1..=count).map(|id| (id.to_string(), json!("key"))).collect();
            score(&questions, &AnswerSheet::from_map(&raw))
        };

        assert_eq!(answered(1), 3.12);
        assert_eq!(answered(3), 9.38);
        assert_eq!(answered(5), 15.62);
    }

    #[test]
    fn answers_for_unknown_questions_are_ignored() {
        let questions = vec![text(1, "alpha")];
        let answers = sheet(json!({"1": "alpha", "99": "stray"}));

        assert_eq!(score(&questions, &answers), 100.0);
    }

    #[test]
    fn scores_stay_within_bounds_with_two_decimals() {
        for total in 1..=12_i64 {
            let questions: Vec<QuestionKey> = (1..=total).map(|id| text(id, "key")).collect();
            for answered in 0..=total {
                let mut raw = Map::new();
                for id in 1..=answered {
                    raw.insert(id.to_string(), json!("key"));
                }
                let pct = score(&questions, &AnswerSheet::from_map(&raw));

                assert!((0.0..=100.0).contains(&pct), "score {pct} out of range");
                assert!(((pct * 100.0).round() - pct * 100.0).abs() < 1e-6);
            }
        }
    }
}
