// src/validation.rs

//! Structural checks for quiz authoring payloads.
//!
//! Checks never stop at the first defect: the report lists every missing
//! field and every structural issue so the caller can show them together.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use validator::ValidateLength;

use crate::{
    error::{QuizError, QuizResult},
    models::{
        answer::NewAnswer,
        question::{NewQuestion, QuestionPayload},
        quiz::{NewQuiz, QuizPayload},
    },
};

/// Longest accepted quiz title, in characters.
pub const MAX_TITLE_LENGTH: u64 = 50;

/// Largest accepted point value for a single question.
pub const MAX_POINTS: i64 = i32::MAX as i64;

/// Minimum number of answers per question.
pub const MIN_ANSWERS: usize = 2;

/// Every defect found in an authoring payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub missing_required: Vec<String>,
    pub structural_issues: Vec<String>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.missing_required.is_empty() && self.structural_issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing_required.is_empty() {
            parts.push(format!("missing required: {}", self.missing_required.join(", ")));
        }
        if !self.structural_issues.is_empty() {
            parts.push(format!("structural issues: {}", self.structural_issues.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Outcome of reading a point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Points {
    Missing,
    Invalid,
    Fractional,
    TooLarge,
    Valid(i64),
}

/// Numbers and numeric strings are accepted; anything else is invalid.
fn read_points(value: Option<&Value>) -> Points {
    let number = match value {
        None | Some(Value::Null) => return Points::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => return Points::Missing,
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return Points::Invalid,
        },
        Some(Value::Number(n)) => match n.as_f64() {
            Some(n) => n,
            None => return Points::Invalid,
        },
        Some(_) => return Points::Invalid,
    };

    if !number.is_finite() || number < 0.0 {
        Points::Invalid
    } else if number.fract() != 0.0 {
        Points::Fractional
    } else if number > MAX_POINTS as f64 {
        Points::TooLarge
    } else {
        Points::Valid(number as i64)
    }
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|s| s.trim().is_empty())
}

/// Walks the payload once, recording defects and building the typed tree.
/// The tree is only complete when the report comes back empty.
fn inspect(payload: &QuizPayload) -> (ValidationReport, NewQuiz) {
    let mut report = ValidationReport::default();
    let mut quiz = NewQuiz {
        title: String::new(),
        questions: Vec::new(),
    };

    match payload.title.as_ref() {
        Some(title) if !title.trim().is_empty() => {
            quiz.title = title.trim().to_string();
            if !quiz.title.validate_length(None, Some(MAX_TITLE_LENGTH), None) {
                report
                    .structural_issues
                    .push(format!("title (max {})", MAX_TITLE_LENGTH));
            }
        }
        _ => report.missing_required.push("title".to_string()),
    }

    let questions = match payload.questions.as_deref() {
        Some(questions) if !questions.is_empty() => questions,
        _ => {
            report.missing_required.push("questions".to_string());
            return (report, quiz);
        }
    };

    for (i, question) in questions.iter().enumerate() {
        if let Some(built) = inspect_question(i, question, &mut report) {
            quiz.questions.push(built);
        }
    }

    (report, quiz)
}

fn inspect_question(
    i: usize,
    question: &QuestionPayload,
    report: &mut ValidationReport,
) -> Option<NewQuestion> {
    let issues_before = report.structural_issues.len();
    let label = format!("questions[{}]", i);

    if is_blank(question.question_text.as_ref()) {
        report.structural_issues.push(format!("{}.question_text", label));
    }

    let points = match read_points(question.question_points.as_ref()) {
        Points::Valid(points) => points,
        Points::Missing => {
            report
                .structural_issues
                .push(format!("{}.question_points is required", label));
            0
        }
        Points::Invalid => {
            report
                .structural_issues
                .push(format!("{}.question_points must be >= 0", label));
            0
        }
        Points::Fractional => {
            report
                .structural_issues
                .push(format!("{}.question_points must be a whole number", label));
            0
        }
        Points::TooLarge => {
            report
                .structural_issues
                .push(format!("{}.question_points (max {})", label, MAX_POINTS));
            0
        }
    };

    let answers = match question.answers.as_deref() {
        Some(answers) => answers,
        None => {
            report
                .structural_issues
                .push(format!("{}.answers (min {})", label, MIN_ANSWERS));
            return None;
        }
    };

    if answers.len() < MIN_ANSWERS {
        report
            .structural_issues
            .push(format!("{}.answers (min {})", label, MIN_ANSWERS));
    }

    let correct = answers.iter().filter(|a| a.marked_correct()).count();
    if correct != 1 {
        report
            .structural_issues
            .push(format!("{}.answers (exactly 1 correct)", label));
    }

    for (j, answer) in answers.iter().enumerate() {
        if is_blank(answer.answer_text.as_ref()) {
            report
                .structural_issues
                .push(format!("{}.answers[{}].answer_text", label, j));
        }
    }

    if report.structural_issues.len() > issues_before {
        return None;
    }

    Some(NewQuestion {
        text: question.question_text.as_deref().unwrap_or_default().trim().to_string(),
        points,
        answers: answers
            .iter()
            .map(|a| NewAnswer {
                text: a.answer_text.as_deref().unwrap_or_default().trim().to_string(),
                is_correct: a.marked_correct(),
            })
            .collect(),
    })
}

/// Reports every structural defect of an authoring payload. Pure, no I/O.
pub fn validate(payload: &QuizPayload) -> ValidationReport {
    inspect(payload).0
}

/// Validates the payload and returns the typed tree ready for persistence.
/// Any defect rejects the whole payload.
pub fn validated(payload: &QuizPayload) -> QuizResult<NewQuiz> {
    let (report, quiz) = inspect(payload);
    if report.is_empty() {
        Ok(quiz)
    } else {
        tracing::warn!("Rejected quiz payload: {}", report);
        Err(QuizError::Validation(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> QuizPayload {
        serde_json::from_value(value).unwrap()
    }

    fn valid_question() -> Value {
        json!({
            "question_text": "What does `?` do?",
            "question_points": 10,
            "answers": [
                { "answer_text": "Propagates errors", "is_correct": true },
                { "answer_text": "Panics", "is_correct": false }
            ]
        })
    }

    #[test]
    fn test_valid_payload_has_no_issues() {
        let p = payload(json!({ "title": "Errors", "questions": [valid_question()] }));
        let report = validate(&p);
        assert!(report.is_empty(), "{report}");

        let quiz = validated(&p).unwrap();
        assert_eq!(quiz.title, "Errors");
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].points, 10);
        assert!(quiz.questions[0].answers[0].is_correct);
        assert!(!quiz.questions[0].answers[1].is_correct);
    }

    #[test]
    fn test_missing_title_and_questions() {
        let report = validate(&payload(json!({ "title": "   " })));
        assert_eq!(report.missing_required, vec!["title", "questions"]);
        assert!(report.structural_issues.is_empty());

        let report = validate(&payload(json!({ "title": "T", "questions": [] })));
        assert_eq!(report.missing_required, vec!["questions"]);
    }

    #[test]
    fn test_legacy_title_field_is_accepted() {
        let p = payload(json!({ "quiz_title": "Legacy", "questions": [valid_question()] }));
        assert!(validate(&p).is_empty());
    }

    #[test]
    fn test_title_too_long() {
        let long = "x".repeat(51);
        let report = validate(&payload(json!({ "title": long, "questions": [valid_question()] })));
        assert_eq!(report.structural_issues, vec!["title (max 50)"]);
    }

    #[test]
    fn test_title_length_counts_trimmed_text() {
        let padded = format!("  {}  ", "x".repeat(50));
        let quiz = validated(&payload(json!({ "title": padded, "questions": [valid_question()] })))
            .unwrap();
        assert_eq!(quiz.title.len(), 50);
    }

    #[test]
    fn test_points_above_max_are_rejected() {
        for points in [json!("9000000000000000000"), json!(2147483648_i64), json!(1e300)] {
            let mut question = valid_question();
            question["question_points"] = points;
            let report = validate(&payload(json!({ "title": "T", "questions": [question] })));
            assert_eq!(
                report.structural_issues,
                vec!["questions[0].question_points (max 2147483647)"]
            );
        }

        let mut question = valid_question();
        question["question_points"] = json!(2147483647_i64);
        let quiz = validated(&payload(json!({ "title": "T", "questions": [question] }))).unwrap();
        assert_eq!(quiz.questions[0].points, MAX_POINTS);
    }

    #[test]
    fn test_reports_every_question_missing_answers() {
        let p = payload(json!({
            "title": "T",
            "questions": [
                { "question_text": "A", "question_points": 1 },
                { "question_text": "B", "question_points": 1 }
            ]
        }));
        let report = validate(&p);
        assert_eq!(
            report.structural_issues,
            vec!["questions[0].answers (min 2)", "questions[1].answers (min 2)"]
        );
    }

    #[test]
    fn test_points_messages() {
        let cases = [
            (Value::Null, "questions[0].question_points is required"),
            (json!(""), "questions[0].question_points is required"),
            (json!(-1), "questions[0].question_points must be >= 0"),
            (json!("abc"), "questions[0].question_points must be >= 0"),
            (json!("inf"), "questions[0].question_points must be >= 0"),
            (json!(true), "questions[0].question_points must be >= 0"),
            (json!(2.5), "questions[0].question_points must be a whole number"),
        ];

        for (points, expected) in cases {
            let mut question = valid_question();
            question["question_points"] = points;
            let report = validate(&payload(json!({ "title": "T", "questions": [question] })));
            assert_eq!(report.structural_issues, vec![expected]);
        }
    }

    #[test]
    fn test_numeric_string_points_are_accepted() {
        let mut question = valid_question();
        question["question_points"] = json!(" 7 ");
        let quiz = validated(&payload(json!({ "title": "T", "questions": [question] }))).unwrap();
        assert_eq!(quiz.questions[0].points, 7);
    }

    #[test]
    fn test_correct_count_must_be_exactly_one() {
        let mut none_correct = valid_question();
        none_correct["answers"][0]["is_correct"] = json!(false);

        let mut two_correct = valid_question();
        two_correct["answers"][1]["is_correct"] = json!(true);

        // Truthy values other than `true` do not count.
        let mut truthy = valid_question();
        truthy["answers"][0]["is_correct"] = json!("yes");

        let report = validate(&payload(json!({
            "title": "T",
            "questions": [none_correct, two_correct, truthy]
        })));
        assert_eq!(
            report.structural_issues,
            vec![
                "questions[0].answers (exactly 1 correct)",
                "questions[1].answers (exactly 1 correct)",
                "questions[2].answers (exactly 1 correct)",
            ]
        );
    }

    #[test]
    fn test_single_answer_reports_min_and_correct_count() {
        let p = payload(json!({
            "title": "T",
            "questions": [{
                "question_text": "Q",
                "question_points": 1,
                "answers": [{ "answer_text": "only", "is_correct": false }]
            }]
        }));
        let report = validate(&p);
        assert_eq!(
            report.structural_issues,
            vec!["questions[0].answers (min 2)", "questions[0].answers (exactly 1 correct)"]
        );
    }

    #[test]
    fn test_blank_texts_are_labelled() {
        let mut question = valid_question();
        question["question_text"] = json!(" ");
        question["answers"][1]["answer_text"] = json!("");
        let report = validate(&payload(json!({ "title": "T", "questions": [question] })));
        assert_eq!(
            report.structural_issues,
            vec!["questions[0].question_text", "questions[0].answers[1].answer_text"]
        );
    }

    #[test]
    fn test_validated_rejects_with_full_report() {
        let p = payload(json!({ "questions": [{ "question_text": "", "answers": [] }] }));
        match validated(&p) {
            Err(QuizError::Validation(report)) => {
                assert_eq!(report.missing_required, vec!["title"]);
                assert_eq!(report.structural_issues.len(), 4);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
