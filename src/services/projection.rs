// src/services/projection.rs

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::QuizResult,
    models::{
        answer::{Answer, AnswerView},
        question::{Question, QuestionView},
        quiz::{Quiz, QuizView},
    },
};

/// Which audience a projection is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Answers carry `is_correct`.
    Teacher,
    /// `is_correct` is left out entirely.
    Student,
}

impl Audience {
    pub fn include_correct(self) -> bool {
        matches!(self, Audience::Teacher)
    }
}

/// Looks up a quiz scoped to its course.
pub async fn find_quiz(
    conn: &mut SqliteConnection,
    course_id: i64,
    quiz_id: i64,
) -> QuizResult<Option<Quiz>> {
    let quiz = sqlx::query_as::<_, Quiz>(
        "SELECT quiz_id, course_id, title FROM quizzes WHERE course_id = $1 AND quiz_id = $2",
    )
    .bind(course_id)
    .bind(quiz_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(quiz)
}

/// Lists every quiz of a course in creation order.
pub async fn list_by_course(pool: &SqlitePool, course_id: i64) -> QuizResult<Vec<Quiz>> {
    let quizzes = sqlx::query_as::<_, Quiz>(
        "SELECT quiz_id, course_id, title FROM quizzes WHERE course_id = $1 ORDER BY quiz_id ASC",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(quizzes)
}

/// Assembles a quiz with its questions and answers in positional order.
///
/// Runs on whatever connection it is given, so authoring can project the
/// tree it just wrote before committing.
/// Returns `None` when the quiz does not exist in that course.
pub async fn project(
    conn: &mut SqliteConnection,
    course_id: i64,
    quiz_id: i64,
    audience: Audience,
) -> QuizResult<Option<QuizView>> {
    let Some(quiz) = find_quiz(conn, course_id, quiz_id).await? else {
        return Ok(None);
    };

    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT quiz_id, question_number, question_text, question_points
        FROM questions
        WHERE quiz_id = $1
        ORDER BY question_number ASC
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let answers = sqlx::query_as::<_, Answer>(
        r#"
        SELECT quiz_id, question_number, answer_number, answer_text, is_correct
        FROM answers
        WHERE quiz_id = $1
        ORDER BY question_number ASC, answer_number ASC
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut views: Vec<QuestionView> = questions.into_iter().map(QuestionView::from).collect();
    let index: HashMap<i64, usize> = views
        .iter()
        .enumerate()
        .map(|(i, q)| (q.question_number, i))
        .collect();

    let include_correct = audience.include_correct();
    for answer in answers {
        if let Some(&i) = index.get(&answer.question_number) {
            views[i].answers.push(AnswerView::from_row(answer, include_correct));
        }
    }

    Ok(Some(QuizView {
        quiz_id: quiz.quiz_id,
        course_id: quiz.course_id,
        title: quiz.title,
        questions: views,
    }))
}
