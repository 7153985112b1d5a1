// src/services/quiz.rs

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::{QuizError, QuizResult},
    models::{
        attempt::{Attempt, CourseScore, GradeResult, SubmittedAnswer},
        identity::{Identity, Role},
        quiz::{Quiz, QuizPayload, QuizView},
    },
    services::{
        authoring::QuizAuthoring,
        grading::QuizGrader,
        ownership::{CourseOwnership, SqlCourseOwnership, ensure_can_author},
        projection::{self, Audience},
    },
    validation,
};

/// Entry points for quiz authoring, submission and reads.
///
/// Callers hand in the verified identity. Role and course ownership are
/// checked here, then validation, then the transactional core.
#[derive(Clone)]
pub struct QuizService {
    pool: SqlitePool,
    authoring: QuizAuthoring,
    grader: QuizGrader,
    ownership: Arc<dyn CourseOwnership>,
}

impl QuizService {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        let ownership = Arc::new(SqlCourseOwnership::new(pool.clone()));
        Self::with_ownership(pool, config, ownership)
    }

    pub fn with_ownership(
        pool: SqlitePool,
        config: &Config,
        ownership: Arc<dyn CourseOwnership>,
    ) -> Self {
        Self {
            authoring: QuizAuthoring::new(pool.clone(), config.transaction_timeout),
            grader: QuizGrader::new(pool.clone(), config.transaction_timeout),
            pool,
            ownership,
        }
    }

    /// Teacher: create a quiz with its questions and answers.
    #[tracing::instrument(skip(self, payload), fields(user_id = identity.user_id))]
    pub async fn create_quiz(
        &self,
        identity: &Identity,
        course_id: i64,
        payload: &QuizPayload,
    ) -> QuizResult<QuizView> {
        ensure_can_author(self.ownership.as_ref(), identity, course_id).await?;
        let quiz = validation::validated(payload)?;
        self.authoring.create(course_id, &quiz).await
    }

    /// Teacher: update the title and replace every question and answer.
    #[tracing::instrument(skip(self, payload), fields(user_id = identity.user_id))]
    pub async fn replace_quiz(
        &self,
        identity: &Identity,
        course_id: i64,
        quiz_id: i64,
        payload: &QuizPayload,
    ) -> QuizResult<QuizView> {
        ensure_can_author(self.ownership.as_ref(), identity, course_id).await?;
        let quiz = validation::validated(payload)?;
        self.authoring.replace_all(course_id, quiz_id, &quiz).await
    }

    /// Teacher: delete a quiz together with its attempts, answers and questions.
    #[tracing::instrument(skip(self), fields(user_id = identity.user_id))]
    pub async fn delete_quiz(
        &self,
        identity: &Identity,
        course_id: i64,
        quiz_id: i64,
    ) -> QuizResult<()> {
        ensure_can_author(self.ownership.as_ref(), identity, course_id).await?;
        if self.authoring.delete(course_id, quiz_id).await? {
            Ok(())
        } else {
            Err(QuizError::quiz_not_found(course_id, quiz_id))
        }
    }

    /// Student: grade a submission and record it as the student's attempt.
    #[tracing::instrument(skip(self, answers), fields(user_id = identity.user_id))]
    pub async fn submit_quiz(
        &self,
        identity: &Identity,
        course_id: i64,
        quiz_id: i64,
        answers: &[SubmittedAnswer],
    ) -> QuizResult<GradeResult> {
        if identity.role != Role::Student {
            tracing::warn!(user_id = identity.user_id, "Submission denied for non-student");
            return Err(QuizError::Forbidden("Student role required".to_string()));
        }
        self.grader
            .grade(course_id, quiz_id, identity.user_id, answers)
            .await
    }

    pub async fn list_quizzes_for_course(&self, course_id: i64) -> QuizResult<Vec<Quiz>> {
        projection::list_by_course(&self.pool, course_id).await
    }

    /// Students get the redacted view. Teachers must own the course and get correctness flags.
    #[tracing::instrument(skip(self), fields(user_id = identity.user_id))]
    pub async fn get_quiz(
        &self,
        identity: &Identity,
        course_id: i64,
        quiz_id: i64,
    ) -> QuizResult<QuizView> {
        let audience = match identity.role {
            Role::Student => Audience::Student,
            Role::Teacher | Role::Admin => {
                ensure_can_author(self.ownership.as_ref(), identity, course_id).await?;
                Audience::Teacher
            }
        };

        let mut conn = self.pool.acquire().await?;
        projection::project(&mut conn, course_id, quiz_id, audience)
            .await?
            .ok_or_else(|| QuizError::quiz_not_found(course_id, quiz_id))
    }

    /// A student's stored attempt. Students may only read their own.
    pub async fn attempt(
        &self,
        identity: &Identity,
        course_id: i64,
        quiz_id: i64,
        student_id: i64,
    ) -> QuizResult<Option<Attempt>> {
        self.ensure_can_read_scores(identity, course_id, student_id).await?;
        self.grader.attempt(course_id, quiz_id, student_id).await
    }

    /// Best attempts of a quiz.
    pub async fn leaderboard(
        &self,
        course_id: i64,
        quiz_id: i64,
        limit: i64,
    ) -> QuizResult<Vec<Attempt>> {
        self.grader.leaderboard(course_id, quiz_id, limit.max(0)).await
    }

    /// Total of a student's attempts across a course. Students may only read their own.
    pub async fn course_score(
        &self,
        identity: &Identity,
        course_id: i64,
        student_id: i64,
    ) -> QuizResult<CourseScore> {
        self.ensure_can_read_scores(identity, course_id, student_id).await?;
        self.grader.course_score(course_id, student_id).await
    }

    async fn ensure_can_read_scores(
        &self,
        identity: &Identity,
        course_id: i64,
        student_id: i64,
    ) -> QuizResult<()> {
        match identity.role {
            Role::Student if identity.user_id == student_id => Ok(()),
            Role::Student => Err(QuizError::Forbidden(
                "Students can only read their own scores".to_string(),
            )),
            Role::Teacher | Role::Admin => {
                ensure_can_author(self.ownership.as_ref(), identity, course_id).await
            }
        }
    }
}
