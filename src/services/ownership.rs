// src/services/ownership.rs

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    error::{QuizError, QuizResult},
    models::identity::{Identity, Role},
};

/// Answers who owns a course. Backed by the course catalogue.
#[async_trait]
pub trait CourseOwnership: Send + Sync {
    /// Teacher id owning the course, or `None` when the course does not exist.
    async fn course_owner(&self, course_id: i64) -> QuizResult<Option<i64>>;
}

/// Reads ownership from the `courses` table.
#[derive(Debug, Clone)]
pub struct SqlCourseOwnership {
    pool: SqlitePool,
}

impl SqlCourseOwnership {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseOwnership for SqlCourseOwnership {
    async fn course_owner(&self, course_id: i64) -> QuizResult<Option<i64>> {
        let owner = sqlx::query_scalar::<_, i64>("SELECT teacher_id FROM courses WHERE course_id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }
}

/// Allows admins and the teacher who owns the course.
pub async fn ensure_can_author(
    ownership: &dyn CourseOwnership,
    identity: &Identity,
    course_id: i64,
) -> QuizResult<()> {
    if !matches!(identity.role, Role::Teacher | Role::Admin) {
        tracing::warn!(user_id = identity.user_id, "Authoring denied for non-teacher");
        return Err(QuizError::Forbidden("Teacher role required".to_string()));
    }

    let owner = ownership
        .course_owner(course_id)
        .await?
        .ok_or_else(|| QuizError::NotFound(format!("Course {} not found", course_id)))?;

    if identity.role == Role::Teacher && owner != identity.user_id {
        tracing::warn!(user_id = identity.user_id, course_id, "Course not owned by caller");
        return Err(QuizError::Forbidden("You do not own this course".to_string()));
    }

    Ok(())
}
