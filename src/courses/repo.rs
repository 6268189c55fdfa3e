use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    courses::repo_types::{Course, CourseFields},
    db::RepoError,
};

/// The Courses collection.
#[async_trait]
pub trait CourseRepo: Send + Sync {
    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, RepoError>;
    /// Fails with [`RepoError::Conflict`] when the title is taken.
    async fn create(&self, fields: CourseFields) -> Result<Course, RepoError>;
    /// Full replace; `None` when no course has `id`.
    async fn replace(&self, id: Uuid, fields: CourseFields) -> Result<Option<Course>, RepoError>;
    /// Returns the removed course, `None` when no course has `id`.
    async fn delete(&self, id: Uuid) -> Result<Option<Course>, RepoError>;
    async fn list(&self) -> Result<Vec<Course>, RepoError>;
}

#[derive(Clone)]
pub struct PgCourseRepo {
    db: PgPool,
}

impl PgCourseRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepo for PgCourseRepo {
    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, RepoError> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, price, image, created_at, updated_at
            FROM courses
            WHERE title = $1
            "#,
        )
        .bind(title)
        .fetch_optional(&self.db)
        .await?;
        Ok(course)
    }

    async fn create(&self, fields: CourseFields) -> Result<Course, RepoError> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (title, description, price, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, price, image, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(&fields.image)
        .fetch_one(&self.db)
        .await?;
        Ok(course)
    }

    async fn replace(&self, id: Uuid, fields: CourseFields) -> Result<Option<Course>, RepoError> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
               SET title = $2, description = $3, price = $4, image = $5, updated_at = now()
             WHERE id = $1
            RETURNING id, title, description, price, image, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(&fields.image)
        .fetch_optional(&self.db)
        .await?;
        Ok(course)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Course>, RepoError> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            DELETE FROM courses
             WHERE id = $1
            RETURNING id, title, description, price, image, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(course)
    }

    async fn list(&self) -> Result<Vec<Course>, RepoError> {
        let rows = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, price, image, created_at, updated_at
            FROM courses
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
