use exam_core::model::{Chapter, Course, CourseId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{chapter_id_from_i64, conn, course_id_from_i64, id_to_i64, ser};
use crate::repository::{CourseRepository, StorageError};

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let course_id = id_to_i64("course_id", course.id().value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO courses (id, title)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET title = excluded.title
            ",
        )
        .bind(course_id)
        .bind(course.title())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        // chapter list is replaced wholesale so removed chapters disappear
        sqlx::query("DELETE FROM chapters WHERE course_id = ?1")
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for chapter in course.chapters() {
            sqlx::query(
                r"
                INSERT INTO chapters (course_id, id, title, position)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(course_id)
            .bind(id_to_i64("chapter_id", chapter.id().value())?)
            .bind(chapter.title())
            .bind(i64::from(chapter.order()))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let course_id = id_to_i64("course_id", id.value())?;
        let row = sqlx::query("SELECT id, title FROM courses WHERE id = ?1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let title: String = row.try_get("title").map_err(ser)?;
        let chapters = self.load_chapters(course_id).await?;
        Course::new(id, title, chapters).map(Some).map_err(ser)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query("SELECT id, title FROM courses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let raw_id: i64 = row.try_get("id").map_err(ser)?;
            let title: String = row.try_get("title").map_err(ser)?;
            let chapters = self.load_chapters(raw_id).await?;
            courses.push(Course::new(course_id_from_i64(raw_id)?, title, chapters).map_err(ser)?);
        }
        Ok(courses)
    }
}

impl SqliteRepository {
    async fn load_chapters(&self, course_id: i64) -> Result<Vec<Chapter>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, position
            FROM chapters
            WHERE course_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                let position: i64 = row.try_get("position").map_err(ser)?;
                let order = u32::try_from(position).map_err(|_| {
                    StorageError::Serialization(format!("invalid chapter position: {position}"))
                })?;
                Chapter::new(
                    chapter_id_from_i64(row.try_get("id").map_err(ser)?)?,
                    row.try_get::<String, _>("title").map_err(ser)?,
                    order,
                )
                .map_err(ser)
            })
            .collect()
    }
}
