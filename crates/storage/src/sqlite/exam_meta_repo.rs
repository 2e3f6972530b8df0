use exam_core::model::{ChapterExamMeta, ChapterId, CourseId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_exam_meta_row};
use crate::repository::{ExamMetaRepository, StorageError};

#[async_trait::async_trait]
impl ExamMetaRepository for SqliteRepository {
    async fn upsert_exam_meta(&self, meta: &ChapterExamMeta) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO exam_meta (course_id, chapter_id, total_questions, time_limit_minutes, starts_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(course_id, chapter_id) DO UPDATE SET
                total_questions = excluded.total_questions,
                time_limit_minutes = excluded.time_limit_minutes,
                starts_at = excluded.starts_at
            ",
        )
        .bind(id_to_i64("course_id", meta.course_id().value())?)
        .bind(id_to_i64("chapter_id", meta.chapter_id().value())?)
        .bind(i64::from(meta.total_questions()))
        .bind(i64::from(meta.time_limit_minutes()))
        .bind(meta.starts_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_exam_meta(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<Option<ChapterExamMeta>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT course_id, chapter_id, total_questions, time_limit_minutes, starts_at
            FROM exam_meta
            WHERE course_id = ?1 AND chapter_id = ?2
            ",
        )
        .bind(id_to_i64("course_id", course_id.value())?)
        .bind(id_to_i64("chapter_id", chapter_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_exam_meta_row).transpose()
    }
}
