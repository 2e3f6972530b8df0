use exam_core::model::{ChapterId, ChapterProgress, Score};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_score_row};
use crate::repository::{ProgressKey, ProgressStore, StorageError};

#[async_trait::async_trait]
impl ProgressStore for SqliteRepository {
    async fn get(&self, key: ProgressKey) -> Result<ChapterProgress, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT chapter_id, score
            FROM chapter_scores
            WHERE student_id = ?1 AND course_id = ?2
            ",
        )
        .bind(id_to_i64("student_id", key.student_id.value())?)
        .bind(id_to_i64("course_id", key.course_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_score_row).collect()
    }

    async fn set(
        &self,
        key: ProgressKey,
        chapter_id: ChapterId,
        score: Score,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO chapter_scores (student_id, course_id, chapter_id, score)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(student_id, course_id, chapter_id) DO UPDATE SET
                score = excluded.score
            ",
        )
        .bind(id_to_i64("student_id", key.student_id.value())?)
        .bind(id_to_i64("course_id", key.course_id.value())?)
        .bind(id_to_i64("chapter_id", chapter_id.value())?)
        .bind(i64::from(score.value()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        tracing::debug!(
            student_id = %key.student_id,
            course_id = %key.course_id,
            chapter_id = %chapter_id,
            score = score.value(),
            "chapter score stored"
        );
        Ok(())
    }
}
