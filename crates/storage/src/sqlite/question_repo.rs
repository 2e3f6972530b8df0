use exam_core::model::{ChapterId, CourseId, Question};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_question_row, ser};
use crate::repository::{QuestionBank, StorageError};

#[async_trait::async_trait]
impl QuestionBank for SqliteRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let options = serde_json::to_string(question.options()).map_err(ser)?;
        let correct_index = i64::try_from(question.correct_index())
            .map_err(|_| StorageError::Serialization("correct_index overflow".into()))?;

        sqlx::query(
            r"
            INSERT INTO questions (id, course_id, chapter_id, text, options, correct_index, explanation, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                course_id = excluded.course_id,
                chapter_id = excluded.chapter_id,
                text = excluded.text,
                options = excluded.options,
                correct_index = excluded.correct_index,
                explanation = excluded.explanation,
                difficulty = excluded.difficulty
            ",
        )
        .bind(id_to_i64("question_id", question.id().value())?)
        .bind(id_to_i64("course_id", question.course_id().value())?)
        .bind(id_to_i64("chapter_id", question.chapter_id().value())?)
        .bind(question.text())
        .bind(options)
        .bind(correct_index)
        .bind(question.explanation())
        .bind(question.difficulty().as_str())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn chapter_questions(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, course_id, chapter_id, text, options, correct_index, explanation, difficulty
            FROM questions
            WHERE course_id = ?1 AND chapter_id = ?2
            ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("course_id", course_id.value())?)
        .bind(id_to_i64("chapter_id", chapter_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }
}
