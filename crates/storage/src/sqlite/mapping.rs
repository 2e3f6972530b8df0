use exam_core::model::{
    ChapterExamMeta, ChapterId, CourseId, Difficulty, Question, QuestionId, Score,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn course_id_from_i64(v: i64) -> Result<CourseId, StorageError> {
    Ok(CourseId::new(i64_to_u64("course_id", v)?))
}

pub(crate) fn chapter_id_from_i64(v: i64) -> Result<ChapterId, StorageError> {
    Ok(ChapterId::new(i64_to_u64("chapter_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

fn u32_from_row(row: &SqliteRow, field: &'static str) -> Result<u32, StorageError> {
    let raw: i64 = row.try_get(field).map_err(ser)?;
    u32::try_from(raw).map_err(|_| StorageError::Serialization(format!("invalid {field}: {raw}")))
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let options_json: String = row.try_get("options").map_err(ser)?;
    let options: Vec<String> = serde_json::from_str(&options_json).map_err(ser)?;

    let correct_raw: i64 = row.try_get("correct_index").map_err(ser)?;
    let correct_index = usize::try_from(correct_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid correct_index: {correct_raw}")))?;

    let difficulty: Difficulty = row
        .try_get::<String, _>("difficulty")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    Question::new(
        question_id_from_i64(row.try_get("id").map_err(ser)?)?,
        course_id_from_i64(row.try_get("course_id").map_err(ser)?)?,
        chapter_id_from_i64(row.try_get("chapter_id").map_err(ser)?)?,
        row.try_get::<String, _>("text").map_err(ser)?,
        options,
        correct_index,
        row.try_get::<Option<String>, _>("explanation").map_err(ser)?,
        difficulty,
    )
    .map_err(ser)
}

pub(crate) fn map_exam_meta_row(row: &SqliteRow) -> Result<ChapterExamMeta, StorageError> {
    ChapterExamMeta::new(
        course_id_from_i64(row.try_get("course_id").map_err(ser)?)?,
        chapter_id_from_i64(row.try_get("chapter_id").map_err(ser)?)?,
        u32_from_row(row, "total_questions")?,
        u32_from_row(row, "time_limit_minutes")?,
        row.try_get("starts_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_score_row(row: &SqliteRow) -> Result<(ChapterId, Score), StorageError> {
    let chapter_id = chapter_id_from_i64(row.try_get("chapter_id").map_err(ser)?)?;
    let score = Score::try_from(row.try_get::<i64, _>("score").map_err(ser)?).map_err(ser)?;
    Ok((chapter_id, score))
}
