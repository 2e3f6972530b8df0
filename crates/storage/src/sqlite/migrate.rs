use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs versioned migrations for the exam schema.
///
/// Version 1 creates courses, chapters, the question bank, exam configuration and
/// per-student chapter scores.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS courses (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS chapters (
                    course_id INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                    id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    PRIMARY KEY (course_id, id),
                    UNIQUE (course_id, position)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS questions (
                    id INTEGER PRIMARY KEY,
                    course_id INTEGER NOT NULL,
                    chapter_id INTEGER NOT NULL,
                    text TEXT NOT NULL,
                    options TEXT NOT NULL,
                    correct_index INTEGER NOT NULL CHECK (correct_index >= 0),
                    explanation TEXT,
                    difficulty TEXT NOT NULL CHECK (difficulty IN ('easy', 'medium', 'hard'))
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_questions_chapter
                    ON questions (course_id, chapter_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS exam_meta (
                    course_id INTEGER NOT NULL,
                    chapter_id INTEGER NOT NULL,
                    total_questions INTEGER NOT NULL CHECK (total_questions > 0),
                    time_limit_minutes INTEGER NOT NULL CHECK (time_limit_minutes > 0),
                    starts_at TEXT,
                    PRIMARY KEY (course_id, chapter_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS chapter_scores (
                    student_id INTEGER NOT NULL,
                    course_id INTEGER NOT NULL,
                    chapter_id INTEGER NOT NULL,
                    score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 100),
                    PRIMARY KEY (student_id, course_id, chapter_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied sqlite migration");
    }

    Ok(())
}
