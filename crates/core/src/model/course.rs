use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{ChapterId, CourseId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("chapter title cannot be empty")]
    EmptyChapterTitle,

    #[error("duplicate chapter id: {0}")]
    DuplicateChapter(ChapterId),

    #[error("duplicate chapter order: {0}")]
    DuplicateOrder(u32),
}

//
// ─── CHAPTER ───────────────────────────────────────────────────────────────────
//

/// An ordered subdivision of a course; the unit of exam gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    id: ChapterId,
    title: String,
    order: u32,
}

impl Chapter {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyChapterTitle` if the title is blank.
    pub fn new(id: ChapterId, title: impl Into<String>, order: u32) -> Result<Self, CourseError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(CourseError::EmptyChapterTitle);
        }
        Ok(Self { id, title, order })
    }

    #[must_use]
    pub fn id(&self) -> ChapterId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A course and its chapters, kept sorted by the explicit `order` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    chapters: Vec<Chapter>,
}

impl Course {
    /// Creates a course; chapters are sorted by `order`.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the title is blank or chapter ids/orders repeat.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        mut chapters: Vec<Chapter>,
    ) -> Result<Self, CourseError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }

        let mut ids = HashSet::new();
        let mut orders = HashSet::new();
        for chapter in &chapters {
            if !ids.insert(chapter.id) {
                return Err(CourseError::DuplicateChapter(chapter.id));
            }
            if !orders.insert(chapter.order) {
                return Err(CourseError::DuplicateOrder(chapter.order));
            }
        }
        chapters.sort_by_key(Chapter::order);

        Ok(Self {
            id,
            title,
            chapters,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Chapters in ascending order.
    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    #[must_use]
    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    /// The chapter immediately preceding `id`, or `None` for the first chapter
    /// (and for unknown ids).
    #[must_use]
    pub fn previous_chapter(&self, id: ChapterId) -> Option<&Chapter> {
        let position = self.chapters.iter().position(|c| c.id == id)?;
        position.checked_sub(1).map(|prev| &self.chapters[prev])
    }
}
