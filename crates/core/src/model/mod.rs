mod course;
mod exam_meta;
mod ids;
mod progress;
mod question;
mod student;
mod submission;

pub use course::{Chapter, Course, CourseError};
pub use exam_meta::{
    ChapterExamMeta, DEFAULT_TIME_LIMIT_MINUTES, DEFAULT_TOTAL_QUESTIONS, ExamMetaError,
};
pub use ids::{ChapterId, CourseId, ParseIdError, QuestionId, StudentId};
pub use progress::{ChapterProgress, ChapterStatus, PASS_THRESHOLD, Score, ScoreError};
pub use question::{Difficulty, MAX_OPTIONS, MIN_OPTIONS, Question, QuestionError};
pub use student::Student;
pub use submission::{SubmissionRecord, UNNAMED_STUDENT};
