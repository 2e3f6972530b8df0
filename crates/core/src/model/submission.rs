use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::model::ids::{ChapterId, CourseId, StudentId};
use crate::model::progress::Score;

/// Display name reported for students without one.
pub const UNNAMED_STUDENT: &str = "Unnamed";

/// Finished-exam record sent to the submission-recording service.
///
/// Field names follow the recording service's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    #[serde(rename = "user_id")]
    pub student_id: StudentId,
    #[serde(rename = "user_name")]
    pub student_name: String,
    pub course_id: CourseId,
    pub course_title: String,
    pub chapter_id: ChapterId,
    pub chapter_title: String,
    pub score: Score,
    #[serde(rename = "timestamp", serialize_with = "iso8601")]
    pub submitted_at: DateTime<Utc>,
}

fn iso8601<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
