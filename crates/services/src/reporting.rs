use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use exam_core::model::SubmissionRecord;

use crate::error::ReportError;

/// Destination for finished-exam records.
///
/// Reporting is advisory: the local progress store is authoritative, so callers
/// log failures and never retry.
#[async_trait]
pub trait SubmissionReporter: Send + Sync {
    /// Send one record.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the record could not be delivered.
    async fn report(&self, record: &SubmissionRecord) -> Result<(), ReportError>;
}

#[derive(Clone, Debug)]
pub struct ReportingConfig {
    pub base_url: String,
}

impl ReportingConfig {
    /// Reads `LMS_SUBMISSIONS_URL`; `None` when unset or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("LMS_SUBMISSIONS_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self { base_url })
    }

    fn endpoint(&self) -> String {
        format!("{}/submit-exam", self.base_url.trim().trim_end_matches('/'))
    }
}

/// Upper bound on one report request, connect included.
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts submission records as JSON to `{base_url}/submit-exam`.
#[derive(Clone)]
pub struct HttpSubmissionReporter {
    client: Client,
    config: Option<ReportingConfig>,
}

impl HttpSubmissionReporter {
    /// # Errors
    ///
    /// Returns `ReportError::Http` if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, ReportError> {
        Self::new(ReportingConfig::from_env())
    }

    /// # Errors
    ///
    /// Returns `ReportError::Http` if the HTTP client cannot be built.
    pub fn new(config: Option<ReportingConfig>) -> Result<Self, ReportError> {
        let client = Client::builder().timeout(REPORT_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl SubmissionReporter for HttpSubmissionReporter {
    async fn report(&self, record: &SubmissionRecord) -> Result<(), ReportError> {
        let config = self.config.as_ref().ok_or(ReportError::Disabled)?;

        let response = self
            .client
            .post(config.endpoint())
            .json(record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReportError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{ChapterId, CourseId, Score, StudentId};
    use exam_core::time::fixed_now;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let config = ReportingConfig {
            base_url: "https://lms.example.org/api/".into(),
        };
        assert_eq!(config.endpoint(), "https://lms.example.org/api/submit-exam");
    }

    #[tokio::test]
    async fn unconfigured_reporter_is_disabled() {
        let reporter = HttpSubmissionReporter::new(None).unwrap();
        assert!(!reporter.enabled());

        let record = SubmissionRecord {
            student_id: StudentId::new(1),
            student_name: "Ada".into(),
            course_id: CourseId::new(1),
            course_title: "Course".into(),
            chapter_id: ChapterId::new(1),
            chapter_title: "Chapter".into(),
            score: Score::new(80).unwrap(),
            submitted_at: fixed_now(),
        };
        let err = reporter.report(&record).await.unwrap_err();
        assert!(matches!(err, ReportError::Disabled));
    }
}
