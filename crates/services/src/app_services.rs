use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::exams::{ExamRunner, ExamService};
use crate::progression::ProgressionService;
use crate::reporting::{HttpSubmissionReporter, SubmissionReporter};

/// Assembles the services used by the binary.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    exams: Arc<ExamService>,
    progression: Arc<ProgressionService>,
    runner: ExamRunner,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, with reporting and feedback delay
    /// taken from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage or the report client fails to initialize.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let reporter = HttpSubmissionReporter::from_env()?;
        if !reporter.enabled() {
            tracing::info!("LMS_SUBMISSIONS_URL not set; exam results are stored locally only");
        }
        Ok(Self::with_storage(storage, clock, Arc::new(reporter)))
    }

    /// Build services over an existing `Storage` and reporter.
    #[must_use]
    pub fn with_storage(
        storage: Storage,
        clock: Clock,
        reporter: Arc<dyn SubmissionReporter>,
    ) -> Self {
        let exams = Arc::new(ExamService::from_storage(clock, &storage, reporter));
        let progression = exams.progression();
        let runner = ExamRunner::new(Arc::clone(&exams))
            .with_feedback_delay(ExamRunner::feedback_delay_from_env());
        Self {
            storage,
            exams,
            progression,
            runner,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn exams(&self) -> Arc<ExamService> {
        Arc::clone(&self.exams)
    }

    #[must_use]
    pub fn progression(&self) -> Arc<ProgressionService> {
        Arc::clone(&self.progression)
    }

    #[must_use]
    pub fn runner(&self) -> ExamRunner {
        self.runner.clone()
    }
}
