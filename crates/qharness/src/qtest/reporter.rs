//! qTest reporting session.
//!
//! A [`QTestReporter`] owns exactly one test cycle and one test suite,
//! created when it connects. Each upload then walks
//! `RESOLVE -> REGISTER -> UPLOAD`:
//!
//! ```text
//! GET  /test-cases?parentId={module}&page=N&size=50&expandProps=true   (until match or [])
//! POST /test-runs?parentId={suite}&parentType=test-suite                -> run id
//! POST /test-runs/{run}/auto-test-logs                                  (base64 HTML report)
//! ```

use super::attachment;
use super::error::{QTestError, UploadError, UploadStage};
use super::models::{
    created_id, AutoTestLog, CycleRequest, RunRequest, RunStatus, SuiteRequest, TestCaseLink,
    TestCaseRecord, TestCaseRef,
};
use super::transport::{HttpTransport, Transport};
use crate::config::{QTestConfig, RunNaming};
use std::path::Path;
use tracing::{debug, info, warn};

/// Timestamp layout expected by `auto-test-logs`.
const QTEST_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Create the session's test cycle and return its id.
pub async fn create_test_cycle<T: Transport + ?Sized>(
    transport: &T,
    name: &str,
) -> Result<u64, QTestError> {
    let body = serde_json::to_value(CycleRequest {
        name,
        description: "Automated test cycle",
        status: "In Progress",
    })?;
    let resp = transport.post("/test-cycles", &body).await?;
    created_id(&resp).ok_or(QTestError::MissingId {
        resource: "test-cycle",
    })
}

/// Create a test suite nested under `cycle_id` and return its id.
pub async fn create_test_suite<T: Transport + ?Sized>(
    transport: &T,
    cycle_id: u64,
    name: &str,
) -> Result<u64, QTestError> {
    let body = serde_json::to_value(SuiteRequest {
        name,
        description: "Automated test suite",
    })?;
    let path = format!("/test-suites?parentId={cycle_id}&parentType=test-cycle");
    let resp = transport.post(&path, &body).await?;
    created_id(&resp).ok_or(QTestError::MissingId {
        resource: "test-suite",
    })
}

/// Paginated search for a test case under one module.
#[derive(Debug, Clone)]
pub struct CaseLookup {
    module_id: String,
    page_size: u32,
    max_pages: u32,
}

impl CaseLookup {
    /// Lookup scoped by the configured module and paging bounds.
    pub fn from_config(config: &QTestConfig) -> Self {
        Self {
            module_id: config.module_id.clone(),
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }

    /// Find a test case by PID.
    ///
    /// Pages are walked in order and the first match wins. `Ok(None)` means
    /// an empty page was reached without a match. Records that match but
    /// carry no id are passed over.
    pub async fn find<T: Transport + ?Sized>(
        &self,
        transport: &T,
        pid: &str,
    ) -> Result<Option<TestCaseRef>, QTestError> {
        for page in 1..=self.max_pages {
            let path = format!(
                "/test-cases?parentId={}&page={page}&size={}&expandProps=true",
                self.module_id, self.page_size
            );
            let body = transport.get(&path).await?;
            let records: Vec<TestCaseRecord> = serde_json::from_value(body)?;
            debug!(pid, page, count = records.len(), "Fetched test case page");

            if records.is_empty() {
                return Ok(None);
            }

            let found = records.into_iter().find_map(|record| match record {
                TestCaseRecord {
                    pid: Some(candidate),
                    id: Some(id),
                    name,
                } if candidate == pid => Some(TestCaseRef {
                    pid: candidate,
                    id,
                    name,
                }),
                _ => None,
            });
            if found.is_some() {
                return Ok(found);
            }
        }

        Err(QTestError::PageLimitExceeded {
            pid: pid.to_string(),
            pages: self.max_pages,
        })
    }
}

/// Reporting session bound to one cycle and one suite.
#[derive(Debug)]
pub struct QTestReporter<T: Transport = HttpTransport> {
    transport: T,
    lookup: CaseLookup,
    run_naming: RunNaming,
    cycle_id: u64,
    suite_id: u64,
}

impl QTestReporter<HttpTransport> {
    /// Connect over HTTP using the configured endpoint and token.
    pub async fn from_config(config: &QTestConfig) -> Result<Self, QTestError> {
        let transport = HttpTransport::new(config)?;
        Self::connect(transport, config).await
    }
}

impl<T: Transport> QTestReporter<T> {
    /// Create the session cycle and suite.
    ///
    /// If the cycle cannot be created no further request is made.
    pub async fn connect(transport: T, config: &QTestConfig) -> Result<Self, QTestError> {
        let cycle_id = create_test_cycle(&transport, &config.cycle_name).await?;
        info!(cycle_id, "Created test cycle");
        let suite_id = create_test_suite(&transport, cycle_id, &config.suite_name).await?;
        info!(suite_id, "Created test suite");

        Ok(Self {
            transport,
            lookup: CaseLookup::from_config(config),
            run_naming: config.run_naming,
            cycle_id,
            suite_id,
        })
    }

    /// Id of the session cycle
    pub const fn cycle_id(&self) -> u64 {
        self.cycle_id
    }

    /// Id of the session suite
    pub const fn suite_id(&self) -> u64 {
        self.suite_id
    }

    /// Underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Find a test case by PID under the configured module.
    ///
    /// Never cached: every call walks the listing again.
    pub async fn resolve_test_case(&self, pid: &str) -> Result<Option<TestCaseRef>, QTestError> {
        self.lookup.find(&self.transport, pid).await
    }

    /// Name given to the test run for `case`.
    pub fn run_name(&self, case: &TestCaseRef) -> String {
        match (self.run_naming, case.name.as_deref()) {
            (RunNaming::PidAndName, Some(name)) if !name.is_empty() => {
                format!("{}-{name}", case.pid)
            }
            _ => case.pid.clone(),
        }
    }

    /// Attach `case` to the session suite as a new test run.
    pub async fn add_test_case_to_suite(&self, case: &TestCaseRef) -> Result<u64, QTestError> {
        let body = serde_json::to_value(RunRequest {
            name: self.run_name(case),
            test_case: TestCaseLink { id: case.id },
        })?;
        let path = format!(
            "/test-runs?parentId={}&parentType=test-suite",
            self.suite_id
        );
        let resp = self.transport.post(&path, &body).await?;
        created_id(&resp).ok_or(QTestError::MissingId {
            resource: "test-run",
        })
    }

    /// Post the execution log with the HTML report attached.
    pub async fn update_test_run_results(
        &self,
        pid: &str,
        run_id: u64,
        status: RunStatus,
        report_path: &Path,
    ) -> Result<(), QTestError> {
        let report = attachment::html_report(report_path)?;

        let exe_start_date = chrono::Utc::now().format(QTEST_TIME_FORMAT).to_string();
        let exe_end_date = chrono::Utc::now().format(QTEST_TIME_FORMAT).to_string();
        let body = serde_json::to_value(AutoTestLog {
            name: format!("Test Run {pid}"),
            status,
            exe_start_date,
            exe_end_date,
            attachments: vec![report],
        })?;

        let path = format!("/test-runs/{run_id}/auto-test-logs");
        let resp = self.transport.post_unchecked(&path, &body).await?;
        if resp.is_success() {
            Ok(())
        } else {
            Err(QTestError::Status {
                status: resp.status,
                body: resp.body,
            })
        }
    }

    /// Resolve, register and upload one result.
    ///
    /// Returns the id of the created test run. Failures are logged and
    /// returned; nothing here panics or aborts the caller.
    pub async fn upload_test_result(
        &self,
        pid: &str,
        status: RunStatus,
        report_path: &Path,
    ) -> Result<u64, UploadError> {
        info!(pid, %status, "Uploading results");
        let result = self.upload_stages(pid, status, report_path).await;
        match &result {
            Ok(run_id) => info!(pid, run_id, "Successfully uploaded results"),
            Err(err) => warn!(pid, stage = %err.stage, error = %err.source, "Failed to upload results"),
        }
        result
    }

    async fn upload_stages(
        &self,
        pid: &str,
        status: RunStatus,
        report_path: &Path,
    ) -> Result<u64, UploadError> {
        let case = self
            .resolve_test_case(pid)
            .await
            .map_err(|e| UploadError::new(pid, UploadStage::Resolve, e))?
            .ok_or_else(|| {
                UploadError::new(
                    pid,
                    UploadStage::Resolve,
                    QTestError::CaseNotFound {
                        pid: pid.to_string(),
                    },
                )
            })?;

        let run_id = self
            .add_test_case_to_suite(&case)
            .await
            .map_err(|e| UploadError::new(pid, UploadStage::Register, e))?;
        info!(pid, suite_id = self.suite_id, run_id, "Added test case to suite");

        self.update_test_run_results(pid, run_id, status, report_path)
            .await
            .map_err(|e| UploadError::new(pid, UploadStage::Upload, e))?;
        Ok(run_id)
    }

    /// Upload the same status and report for several PIDs, in order.
    ///
    /// A failure for one PID is recorded and the next one is still tried.
    pub async fn upload_multi_test_results<S: AsRef<str>>(
        &self,
        pids: &[S],
        status: RunStatus,
        report_path: &Path,
    ) -> BatchReport {
        let mut outcomes = Vec::with_capacity(pids.len());
        for pid in pids {
            let pid = pid.as_ref();
            let result = self.upload_test_result(pid, status, report_path).await;
            outcomes.push(UploadOutcome {
                pid: pid.to_string(),
                result,
            });
        }
        BatchReport { outcomes }
    }
}

/// Result of uploading one PID.
#[derive(Debug)]
pub struct UploadOutcome {
    /// Identifier that was uploaded
    pub pid: String,
    /// Created run id, or why it failed
    pub result: Result<u64, UploadError>,
}

/// Per-PID outcomes of a batch upload, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per requested PID
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchReport {
    /// Number of PIDs uploaded successfully
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Failed uploads
    pub fn failures(&self) -> Vec<&UploadError> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err())
            .collect()
    }

    /// Whether every PID made it
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Number of PIDs attempted
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether nothing was attempted
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
