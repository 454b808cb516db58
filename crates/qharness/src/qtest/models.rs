//! Request and response bodies of the qTest v3 API.

use serde::{Deserialize, Serialize};

/// Canonical qTest execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    /// Test passed
    Pass,
    /// Test failed
    Fail,
    /// Test skipped
    Skip,
}

impl RunStatus {
    /// Wire form: `PASS`, `FAIL` or `SKIP`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PASS" => Ok(Self::Pass),
            "FAIL" => Ok(Self::Fail),
            "SKIP" => Ok(Self::Skip),
            other => Err(format!("unknown status '{other}', expected PASS, FAIL or SKIP")),
        }
    }
}

/// Body of `POST /test-cycles`.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRequest<'a> {
    /// Cycle name
    pub name: &'a str,
    /// Cycle description
    pub description: &'a str,
    /// Always "In Progress" for a fresh run
    pub status: &'a str,
}

/// Body of `POST /test-suites`.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteRequest<'a> {
    /// Suite name
    pub name: &'a str,
    /// Suite description
    pub description: &'a str,
}

/// One record of the `GET /test-cases` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCaseRecord {
    /// Human-readable id, e.g. `TC-9984`
    #[serde(default)]
    pub pid: Option<String>,
    /// Internal numeric id
    #[serde(default)]
    pub id: Option<u64>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// A resolved test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseRef {
    /// Human-readable id
    pub pid: String,
    /// Internal numeric id
    pub id: u64,
    /// Display name, when the listing carried one
    pub name: Option<String>,
}

/// Reference to a test case inside a run request.
#[derive(Debug, Clone, Serialize)]
pub struct TestCaseLink {
    /// Internal numeric id
    pub id: u64,
}

/// Body of `POST /test-runs`.
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest {
    /// Run name
    pub name: String,
    /// Linked test case
    pub test_case: TestCaseLink,
}

/// A file attached to an auto-test-log.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    /// File base name
    pub name: String,
    /// MIME type
    pub content_type: String,
    /// Base64 of the raw file bytes
    pub data: String,
}

/// Body of `POST /test-runs/{id}/auto-test-logs`.
#[derive(Debug, Clone, Serialize)]
pub struct AutoTestLog {
    /// Log name
    pub name: String,
    /// Execution status
    pub status: RunStatus,
    /// UTC start, `YYYY-MM-DDTHH:MM:SSZ`
    pub exe_start_date: String,
    /// UTC end, `YYYY-MM-DDTHH:MM:SSZ`
    pub exe_end_date: String,
    /// Attached artifacts
    pub attachments: Vec<Attachment>,
}

/// Pull the numeric `id` out of a creation response.
pub(crate) fn created_id(body: &serde_json::Value) -> Option<u64> {
    body.get("id").and_then(serde_json::Value::as_u64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_form() {
        for (status, wire) in [
            (RunStatus::Pass, "\"PASS\""),
            (RunStatus::Fail, "\"FAIL\""),
            (RunStatus::Skip, "\"SKIP\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), wire);
        }
    }

    #[test]
    fn test_status_from_str_is_case_insensitive() {
        assert_eq!("pass".parse::<RunStatus>().unwrap(), RunStatus::Pass);
        assert_eq!("FAIL".parse::<RunStatus>().unwrap(), RunStatus::Fail);
        assert!("blocked".parse::<RunStatus>().is_err());
    }

    #[test]
    fn test_run_request_shape() {
        let req = RunRequest {
            name: "TC-1-Login".to_string(),
            test_case: TestCaseLink { id: 7 },
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"name": "TC-1-Login", "test_case": {"id": 7}})
        );
    }

    #[test]
    fn test_test_case_record_tolerates_missing_fields() {
        let rec: TestCaseRecord = serde_json::from_value(json!({"id": 3})).unwrap();
        assert!(rec.pid.is_none());
        assert_eq!(rec.id, Some(3));
    }

    #[test]
    fn test_created_id() {
        assert_eq!(created_id(&json!({"id": 42, "name": "x"})), Some(42));
        assert_eq!(created_id(&json!({"name": "x"})), None);
        assert_eq!(created_id(&json!({"id": "42"})), None);
    }
}
