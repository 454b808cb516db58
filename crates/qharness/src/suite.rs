//! YAML suite files.
//!
//! ```yaml
//! name: API smoke
//! tests:
//!   - name: get_post
//!     tags: [smoke]
//!     qtest: [TC-9984, TC-9985]
//!     request: { method: GET, url: /posts/1 }
//!     expect: { status: 200, json: { id: 1 } }
//! ```

use crate::api::{ApiCheck, ApiRequest, Expectation};
use crate::harness::{TestCase, TestSuite};
use crate::result::{HarnessError, HarnessResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// On-disk suite definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteFile {
    /// Suite name
    pub name: String,
    /// Tests in file order
    #[serde(default)]
    pub tests: Vec<TestEntry>,
}

/// One test in a suite file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestEntry {
    /// Unique test name
    pub name: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// qTest IDs to report to
    #[serde(default, alias = "qtest_ids")]
    pub qtest: Vec<String>,
    /// Skip without running
    #[serde(default)]
    pub skip: bool,
    /// Per-test timeout override
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Request to send
    pub request: ApiRequest,
    /// Response contract
    #[serde(default)]
    pub expect: Expectation,
}

impl SuiteFile {
    /// Parse YAML text
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or names repeat
    pub fn from_yaml(text: &str) -> HarnessResult<Self> {
        let file: Self = serde_yaml_ng::from_str(text)?;
        file.validate()?;
        Ok(file)
    }

    /// Read and parse a suite file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::suite(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    fn validate(&self) -> HarnessResult<()> {
        let mut seen = HashSet::new();
        for test in &self.tests {
            if test.name.trim().is_empty() {
                return Err(HarnessError::suite("test with empty name"));
            }
            if !seen.insert(test.name.as_str()) {
                return Err(HarnessError::suite(format!(
                    "duplicate test name '{}'",
                    test.name
                )));
            }
            if test.request.url.trim().is_empty() {
                return Err(HarnessError::suite(format!(
                    "test '{}' has no request url",
                    test.name
                )));
            }
        }
        Ok(())
    }

    /// Convert into a runnable suite
    #[must_use]
    pub fn into_suite(self) -> TestSuite {
        let mut suite = TestSuite::new(self.name);
        for entry in self.tests {
            suite.add_test(entry.into_case());
        }
        suite
    }
}

impl TestEntry {
    fn into_case(self) -> TestCase {
        let mut case = TestCase::new(
            self.name,
            ApiCheck {
                request: self.request,
                expect: self.expect,
            },
        )
        .with_qtest_ids(self.qtest);
        case.tags = self.tags;
        case.skip = self.skip;
        case.timeout_ms = self.timeout_ms;
        case
    }
}
