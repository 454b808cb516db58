//! Environment-keyed configuration.
//!
//! A single JSON file maps environment names to settings:
//!
//! ```json
//! {
//!   "qa": {
//!     "base_url": "https://jsonplaceholder.typicode.com",
//!     "qtest": { "base_url": "https://example.qtestnet.com/api/v3",
//!                "project_id": "101762", "module_id": "10116193" }
//!   }
//! }
//! ```

use crate::result::{HarnessError, HarnessResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that supplies or overrides the qTest API token.
pub const TOKEN_ENV_VAR: &str = "QTEST_API_TOKEN";

/// Settings for one environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Base URL that relative API check URLs are joined onto
    #[serde(default)]
    pub base_url: Option<String>,
    /// Directory holding generated reports
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
    /// File name of the HTML report inside `reports_dir`
    #[serde(default = "default_report_file")]
    pub report_file: String,
    /// Default per-test timeout in milliseconds
    #[serde(default = "default_test_timeout_ms")]
    pub test_timeout_ms: u64,
    /// qTest reporting; absent means uploads are disabled
    #[serde(default)]
    pub qtest: Option<QTestConfig>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            reports_dir: default_reports_dir(),
            report_file: default_report_file(),
            test_timeout_ms: default_test_timeout_ms(),
            qtest: None,
        }
    }
}

impl HarnessConfig {
    /// Load the settings for `env` from a JSON config file.
    ///
    /// The qTest token falls back to (and is overridden by) `QTEST_API_TOKEN`.
    pub fn load(path: &Path, env: &str) -> HarnessResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let token = std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|token| !token.is_empty());
        Self::from_json_with_token(&text, env, token)
    }

    /// Parse a config document and select one environment.
    pub fn from_json(text: &str, env: &str) -> HarnessResult<Self> {
        Self::from_json_with_token(text, env, None)
    }

    /// Parse a config document, select one environment and apply a token
    /// override before validating.
    ///
    /// Other environments in the document are never deserialized.
    pub fn from_json_with_token(
        text: &str,
        env: &str,
        token: Option<String>,
    ) -> HarnessResult<Self> {
        let mut envs: BTreeMap<String, Value> = serde_json::from_str(text)?;
        let value = envs.remove(env).ok_or_else(|| {
            let known: Vec<&str> = envs.keys().map(String::as_str).collect();
            HarnessError::config(format!(
                "environment '{env}' not found (known: {})",
                known.join(", ")
            ))
        })?;
        let mut config: Self = serde_json::from_value(value)
            .map_err(|e| HarnessError::config(format!("environment '{env}': {e}")))?;
        if let (Some(token), Some(qtest)) = (token, config.qtest.as_mut()) {
            qtest.api_token = token;
        }
        if let Some(qtest) = config.upload_target() {
            qtest
                .validate()
                .map_err(|e| HarnessError::config(format!("environment '{env}': {e}")))?;
        }
        Ok(config)
    }

    /// Full path of the HTML report
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.reports_dir.join(&self.report_file)
    }

    /// Per-test timeout
    #[must_use]
    pub const fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    /// qTest settings when reporting is configured and enabled
    #[must_use]
    pub fn upload_target(&self) -> Option<&QTestConfig> {
        self.qtest.as_ref().filter(|q| q.enabled)
    }

    /// Copy safe to print: the API token is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(qtest) = copy.qtest.as_mut() {
            qtest.api_token = redact(&qtest.api_token);
        }
        copy
    }
}

/// How test runs are named when attached to the session suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunNaming {
    /// Bare PID, e.g. `TC-9984`
    Pid,
    /// `{pid}-{name}` when the test case has a display name
    #[default]
    PidAndName,
}

/// Connection and behavior settings for the qTest bridge.
#[derive(Clone, Serialize, Deserialize)]
pub struct QTestConfig {
    /// Whether results are uploaded at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// API root, e.g. `https://example.qtestnet.com/api/v3`
    pub base_url: String,
    /// qTest project id
    pub project_id: String,
    /// Parent module whose test cases are searched
    pub module_id: String,
    /// Bearer token
    #[serde(default)]
    pub api_token: String,
    /// Test cases fetched per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound on pages fetched while resolving one PID
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// TCP connect timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Name of the cycle created per session
    #[serde(default = "default_cycle_name")]
    pub cycle_name: String,
    /// Name of the suite created per session
    #[serde(default = "default_suite_name")]
    pub suite_name: String,
    /// Test run naming
    #[serde(default)]
    pub run_naming: RunNaming,
}

impl QTestConfig {
    /// Create a config with defaults for everything but the connection
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        module_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            enabled: true,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            module_id: module_id.into(),
            api_token: api_token.into(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            cycle_name: default_cycle_name(),
            suite_name: default_suite_name(),
            run_naming: RunNaming::default(),
        }
    }

    /// Set run naming
    #[must_use]
    pub const fn with_run_naming(mut self, naming: RunNaming) -> Self {
        self.run_naming = naming;
        self
    }

    /// Set the pagination bound
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Project-scoped API root: `{base_url}/projects/{project_id}`
    #[must_use]
    pub fn project_url(&self) -> String {
        format!(
            "{}/projects/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }

    /// Connect timeout
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("qtest.base_url is empty".to_string());
        }
        if self.api_token.is_empty() {
            return Err(format!(
                "qtest.api_token is empty; set it in the config file or via {TOKEN_ENV_VAR}"
            ));
        }
        if self.page_size == 0 {
            return Err("qtest.page_size must be at least 1".to_string());
        }
        if self.max_pages == 0 {
            return Err("qtest.max_pages must be at least 1".to_string());
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err("qtest timeouts must be at least 1 second".to_string());
        }
        Ok(())
    }
}

impl fmt::Debug for QTestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QTestConfig")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("module_id", &self.module_id)
            .field("api_token", &redact(&self.api_token))
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cycle_name", &self.cycle_name)
            .field("suite_name", &self.suite_name)
            .field("run_naming", &self.run_naming)
            .finish()
    }
}

/// Mask a secret for display, keeping only its last four characters.
#[must_use]
pub fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_report_file() -> String {
    "TestReport.html".to_string()
}

const fn default_test_timeout_ms() -> u64 {
    30_000
}

const fn default_true() -> bool {
    true
}

const fn default_page_size() -> u32 {
    50
}

const fn default_max_pages() -> u32 {
    200
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_cycle_name() -> String {
    "Automated Test Cycle".to_string()
}

fn default_suite_name() -> String {
    "Automated Test Suite".to_string()
}
