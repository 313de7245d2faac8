use std::fmt::{self, Write as _};
use std::str::FromStr;

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ClientError, Result};
use crate::validation::validate_bug_report;

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "priority: low",
            Priority::Medium => "priority: medium",
            Priority::High => "priority: high",
            Priority::Critical => "priority: critical",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(format!("unknown priority {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ui,
    Performance,
    Crash,
    Feature,
    Data,
    #[default]
    Other,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Ui => "type: ui",
            Category::Performance => "type: performance",
            Category::Crash => "type: crash",
            Category::Feature => "type: feature-request",
            Category::Data => "type: data",
            Category::Other => "type: other",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ui" => Ok(Category::Ui),
            "performance" => Ok(Category::Performance),
            "crash" => Ok(Category::Crash),
            "feature" => Ok(Category::Feature),
            "data" => Ok(Category::Data),
            "other" => Ok(Category::Other),
            other => Err(format!("unknown category {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub platform: String,
    pub os_version: String,
    pub app_version: String,
    pub device_model: Option<String>,
}

impl DeviceInfo {
    /// Best description of the machine running this binary.
    pub fn current() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
            os_version: std::env::consts::ARCH.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            device_model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugReport {
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    pub expected_behavior: String,
    pub actual_behavior: String,
    pub device_info: DeviceInfo,
    pub priority: Priority,
    pub category: Category,
    pub user_email: Option<String>,
}

/// Issue payload as the GitHub REST API expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitHubIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
}

pub fn format_issue(report: &BugReport) -> GitHubIssue {
    let d = &report.device_info;
    let mut body = String::new();
    // writing to a String cannot fail
    let _ = write_body(&mut body, report, d);
    GitHubIssue {
        title: format!("[BUG] {}", report.title),
        body,
        labels: vec![
            "bug".to_string(),
            report.priority.label().to_string(),
            report.category.label().to_string(),
            "client-report".to_string(),
        ],
        assignees: Vec::new(),
    }
}

fn write_body(out: &mut String, report: &BugReport, d: &DeviceInfo) -> fmt::Result {
    writeln!(out, "## 🐛 Description\n{}\n", report.description)?;
    writeln!(out, "## 📱 Device")?;
    writeln!(out, "- **Platform:** {}", d.platform)?;
    writeln!(out, "- **OS version:** {}", d.os_version)?;
    writeln!(out, "- **App version:** {}", d.app_version)?;
    if let Some(model) = &d.device_model {
        writeln!(out, "- **Model:** {model}")?;
    }
    writeln!(out, "\n## 🔄 Steps to reproduce")?;
    for (i, step) in report.steps.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, step)?;
    }
    writeln!(out, "\n## ✅ Expected behavior\n{}\n", report.expected_behavior)?;
    writeln!(out, "## ❌ Actual behavior\n{}\n", report.actual_behavior)?;
    if let Some(email) = &report.user_email {
        writeln!(out, "## 📧 Contact\n{email}\n")?;
    }
    write!(out, "---\n*Report generated automatically by the Kifekoi client*")
}

#[derive(Deserialize)]
struct CreatedIssue {
    html_url: String,
}

/// Files bug reports as issues on the project's GitHub repository.
#[derive(Clone)]
pub struct BugReporter {
    api_url: String,
    owner: String,
    repo: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl fmt::Debug for BugReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BugReporter")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl BugReporter {
    pub fn new(
        api_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.filter(|t| !t.is_empty()),
            http: reqwest::Client::new(),
        }
    }

    /// Validate, format and file `report`, returning the new issue's URL.
    pub async fn submit(&self, report: &BugReport) -> Result<String> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ClientError::NotConfigured("GitHub token".into()))?;
        validate_bug_report(report)?;
        let issue = format_issue(report);
        let url = format!("{}/repos/{}/{}/issues", self.api_url, self.owner, self.repo);
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .header(header::USER_AGENT, concat!("kifekoi/", env!("CARGO_PKG_VERSION")))
            .json(&issue)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .or(status.canonical_reason())
                .unwrap_or("request failed")
                .to_string();
            warn!(%status, %message, "bug report rejected");
            return Err(ClientError::Http { status, message });
        }
        let created: CreatedIssue = resp.json().await?;
        info!(url = %created.html_url, "bug report filed");
        Ok(created.html_url)
    }
}
