use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bug_report::{BugReporter, DEFAULT_GITHUB_API};
use crate::cli::GlobalArgs;
use crate::geocode::{GeocodingClient, DEFAULT_GEOCODING_URL, DEFAULT_LIMIT};
use crate::http::ApiClient;
use crate::services::storage::default_data_dir;

/// Where bug reports are filed.
#[derive(Clone)]
pub struct BugReportConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub token: Option<String>,
}

impl std::fmt::Debug for BugReportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BugReportConfig")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Runtime configuration resolved from file, env and CLI.
#[derive(Clone, Debug)]
pub struct Config {
    /// Backend base URL without trailing slash.
    pub api_url: String,
    pub geocoding_url: String,
    pub geocoding_limit: u32,
    pub bug_report: BugReportConfig,
    /// Where the session token and last location are kept.
    pub data_dir: PathBuf,
    pub logging_enabled: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    api: FileApi,
    #[serde(default)]
    geocoding: FileGeocoding,
    #[serde(default)]
    bug_report: FileBugReport,
    #[serde(default)]
    logging: FileLogging,
}

#[derive(Deserialize)]
struct FileApi {
    #[serde(default = "default_api_url")]
    url: String,
}

#[derive(Deserialize)]
struct FileGeocoding {
    #[serde(default = "default_geocoding_url")]
    url: String,
    #[serde(default = "default_limit")]
    limit: u32,
}

#[derive(Deserialize)]
struct FileBugReport {
    #[serde(default = "default_owner")]
    owner: String,
    #[serde(default = "default_repo")]
    repo: String,
    #[serde(default = "default_github_api")]
    api_url: String,
}

#[derive(Deserialize)]
struct FileLogging {
    #[serde(default = "default_logging")]
    enabled: bool,
}

fn default_api_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.to_string()
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_owner() -> String {
    "ClementObspher".to_string()
}

fn default_repo() -> String {
    "kifekoi".to_string()
}

fn default_github_api() -> String {
    DEFAULT_GITHUB_API.to_string()
}

fn default_logging() -> bool {
    true
}

impl Default for FileApi {
    fn default() -> Self {
        Self {
            url: default_api_url(),
        }
    }
}

impl Default for FileGeocoding {
    fn default() -> Self {
        Self {
            url: default_geocoding_url(),
            limit: default_limit(),
        }
    }
}

impl Default for FileBugReport {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            repo: default_repo(),
            api_url: default_github_api(),
        }
    }
}

impl Default for FileLogging {
    fn default() -> Self {
        Self {
            enabled: default_logging(),
        }
    }
}

impl Config {
    /// Resolve configuration from the config file, environment variables and CLI.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        // config file path precedence: CLI -> ENV -> default
        let config_path = args
            .config
            .clone()
            .or_else(|| std::env::var("KIFEKOI_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("config/kifekoi.toml"));

        let file_cfg = match fs::read(&config_path) {
            Ok(bytes) => {
                let contents = String::from_utf8_lossy(&bytes);
                toml::from_str(&contents)
                    .with_context(|| format!("invalid config file {}", config_path.display()))?
            }
            Err(_) => FileConfig::default(),
        };
        let mut api_url = file_cfg.api.url;
        let mut geocoding_url = file_cfg.geocoding.url;
        let mut logging = file_cfg.logging.enabled;

        // environment overrides
        if let Ok(u) = std::env::var("KIFEKOI_API_URL") {
            api_url = u;
        }
        if let Ok(u) = std::env::var("KIFEKOI_GEOCODING_URL") {
            geocoding_url = u;
        }
        if let Ok(l) = std::env::var("KIFEKOI_LOGGING") {
            if let Ok(l) = l.parse::<bool>() {
                logging = l;
            }
        }
        let token = std::env::var("KIFEKOI_GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        // CLI overrides
        if let Some(u) = &args.api_url {
            api_url = u.clone();
        }
        if let Some(l) = args.logging {
            logging = l;
        }

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            anyhow::bail!("invalid api url {api_url}");
        }
        let api_url = api_url.trim_end_matches('/').to_string();

        let data_dir = default_data_dir().context("no data directory available")?;

        Ok(Self {
            api_url,
            geocoding_url,
            geocoding_limit: file_cfg.geocoding.limit,
            bug_report: BugReportConfig {
                api_url: file_cfg.bug_report.api_url,
                owner: file_cfg.bug_report.owner,
                repo: file_cfg.bug_report.repo,
                token,
            },
            data_dir,
            logging_enabled: logging,
        })
    }

    pub fn api_client(&self) -> ApiClient {
        ApiClient::new(&self.api_url)
    }

    pub fn geocoding_client(&self) -> GeocodingClient {
        GeocodingClient::new(&self.geocoding_url, self.geocoding_limit)
    }

    pub fn bug_reporter(&self) -> BugReporter {
        let b = &self.bug_report;
        BugReporter::new(&b.api_url, &b.owner, &b.repo, b.token.clone())
    }
}
