//! Configuration types and CLI options.
//!
//! `Opt` is the command-line surface (every option also readable from the
//! environment); `Config` is the library configuration it converts into.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_DETECTION_THRESHOLD, DEFAULT_FEED_URL, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_STATS_INTERVAL_SECS, DEFAULT_TABLE_NAME, MAX_CONCURRENCY_LIMIT, STDIN_INPUT,
};
use crate::detection::DetectionConfig;
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace). Below-threshold matches are only visible at `Debug`.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// Adds below-threshold matches
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// HTTP proxy settings for the feed connection.
///
/// Handed to the feed collaborator as-is.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Identity of the CT log aggregator and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEndpoint {
    pub url: String,
    pub proxy: Option<ProxyConfig>,
}

impl Default for FeedEndpoint {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            proxy: None,
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use ct_monitor::Config;
///
/// let config = Config {
///     search_pattern: "paypal|login|verify".to_string(),
///     detection_threshold: 2,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-lines feed to read (`-` for stdin)
    pub input: PathBuf,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Detection table name
    pub table_name: String,

    /// Keywords of interest (regular expression)
    pub search_pattern: String,

    /// Known-benign matches (regular expression, empty for none)
    pub blacklist_pattern: String,

    /// Minimum distinct keyword hits for a full detection
    pub detection_threshold: i64,

    /// Aggregator endpoint and proxy
    pub feed: FeedEndpoint,

    /// Events handled concurrently
    pub max_concurrency: usize,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Write logs to this file instead of stderr
    pub log_file: Option<PathBuf>,

    /// Seconds between statistics log lines (0 disables)
    pub stats_interval_secs: u64,

    /// Print stored detections and exit
    pub list: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(STDIN_INPUT),
            db_path: PathBuf::from(DB_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            search_pattern: String::new(),
            blacklist_pattern: String::new(),
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            feed: FeedEndpoint::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            log_file: None,
            stats_interval_secs: DEFAULT_STATS_INTERVAL_SECS,
            list: false,
        }
    }
}

impl Config {
    /// Compiles the detection settings.
    ///
    /// # Errors
    ///
    /// See [`DetectionConfig::new`].
    pub fn detection(&self) -> Result<DetectionConfig, ConfigError> {
        DetectionConfig::new(
            &self.search_pattern,
            &self.blacklist_pattern,
            self.detection_threshold,
        )
    }

    /// Checks everything that must hold before the feed is consumed.
    ///
    /// The search pattern and threshold are not needed to list detections, so
    /// they are only checked when `list` is false.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_table_name(&self.table_name)?;

        if self.list {
            return Ok(());
        }

        self.detection()?;

        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(ConfigError::InvalidConcurrency {
                value: self.max_concurrency,
                max: MAX_CONCURRENCY_LIMIT,
            });
        }

        if let Some(proxy) = &self.feed.proxy {
            if proxy.host.trim().is_empty() {
                return Err(ConfigError::ProxyWithoutHost);
            }
        }

        Ok(())
    }
}

/// Table names are interpolated into SQL, so only plain identifiers are allowed.
pub fn validate_table_name(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidTableName(name.to_string()))
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Pipe the certstream CLI into the monitor
/// certstream --full --json | ct_monitor --search-pattern 'paypal|login|verify'
///
/// # Replay a capture, suppressing the real domain
/// ct_monitor --input capture.jsonl --search-pattern 'paypal|login' \
///     --blacklist-pattern '\.paypal\.com$' --detection-threshold 2
///
/// # Show what has been recorded so far
/// ct_monitor --list
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "ct_monitor",
    version,
    about = "Flags newly certified hostnames that match suspicious keyword patterns."
)]
pub struct Opt {
    /// Certstream messages as JSON lines (`-` reads stdin)
    #[arg(long, env = "CT_MONITOR_INPUT", default_value = STDIN_INPUT)]
    pub input: PathBuf,

    /// Database path (SQLite file)
    #[arg(long, env = "CT_MONITOR_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Detection table name
    #[arg(long, env = "CT_MONITOR_TABLE", default_value = DEFAULT_TABLE_NAME)]
    pub table_name: String,

    /// Keywords of interest (regular expression)
    #[arg(long, env = "CT_MONITOR_SEARCH", default_value = "")]
    pub search_pattern: String,

    /// Known-benign matches to suppress (regular expression)
    #[arg(long, env = "CT_MONITOR_BLACKLIST", default_value = "")]
    pub blacklist_pattern: String,

    /// Minimum distinct keyword hits for a detection
    #[arg(long, env = "CT_MONITOR_THRESHOLD", default_value_t = DEFAULT_DETECTION_THRESHOLD, allow_negative_numbers = true)]
    pub detection_threshold: i64,

    /// CT log aggregator URL
    #[arg(long, env = "CT_MONITOR_FEED_URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// HTTP proxy host for the feed connection
    #[arg(long, env = "CT_MONITOR_PROXY_HOST")]
    pub proxy_host: Option<String>,

    /// HTTP proxy port
    #[arg(long, env = "CT_MONITOR_PROXY_PORT")]
    pub proxy_port: Option<u16>,

    /// HTTP proxy user
    #[arg(long, env = "CT_MONITOR_PROXY_USERNAME")]
    pub proxy_username: Option<String>,

    /// HTTP proxy password
    #[arg(long, env = "CT_MONITOR_PROXY_PASSWORD", hide_env_values = true)]
    pub proxy_password: Option<String>,

    /// Events handled concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "CT_MONITOR_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Seconds between statistics log lines (0 disables)
    #[arg(long, default_value_t = DEFAULT_STATS_INTERVAL_SECS)]
    pub stats_interval_secs: u64,

    /// Print recorded detections and exit
    #[arg(long)]
    pub list: bool,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        let any_proxy_setting = opt.proxy_host.is_some()
            || opt.proxy_port.is_some()
            || opt.proxy_username.is_some()
            || opt.proxy_password.is_some();
        let proxy = any_proxy_setting.then(|| ProxyConfig {
            host: opt.proxy_host.unwrap_or_default(),
            port: opt.proxy_port,
            username: opt.proxy_username,
            password: opt.proxy_password,
        });

        Config {
            input: opt.input,
            db_path: opt.db_path,
            table_name: opt.table_name,
            search_pattern: opt.search_pattern,
            blacklist_pattern: opt.blacklist_pattern,
            detection_threshold: opt.detection_threshold,
            feed: FeedEndpoint {
                url: opt.feed_url,
                proxy,
            },
            max_concurrency: opt.max_concurrency,
            log_level: opt.log_level,
            log_format: opt.log_format,
            log_file: opt.log_file,
            stats_interval_secs: opt.stats_interval_secs,
            list: opt.list,
        }
    }
}
