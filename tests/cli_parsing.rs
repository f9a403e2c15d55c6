//! Tests for command-line parsing and the `Opt` to `Config` conversion.

use clap::Parser;
use ct_monitor::config::{LogFormat, LogLevel};
use ct_monitor::{Config, Opt};
use std::path::PathBuf;

fn parse(args: &[&str]) -> Config {
    let mut argv = vec!["ct_monitor"];
    argv.extend_from_slice(args);
    Config::from(Opt::try_parse_from(argv).expect("arguments should parse"))
}

#[test]
fn test_defaults() {
    let config = parse(&["--search-pattern", "paypal"]);
    assert_eq!(config.input, PathBuf::from("-"));
    assert_eq!(config.db_path, PathBuf::from("./ct_monitor.db"));
    assert_eq!(config.table_name, "detections");
    assert_eq!(config.detection_threshold, 2);
    assert_eq!(config.feed.url, "wss://certstream.calidog.io");
    assert!(config.feed.proxy.is_none());
    assert!(matches!(config.log_level, LogLevel::Info));
    assert!(matches!(config.log_format, LogFormat::Plain));
    assert!(!config.list);
    assert!(config.validate().is_ok());
}

#[test]
fn test_all_detection_options() {
    let config = parse(&[
        "--input",
        "capture.jsonl",
        "--db-path",
        "/tmp/ct.db",
        "--table-name",
        "phishing_hits",
        "--search-pattern",
        "paypal|login|verify",
        "--blacklist-pattern",
        r"\.paypal\.com$",
        "--detection-threshold",
        "3",
        "--max-concurrency",
        "4",
        "--log-level",
        "debug",
        "--log-format",
        "json",
    ]);
    assert_eq!(config.input, PathBuf::from("capture.jsonl"));
    assert_eq!(config.db_path, PathBuf::from("/tmp/ct.db"));
    assert_eq!(config.table_name, "phishing_hits");
    assert_eq!(config.search_pattern, "paypal|login|verify");
    assert_eq!(config.blacklist_pattern, r"\.paypal\.com$");
    assert_eq!(config.detection_threshold, 3);
    assert_eq!(config.max_concurrency, 4);
    assert!(matches!(config.log_level, LogLevel::Debug));
    assert!(matches!(config.log_format, LogFormat::Json));
    assert!(config.validate().is_ok());
}

#[test]
fn test_negative_threshold_parses_and_fails_validation() {
    let config = parse(&["--search-pattern", "paypal", "--detection-threshold", "-1"]);
    assert_eq!(config.detection_threshold, -1);
    assert!(config.validate().is_err());
}

#[test]
fn test_proxy_options_build_proxy_config() {
    let config = parse(&[
        "--search-pattern",
        "paypal",
        "--proxy-host",
        "proxy.internal",
        "--proxy-port",
        "3128",
        "--proxy-username",
        "monitor",
        "--proxy-password",
        "hunter2",
    ]);
    let proxy = config.feed.proxy.as_ref().expect("proxy should be set");
    assert_eq!(proxy.host, "proxy.internal");
    assert_eq!(proxy.port, Some(3128));
    assert_eq!(proxy.username.as_deref(), Some("monitor"));
    assert!(!format!("{:?}", proxy).contains("hunter2"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_proxy_port_without_host_is_rejected() {
    let config = parse(&["--search-pattern", "paypal", "--proxy-port", "8080"]);
    assert!(config.feed.proxy.is_some());
    assert!(config.validate().is_err());
}

#[test]
fn test_list_mode_needs_no_search_pattern() {
    let config = parse(&["--list"]);
    assert!(config.list);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_values_are_rejected_by_parser() {
    assert!(Opt::try_parse_from(["ct_monitor", "--log-level", "loud"]).is_err());
    assert!(Opt::try_parse_from(["ct_monitor", "--log-format", "xml"]).is_err());
    assert!(Opt::try_parse_from(["ct_monitor", "--proxy-port", "70000"]).is_err());
    assert!(Opt::try_parse_from(["ct_monitor", "--detection-threshold", "two"]).is_err());
}
