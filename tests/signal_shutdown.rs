//! Process-level shutdown: the binary must exit on SIGINT/SIGTERM even while
//! its stdin feed is idle.

#![cfg(unix)]

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Starts the monitor on a piped stdin that never receives a line and waits
/// until it is reading the feed.
fn spawn_idle_monitor(dir: &TempDir) -> Child {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ct_monitor"))
        .args(["--search-pattern", "paypal|login", "--stats-interval-secs", "0"])
        .arg("--db-path")
        .arg(dir.path().join("signal.db"))
        .env("RUST_LOG", "info")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start ct_monitor");

    let stderr = child.stderr.take().expect("stderr is piped");
    let (ready_tx, ready_rx) = mpsc::channel();
    thread::spawn(move || {
        let mut ready_tx = Some(ready_tx);
        // keep draining so the child never blocks on a full pipe
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            if line.contains("Feed endpoint") {
                if let Some(tx) = ready_tx.take() {
                    let _ = tx.send(());
                }
            }
        }
    });
    ready_rx
        .recv_timeout(Duration::from_secs(20))
        .expect("monitor should start reading its feed");
    child
}

fn send_signal(child: &Child, signal: &str) {
    let status = Command::new("kill")
        .arg(format!("-{}", signal))
        .arg(child.id().to_string())
        .status()
        .expect("Failed to run kill");
    assert!(status.success());
}

fn wait_with_deadline(child: &mut Child, deadline: Duration) -> Option<ExitStatus> {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if let Some(status) = child.try_wait().expect("try_wait") {
            return Some(status);
        }
        thread::sleep(Duration::from_millis(50));
    }
    None
}

fn assert_exits_on(signal: &str) {
    let dir = TempDir::new().unwrap();
    let mut child = spawn_idle_monitor(&dir);
    // stdin stays open and silent for the whole test
    let _stdin = child.stdin.take();

    send_signal(&child, signal);

    match wait_with_deadline(&mut child, Duration::from_secs(5)) {
        Some(status) => assert!(status.success(), "unexpected exit status {:?}", status),
        None => {
            let _ = child.kill();
            let _ = child.wait();
            panic!("ct_monitor still running 5s after SIG{}", signal);
        }
    }
    assert!(dir.path().join("signal.db").exists());
}

#[test]
fn test_sigint_exits_with_idle_stdin() {
    assert_exits_on("INT");
}

#[test]
fn test_sigterm_exits_with_idle_stdin() {
    assert_exits_on("TERM");
}
