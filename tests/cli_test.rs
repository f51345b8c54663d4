use std::path::PathBuf;
use std::process::{Command, Output};

use leibniz_pi::{report, threads};

fn leibniz_pi(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_leibniz-pi"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Method column of every table row, header and rule skipped.
fn methods(table: &str) -> Vec<String> {
    table
        .lines()
        .skip(2)
        .filter_map(|line| line.split_whitespace().next())
        .map(String::from)
        .collect()
}

#[test]
fn no_selection_runs_every_strategy() {
    let output: Output = leibniz_pi(&["-n", "10000", "-b", "3000", "-t", "2", "-p", "2"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let table: String = stdout(&output);
    assert!(table.starts_with("Method"));
    assert_eq!(
        methods(&table),
        vec![
            "Leibniz",
            "Leibniz-Power(10)",
            "Fixed-Threads",
            "Process-Pool",
            "Producer-Consumer",
            "Thread-Pool",
        ]
    );
}

#[test]
fn thread_pool_size_comes_from_flag() {
    let output: Output = leibniz_pi(&["-n", "1000", "-b", "300", "--thread-pool", "3"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(methods(&stdout(&output)), vec!["Thread-Pool"]);

    let output: Output = leibniz_pi(&["-n", "1000", "--thread-pool", "0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("worker_count must be at least 1"));
}

#[test]
fn only_pi_prints_bare_approximations_in_run_order() {
    let args: [&str; 7] = [
        "-n",
        "1000",
        "-b",
        "300",
        "--process-pool",
        "--fixed-threads",
        "--only-pi",
    ];
    let output: Output = leibniz_pi(&args);
    assert!(output.status.success(), "{}", stderr(&output));

    let printed: String = stdout(&output);
    assert!(!printed.contains("Method"));

    let lines: Vec<&str> = printed.lines().collect();
    let expected: String = report::format_pi(threads::run(1_000, 4, 300).unwrap());
    assert_eq!(lines, vec![expected.as_str(), expected.as_str()]);
    for line in lines {
        let (_, decimals) = line.split_once('.').unwrap();
        assert_eq!(decimals.len(), 20);
    }
}

#[test]
fn hosts_only_warns() {
    let output: Output = leibniz_pi(&["-n", "1000", "--fixed-threads", "--hosts", "a,b"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(methods(&stdout(&output)), vec!["Fixed-Threads"]);

    let log: String = stderr(&output);
    assert!(log.contains("WARN"));
    assert!(log.contains("--hosts"));
    // stderr is a pipe here, so no colour codes.
    assert!(!log.contains('\x1b'));
}

#[test]
fn zero_threads_fail_before_running() {
    let output: Output = leibniz_pi(&["-n", "1000", "-t", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("invalid configuration: worker_count must be at least 1"));
}

#[test]
fn failed_strategy_does_not_stop_later_ones() {
    let missing: PathBuf = std::env::temp_dir().join("leibniz-pi-missing-worker");
    let args: [&str; 7] = [
        "-n",
        "1000",
        "--fixed-threads",
        "--process-pool",
        "--producer-consumer",
        "--worker-program",
        missing.to_str().unwrap(),
    ];
    let output: Output = leibniz_pi(&args);
    assert!(!output.status.success());

    let log: String = stderr(&output);
    assert!(log.contains("Process-Pool: failed: "), "{}", log);
    assert!(log.contains("1 of 3 strategies failed"), "{}", log);
    assert_eq!(methods(&stdout(&output)), vec!["Fixed-Threads", "Producer-Consumer"]);
}
