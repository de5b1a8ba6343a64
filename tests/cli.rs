// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![cfg(feature = "cli")]

use std::fs;
use std::path::Path;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

fn run(base_path: &Path, args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_fast-logger"))
        .arg("--name")
        .arg("cli")
        .arg("--base-path")
        .arg(base_path)
        .arg("--format")
        .arg("{level}: {message}")
        .args(args)
        .output()
        .expect("failed to run fast-logger");
    assert!(output.status.success(), "{output:?}");
    output
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8(output.stdout.clone())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_stdout_line_per_message_at_threshold() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["-l", "warning", "-s", "error", "one", "two"]);
    assert_eq!(stdout_lines(&output), vec!["ERROR: one", "ERROR: two"]);

    let file = fs::read_to_string(dir.path().join("logs").join("cli.log")).unwrap();
    assert_eq!(file, "ERROR: one\nERROR: two\n");
}

#[test]
fn test_stdout_is_silent_below_threshold() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["-l", "warning", "-s", "info", "dropped"]);
    assert!(stdout_lines(&output).is_empty(), "{output:?}");

    let file = fs::read_to_string(dir.path().join("logs").join("cli.log")).unwrap();
    assert_eq!(file, "");
}

#[test]
fn test_no_console_keeps_stdout_empty() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["--no-console", "-s", "critical", "kept"]);
    assert!(stdout_lines(&output).is_empty(), "{output:?}");

    let file = fs::read_to_string(dir.path().join("logs").join("cli.log")).unwrap();
    assert_eq!(file, "CRITICAL: kept\n");
}
