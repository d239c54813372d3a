//! Shared fixtures for navigator integration tests
#![allow(dead_code)]

use lognav::{Navigator, NavigatorConfigBuilder, Page};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `count` lines like `11/11/2010~Thread-1~com.test`, one day apart
pub fn dated_lines(count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| format!("{}/11/2010~Thread-{i}~com.test", 10 + i))
        .collect()
}

/// Write `lines` newline-terminated into `dir/name`
pub fn write_log(dir: &TempDir, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    path
}

/// Append `lines` to an existing log
pub fn append_log(path: &Path, lines: &[String]) {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
}

pub fn navigator_for(paths: &[PathBuf], capacity: usize) -> Navigator {
    let builder = paths
        .iter()
        .fold(NavigatorConfigBuilder::new(), |builder, path| builder.file(path));

    Navigator::new(builder.initial_capacity(capacity).build()).unwrap()
}

/// Rows of a page rendered back to their raw text
pub fn texts(page: &Page) -> Vec<String> {
    page.rows().iter().map(|row| row.columns().join("~")).collect()
}

/// The 1-based lines `from..=to` of `lines`
pub fn slice(lines: &[String], from: usize, to: usize) -> Vec<String> {
    lines[from - 1..to].to_vec()
}
