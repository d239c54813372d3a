//! Search cycling and message expansion

mod common;

use common::{navigator_for, texts, write_log};
use lognav::{Row, SearchOptions};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn stack_trace_log() -> Vec<String> {
    [
        "01/12/2010~main~INFO~Starting",
        "02/12/2010~main~ERROR~Request failed",
        "java.lang.RuntimeException: wrapper",
        "\tat com.test.A.run(A.java:1)",
        "Caused by: java.io.IOException: disk",
        "\tat com.test.B.read(B.java:2)",
        "Caused by: java.lang.IllegalStateException: closed",
        "03/12/2010~worker~WARN~Retrying",
        "04/12/2010~worker~ERROR~Gave up",
        "Caused by: java.util.concurrent.TimeoutException",
        "05/12/2010~main~INFO~Shutdown",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

#[test]
fn test_repeated_search_cycles_through_occurrences() {
    let dir = TempDir::new().unwrap();
    let lines = stack_trace_log();
    let path = write_log(&dir, "trace.log", &lines);
    let mut navigator = navigator_for(&[path], 4);

    let first = navigator.search("Caused by:", 0);
    assert_eq!(first.line, Some(5));
    assert_eq!(first.highlight, Some(0));
    assert!(!first.wrapped);
    assert_eq!(texts(&first.page), lines[4..8].to_vec());

    let second = navigator.search("Caused by:", 0);
    assert_eq!(second.line, Some(7));
    assert_eq!(second.highlight, Some(0));

    // Near the end of the file the tail page is shown instead
    let third = navigator.search("Caused by:", 0);
    assert_eq!(third.line, Some(10));
    assert_eq!(texts(&third.page), lines[7..11].to_vec());
    assert_eq!(third.highlight, Some(2));

    let wrapped = navigator.search("Caused by:", 0);
    assert_eq!(wrapped.line, Some(5));
    assert!(wrapped.wrapped);
    assert_eq!(wrapped.highlight, Some(0));
}

#[test]
fn test_search_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "case.log", &stack_trace_log());
    let mut navigator = navigator_for(&[path], 3);

    let outcome = navigator.search("GAVE UP", 0);
    assert_eq!(outcome.line, Some(9));
    let row = outcome.page.row(outcome.highlight.unwrap()).unwrap();
    assert_eq!(row.column(3), Some("Gave up"));
}

#[test]
fn test_search_starts_after_the_given_line() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "from.log", &stack_trace_log());
    let mut navigator = navigator_for(&[path], 3);

    let outcome = navigator.search("ERROR", 2);
    assert_eq!(outcome.line, Some(9));

    // A new term ignores the previous term's position
    let outcome = navigator.search("INFO", 0);
    assert_eq!(outcome.line, Some(1));
}

#[test]
fn test_explicit_line_overrides_remembered_match() {
    let dir = TempDir::new().unwrap();
    let lines: Vec<String> = ["a~x", "hit 1", "b~y", "hit 2", "c~z", "hit 3", "d~w"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let path = write_log(&dir, "explicit.log", &lines);
    let mut navigator = navigator_for(&[path], 2);

    assert_eq!(navigator.search("hit", 0).line, Some(2));
    assert_eq!(navigator.search("hit", 4).line, Some(6));

    // The explicit jump becomes the new cycle position
    let wrapped = navigator.search("hit", 0);
    assert_eq!(wrapped.line, Some(2));
    assert!(wrapped.wrapped);
}

#[test]
fn test_navigation_resets_search_cycle() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "reset.log", &stack_trace_log());
    let mut navigator = navigator_for(&[path], 3);

    assert_eq!(navigator.search("Caused by:", 0).line, Some(5));
    assert_eq!(navigator.search("Caused by:", 0).line, Some(7));

    navigator.head();
    assert_eq!(navigator.search("Caused by:", 0).line, Some(5));
}

#[test]
fn test_absent_term_keeps_current_page() {
    let dir = TempDir::new().unwrap();
    let lines = stack_trace_log();
    let path = write_log(&dir, "absent.log", &lines);
    let mut navigator = navigator_for(&[path], 3);

    let head = navigator.head();
    let outcome = navigator.search("OutOfMemoryError", 0);

    assert!(!outcome.found());
    assert_eq!(outcome.line, None);
    assert_eq!(outcome.page, head);
}

#[test]
fn test_search_turns_follow_mode_off() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "follow.log", &stack_trace_log());
    let mut navigator = navigator_for(&[path], 3);

    navigator.tail();
    assert!(navigator.is_following());
    navigator.search("Starting", 0);
    assert!(!navigator.is_following());
}

#[test]
fn test_regex_search() {
    let dir = TempDir::new().unwrap();
    let path = write_log(&dir, "regex.log", &stack_trace_log());
    let mut navigator = navigator_for(&[path], 3);

    let options = SearchOptions {
        case_sensitive: true,
        use_regex: true,
    };
    let outcome = navigator
        .search_with(r"~worker~(WARN|ERROR)~", 0, &options)
        .unwrap();
    assert_eq!(outcome.line, Some(8));

    let outcome = navigator
        .search_with(r"~worker~(WARN|ERROR)~", 0, &options)
        .unwrap();
    assert_eq!(outcome.line, Some(9));

    assert!(navigator.search_with("(unclosed", 0, &options).is_err());
}

#[test]
fn test_message_expands_stack_traces() {
    let dir = TempDir::new().unwrap();
    let lines = stack_trace_log();
    let path = write_log(&dir, "message.log", &lines);
    let mut navigator = navigator_for(&[path], 4);

    let page = navigator.head();
    assert!(matches!(page.row(1), Some(Row::Structured(_))));
    assert!(matches!(page.row(2), Some(Row::Continuation(_))));

    assert_eq!(navigator.message(&page, 0), Some(lines[0].clone()));
    assert_eq!(navigator.message(&page, 1), Some(lines[1..7].join("\n")));
    assert_eq!(navigator.message(&page, 2), Some(lines[2..7].join("\n")));
    assert_eq!(navigator.message(&page, 4), None);
}
