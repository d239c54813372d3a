//! Plain-text page printing

use lognav::{Page, Row};
use std::io::{self, Write};

/// Fit `text` into `width` characters, keeping its end; 0 means unbounded
pub fn fit(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let len = text.chars().count();
    if len >= width {
        return text.chars().skip(len - width).collect();
    }

    format!("{text:<width$}")
}

pub fn write_header<W: Write>(out: &mut W, headers: &[&str], widths: &[usize]) -> io::Result<()> {
    if headers.is_empty() {
        return Ok(());
    }

    writeln!(out, "{}", join_columns(headers, widths))
}

/// Print every row; the highlighted row is marked with `>`
pub fn write_page<W: Write>(
    out: &mut W,
    page: &Page,
    widths: &[usize],
    highlight: Option<usize>,
) -> io::Result<()> {
    for (index, row) in page.rows().iter().enumerate() {
        let text = match row {
            Row::Structured(_) => join_columns(&row.columns(), widths),
            Row::Continuation(text) => text.clone(),
        };

        match highlight {
            Some(h) if h == index => writeln!(out, "> {text}")?,
            Some(_) => writeln!(out, "  {text}")?,
            None => writeln!(out, "{text}")?,
        }
    }

    Ok(())
}

fn join_columns(columns: &[&str], widths: &[usize]) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| fit(column, widths.get(i).copied().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(" ")
}
