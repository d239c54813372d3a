//! Row and page model

use crate::config::ColumnConfig;
use crate::locator::Located;
use std::ops::Range;

/// A located line, classified by whether it carries the column delimiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// A line split into columns on the configured delimiter
    Structured(Vec<String>),
    /// A line without the delimiter, such as a stack-trace frame
    Continuation(String),
}

impl Row {
    /// Classify and split a single line
    pub fn parse(line: &str, delimiter: &str) -> Self {
        if has_delimiter(line, delimiter) {
            Self::Structured(line.split(delimiter).map(str::to_string).collect())
        } else {
            Self::Continuation(line.to_string())
        }
    }

    pub const fn is_continuation(&self) -> bool {
        matches!(self, Self::Continuation(_))
    }

    /// Column values; a continuation line is a single column
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Structured(columns) => columns.iter().map(String::as_str).collect(),
            Self::Continuation(text) => vec![text.as_str()],
        }
    }

    /// Column at `index`, only for structured rows
    pub fn column(&self, index: usize) -> Option<&str> {
        match self {
            Self::Structured(columns) => columns.get(index).map(String::as_str),
            Self::Continuation(_) => None,
        }
    }

    pub fn into_columns(self) -> Vec<String> {
        match self {
            Self::Structured(columns) => columns,
            Self::Continuation(text) => vec![text],
        }
    }
}

/// Whether `line` starts a new structured entry
pub fn has_delimiter(line: &str, delimiter: &str) -> bool {
    !delimiter.is_empty() && line.contains(delimiter)
}

/// How raw lines of a log source are split into columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    pub delimiter: String,
    pub columns: Vec<ColumnConfig>,
}

impl LineFormat {
    pub fn new(delimiter: impl Into<String>, columns: Vec<ColumnConfig>) -> Self {
        Self {
            delimiter: delimiter.into(),
            columns,
        }
    }

    pub fn parse(&self, line: &str) -> Row {
        Row::parse(line, &self.delimiter)
    }

    /// Turn located lines into a page of rows
    pub fn page(&self, located: Located) -> Page {
        let mut rows = Vec::with_capacity(located.lines.len());
        let mut spans = Vec::with_capacity(located.lines.len());

        for line in located.lines {
            rows.push(self.parse(&line.text));
            spans.push(line.start..line.end);
        }

        Page {
            rows,
            spans,
            start: located.start,
            end: located.end,
        }
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    pub fn widths(&self) -> Vec<usize> {
        self.columns.iter().map(|c| c.width).collect()
    }

    /// Position of the column with the given header
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.header == header)
    }
}

/// The rows visible at once, bounded by the page capacity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    rows: Vec<Row>,
    spans: Vec<Range<u64>>,
    start: u64,
    end: u64,
}

impl Page {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Byte range of the row at `index`, terminator included
    pub fn span(&self, index: usize) -> Option<Range<u64>> {
        self.spans.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Offset of the first row
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Offset just past the last row
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Plain row data for display layers
    pub fn to_columns(&self) -> Vec<Vec<String>> {
        self.rows.iter().cloned().map(Row::into_columns).collect()
    }
}
