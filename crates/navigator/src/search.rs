//! Wrapping term search over log files

use crate::error::Result;
use crate::row::Page;
use regex::{Regex, RegexBuilder};
use std::io::{self, BufRead};

/// Search options
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Case sensitive search
    pub case_sensitive: bool,
    /// Use regex instead of plain text search
    pub use_regex: bool,
}

/// A compiled search term
#[derive(Debug, Clone)]
pub enum Matcher {
    Plain { needle: String, case_sensitive: bool },
    Regex(Regex),
}

impl Matcher {
    pub fn new(term: &str, options: &SearchOptions) -> Result<Self> {
        if options.use_regex {
            let regex = RegexBuilder::new(term)
                .case_insensitive(!options.case_sensitive)
                .build()?;
            return Ok(Self::Regex(regex));
        }

        let needle = if options.case_sensitive {
            term.to_string()
        } else {
            term.to_lowercase()
        };

        Ok(Self::Plain {
            needle,
            case_sensitive: options.case_sensitive,
        })
    }

    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Plain {
                needle,
                case_sensitive: true,
            } => line.contains(needle.as_str()),
            Self::Plain { needle, .. } => line.to_lowercase().contains(needle.as_str()),
            Self::Regex(regex) => regex.is_match(line),
        }
    }
}

/// A matching line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    /// Line number (1-based)
    pub line: usize,
    /// Offset of the first byte of the line
    pub offset: u64,
    /// Whether the scan wrapped past the end of the file to find it
    pub wrapped: bool,
}

/// Find the first match after line `after_line`, wrapping to the start of
/// the file when nothing matches below it.
///
/// `reader` must be positioned at the start of the file. Line numbers are
/// 1-based, so an `after_line` of 0 scans the whole file from the top.
pub fn find_next<R: BufRead>(
    mut reader: R,
    matcher: &Matcher,
    after_line: usize,
) -> io::Result<Option<SearchHit>> {
    let mut buf = Vec::new();
    let mut line_number = 0;
    let mut offset = 0u64;
    let mut first_hit = None;

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }

        line_number += 1;
        let line_offset = offset;
        offset += read as u64;

        // Above the current result only the first match matters
        if line_number <= after_line && first_hit.is_some() {
            continue;
        }

        let text = String::from_utf8_lossy(&buf);
        let text = text.trim_end_matches(['\n', '\r']);
        if !matcher.is_match(text) {
            continue;
        }

        let hit = SearchHit {
            line: line_number,
            offset: line_offset,
            wrapped: line_number <= after_line,
        };

        if !hit.wrapped {
            return Ok(Some(hit));
        }
        first_hit = Some(hit);
    }

    Ok(first_hit)
}

/// What a search produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// The page to display
    pub page: Page,
    /// Row of the match within `page`
    pub highlight: Option<usize>,
    /// Line number of the match (1-based)
    pub line: Option<usize>,
    /// Whether the search wrapped to the start of the file
    pub wrapped: bool,
}

impl SearchOutcome {
    /// Outcome for a term that matches nowhere in the file
    pub fn not_found(page: Page) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub const fn found(&self) -> bool {
        self.highlight.is_some()
    }
}
