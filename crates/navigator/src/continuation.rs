//! Continuation (stack-trace) reading
//!
//! Lines without the column delimiter belong to the structured entry above
//! them. This module gathers such a block so it can be shown whole instead of
//! as a garbled column split.

use crate::locator;
use crate::row::has_delimiter;
use std::io::{self, Read, Seek};

/// Upper bound on lines gathered for a single block
pub const MAX_CONTINUATION_LINES: usize = 100;

/// Gather lines from `start` until one contains `delimiter`, the end of the
/// file, or [`MAX_CONTINUATION_LINES`], reading `batch` lines at a time.
///
/// Returns the gathered lines joined by `\n`; empty when the line at `start`
/// already starts a structured entry.
pub fn continuation<R: Read + Seek>(
    reader: &mut R,
    file_len: u64,
    start: u64,
    delimiter: &str,
    batch: usize,
) -> io::Result<String> {
    let batch = batch.max(1);
    let mut lines = Vec::new();
    let mut cursor = start.min(file_len);

    'batches: while lines.len() < MAX_CONTINUATION_LINES {
        let located = locator::read_forward(reader, file_len, batch, cursor)?;
        if located.is_empty() {
            break;
        }

        for line in located.lines {
            if has_delimiter(&line.text, delimiter) || lines.len() == MAX_CONTINUATION_LINES {
                break 'batches;
            }
            lines.push(line.text);
        }

        cursor = located.end;
    }

    Ok(lines.join("\n"))
}
