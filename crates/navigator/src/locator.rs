//! Chunked line location over seekable byte sources
//!
//! Every function here takes a `Read + Seek` source together with its known
//! length, so the same code drives log files on disk and in-memory cursors in
//! tests. Scanning for line boundaries never holds more than [`CHUNK_SIZE`]
//! bytes; only the lines actually returned are materialized.
//!
//! Offsets handed out by this module always sit on a line boundary: the first
//! byte of a line, or the end of the file.

use memchr::{memchr, memchr_iter, memrchr_iter};
use std::io::{self, Read, Seek, SeekFrom};

/// Size of the scan buffer used when counting newlines
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Which way a page is materialized relative to its anchor offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Lines ending at the anchor (tail, page up, line up)
    Backward,
    /// Lines starting at the anchor (head, page down, line down)
    Forward,
}

/// A single line materialized from the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Normalized text: terminator stripped, empty lines replaced by a space
    pub text: String,
    /// Offset of the first byte of the line
    pub start: u64,
    /// Offset just past the line terminator
    pub end: u64,
}

/// Result of a locate call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    /// The lines, in file order
    pub lines: Vec<Line>,
    /// Offset of the first returned line
    pub start: u64,
    /// Offset just past the last returned line; the new cursor
    pub end: u64,
}

impl Located {
    /// Number of lines located
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no line was located
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Materialize up to `capacity` lines around `anchor`.
///
/// A forward locate that runs into the end of the file from a non-zero anchor
/// falls back to the tail page, so the last page is full whenever the file
/// holds at least `capacity` lines.
pub fn locate<R: Read + Seek>(
    reader: &mut R,
    file_len: u64,
    capacity: usize,
    anchor: u64,
    direction: Direction,
) -> io::Result<Located> {
    let anchor = anchor.min(file_len);

    match direction {
        Direction::Backward => read_backward(reader, file_len, capacity, anchor),
        Direction::Forward => {
            let located = read_forward(reader, file_len, capacity, anchor)?;
            if located.len() < capacity && anchor > 0 {
                return read_backward(reader, file_len, capacity, file_len);
            }
            Ok(located)
        }
    }
}

/// Read up to `count` lines ending at `end`, without any fallback
pub fn read_backward<R: Read + Seek>(
    reader: &mut R,
    file_len: u64,
    count: usize,
    end: u64,
) -> io::Result<Located> {
    let end = end.min(file_len);
    let start = backward_start(reader, count, end, file_len)?;
    let lines = read_lines(reader, start, end)?;

    Ok(Located { lines, start, end })
}

/// Read up to `count` lines starting at `start`, without any fallback
pub fn read_forward<R: Read + Seek>(
    reader: &mut R,
    file_len: u64,
    count: usize,
    start: u64,
) -> io::Result<Located> {
    let start = start.min(file_len);
    let (end, _) = forward_end(reader, count, start, file_len)?;
    let lines = read_lines(reader, start, end)?;

    Ok(Located { lines, start, end })
}

/// Byte window of at most `chunk` bytes ending at `cursor`.
///
/// Near the start of the file the window shrinks instead of reaching below 0.
#[allow(clippy::cast_possible_truncation)]
pub const fn chunk_window(cursor: u64, chunk: u64) -> (u64, usize) {
    let start = cursor.saturating_sub(chunk);
    (start, (cursor - start) as usize)
}

/// Offset where the `desired` lines ending at `end` begin.
///
/// Returns 0 when fewer than `desired` lines precede `end`, and `end` itself
/// when nothing is desired.
pub fn backward_start<R: Read + Seek>(
    reader: &mut R,
    desired: usize,
    end: u64,
    file_len: u64,
) -> io::Result<u64> {
    scan_backward(reader, desired, end.min(file_len), CHUNK_SIZE)
}

/// Offset just past the `desired` lines starting at `start`, and how many
/// lines were actually found before the end of the file.
pub fn forward_end<R: Read + Seek>(
    reader: &mut R,
    desired: usize,
    start: u64,
    file_len: u64,
) -> io::Result<(u64, usize)> {
    scan_forward(reader, desired, start.min(file_len), file_len, CHUNK_SIZE)
}

/// Number of line starts in `[from, to)` when `from` is a line boundary
pub fn count_lines_between<R: Read + Seek>(
    reader: &mut R,
    from: u64,
    to: u64,
) -> io::Result<usize> {
    let mut buf = vec![0; CHUNK_SIZE];
    let mut cursor = from;
    let mut count = 0;

    while cursor < to {
        let len = chunk_len(to - cursor, CHUNK_SIZE);
        read_at(reader, cursor, &mut buf[..len])?;
        count += memchr_iter(b'\n', &buf[..len]).count();
        cursor += len as u64;
    }

    Ok(count)
}

/// Read and split the bytes in `[start, end)` into lines
pub fn read_lines<R: Read + Seek>(reader: &mut R, start: u64, end: u64) -> io::Result<Vec<Line>> {
    if end <= start {
        return Ok(Vec::new());
    }

    let len = usize::try_from(end - start)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "page too large"))?;
    let mut bytes = vec![0; len];
    read_at(reader, start, &mut bytes)?;

    Ok(split_lines(&bytes, start))
}

/// Split raw bytes into normalized lines; `base` is the offset of `bytes[0]`
pub fn split_lines(bytes: &[u8], base: u64) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line_start = 0;

    while line_start < bytes.len() {
        let line_end = memchr(b'\n', &bytes[line_start..])
            .map_or(bytes.len(), |i| line_start + i + 1);

        lines.push(Line {
            text: normalize(&bytes[line_start..line_end]),
            start: base + line_start as u64,
            end: base + line_end as u64,
        });

        line_start = line_end;
    }

    lines
}

fn normalize(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    // A bare terminator must still occupy a row
    if raw.is_empty() {
        return " ".to_string();
    }

    String::from_utf8_lossy(raw).into_owned()
}

fn scan_backward<R: Read + Seek>(
    reader: &mut R,
    desired: usize,
    end: u64,
    chunk: usize,
) -> io::Result<u64> {
    if desired == 0 || end == 0 {
        return Ok(end);
    }

    let mut buf = vec![0; chunk];
    let mut cursor = end;
    let mut seen = 0;

    while cursor > 0 {
        let (start, len) = chunk_window(cursor, chunk as u64);
        read_at(reader, start, &mut buf[..len])?;

        for i in memrchr_iter(b'\n', &buf[..len]) {
            let pos = start + i as u64;

            // The terminator of the last line before `end` opens no new line
            if pos + 1 == end {
                continue;
            }

            seen += 1;
            if seen == desired {
                return Ok(pos + 1);
            }
        }

        cursor = start;
    }

    Ok(0)
}

fn scan_forward<R: Read + Seek>(
    reader: &mut R,
    desired: usize,
    start: u64,
    file_len: u64,
    chunk: usize,
) -> io::Result<(u64, usize)> {
    if desired == 0 {
        return Ok((start, 0));
    }

    let mut buf = vec![0; chunk];
    let mut cursor = start;
    let mut seen = 0;
    let mut last_byte = None;

    while cursor < file_len {
        let len = chunk_len(file_len - cursor, chunk);
        read_at(reader, cursor, &mut buf[..len])?;

        for i in memchr_iter(b'\n', &buf[..len]) {
            seen += 1;
            if seen == desired {
                return Ok((cursor + i as u64 + 1, seen));
            }
        }

        last_byte = buf[..len].last().copied();
        cursor += len as u64;
    }

    // An unterminated final line still counts
    if last_byte.is_some_and(|b| b != b'\n') {
        seen += 1;
    }

    Ok((file_len, seen))
}

fn chunk_len(remaining: u64, chunk: usize) -> usize {
    usize::try_from(remaining).map_or(chunk, |remaining| remaining.min(chunk))
}

fn read_at<R: Read + Seek>(reader: &mut R, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(buf)
}
