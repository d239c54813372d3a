//! Per-file navigation state
//!
//! A [`LogSource`] owns the cursor of one log file: the byte offset just past
//! the last row handed out. Every operation re-opens the file, so rotation and
//! truncation are picked up on the next call; offsets beyond a shrunken file
//! are clamped to its new length.

use crate::continuation;
use crate::error::Result;
use crate::locator::{self, Direction, Located};
use crate::row::{LineFormat, Page, Row};
use crate::search::{self, Matcher, SearchOutcome};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Identifier of a log source within a navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(usize);

impl SourceId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Size and modification time, used to tell whether a file changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileStat {
    pub fn of(file: &File) -> Result<Self> {
        let metadata = file.metadata()?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    pub fn of_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Where the cursor sits relative to the file boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// The current page begins at the first line
    AtStart,
    Middle,
    /// The current page ends at the end of the file
    AtEnd,
}

/// The last tail page together with the file state it was read from
#[derive(Debug, Clone)]
struct TailCache {
    stat: FileStat,
    page: Page,
}

/// Last search result, so repeated searches cycle through matches
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchCursor {
    term: String,
    line: usize,
}

/// One tracked log file
#[derive(Debug)]
pub struct LogSource {
    id: SourceId,
    path: PathBuf,
    name: String,
    format: Arc<LineFormat>,
    offset: u64,
    tail_cache: Option<TailCache>,
    search: Option<SearchCursor>,
    following: bool,
}

impl LogSource {
    pub fn new(
        id: SourceId,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        format: Arc<LineFormat>,
    ) -> Self {
        Self {
            id,
            path: path.into(),
            name: name.into(),
            format,
            offset: 0,
            tail_cache: None,
            search: None,
            following: true,
        }
    }

    pub const fn id(&self) -> SourceId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &LineFormat {
        &self.format
    }

    /// Offset just past the last row handed out
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether the display should keep re-tailing this file
    pub const fn is_following(&self) -> bool {
        self.following
    }

    pub const fn set_following(&mut self, following: bool) {
        self.following = following;
    }

    /// Drop the memoized tail page so the next tail re-reads the file
    pub fn invalidate_tail(&mut self) {
        self.tail_cache = None;
    }

    pub(crate) fn clear_search(&mut self) {
        self.search = None;
    }

    pub(crate) fn tail(&mut self, capacity: usize) -> Result<Page> {
        let (mut file, stat) = self.open()?;

        if let Some(cache) = &self.tail_cache
            && cache.stat == stat
        {
            debug!(source = %self.name, len = stat.len, "file unchanged, reusing tail page");
            self.offset = stat.len;
            return Ok(cache.page.clone());
        }

        let located = locator::locate(&mut file, stat.len, capacity, stat.len, Direction::Backward)?;
        let page = self.commit(located);
        self.tail_cache = Some(TailCache {
            stat,
            page: page.clone(),
        });

        Ok(page)
    }

    pub(crate) fn head(&mut self, capacity: usize) -> Result<Page> {
        let (mut file, stat) = self.open()?;
        let located = locator::locate(&mut file, stat.len, capacity, 0, Direction::Forward)?;
        Ok(self.commit(located))
    }

    pub(crate) fn page_up(&mut self, capacity: usize) -> Result<Page> {
        let (mut file, stat) = self.open()?;
        let end = self.offset.min(stat.len);
        let start = locator::backward_start(&mut file, capacity, end, stat.len)?;
        self.page_ending_at(&mut file, stat.len, capacity, start)
    }

    pub(crate) fn page_down(&mut self, capacity: usize) -> Result<Page> {
        let (mut file, stat) = self.open()?;
        let located =
            locator::locate(&mut file, stat.len, capacity, self.offset, Direction::Forward)?;
        Ok(self.commit(located))
    }

    pub(crate) fn down(&mut self, capacity: usize) -> Result<Page> {
        let (mut file, stat) = self.open()?;
        let end = self.offset.min(stat.len);
        let (next_end, found) = locator::forward_end(&mut file, 1, end, stat.len)?;
        let target = if found == 0 { end } else { next_end };
        self.page_ending_at(&mut file, stat.len, capacity, target)
    }

    pub(crate) fn up(&mut self, capacity: usize) -> Result<Page> {
        let (mut file, stat) = self.open()?;
        let end = self.offset.min(stat.len);
        let start = locator::backward_start(&mut file, capacity, end, stat.len)?;

        let target = if start == 0 {
            end
        } else {
            locator::backward_start(&mut file, 1, end, stat.len)?
        };

        self.page_ending_at(&mut file, stat.len, capacity, target)
    }

    pub(crate) fn refresh(&mut self, capacity: usize) -> Result<Page> {
        let (mut file, stat) = self.open()?;
        let end = self.offset.min(stat.len);
        self.page_ending_at(&mut file, stat.len, capacity, end)
    }

    pub(crate) fn search(
        &mut self,
        matcher: &Matcher,
        term: &str,
        current_line: usize,
        capacity: usize,
    ) -> Result<SearchOutcome> {
        let after = match &self.search {
            Some(cursor) if cursor.term == term && current_line == 0 => cursor.line,
            _ => current_line,
        };

        let (mut file, stat) = self.open()?;
        let hit = search::find_next(BufReader::new((&file).take(stat.len)), matcher, after)?;

        let Some(hit) = hit else {
            debug!(source = %self.name, term, "no match in file");
            self.search = None;
            let end = self.offset.min(stat.len);
            let page = self.page_ending_at(&mut file, stat.len, capacity, end)?;
            return Ok(SearchOutcome::not_found(page));
        };

        let located = locator::locate(&mut file, stat.len, capacity, hit.offset, Direction::Forward)?;
        let highlight = locator::count_lines_between(&mut file, located.start, hit.offset)?;

        debug!(
            source = %self.name,
            term,
            line = hit.line,
            wrapped = hit.wrapped,
            "search hit"
        );

        self.search = Some(SearchCursor {
            term: term.to_string(),
            line: hit.line,
        });

        Ok(SearchOutcome {
            page: self.commit(located),
            highlight: Some(highlight),
            line: Some(hit.line),
            wrapped: hit.wrapped,
        })
    }

    /// Full text behind a row of `page`, continuation lines included
    pub(crate) fn message(&self, page: &Page, row: usize, batch: usize) -> Result<Option<String>> {
        let (Some(entry), Some(span)) = (page.row(row), page.span(row)) else {
            return Ok(None);
        };

        let (mut file, stat) = self.open()?;
        let delimiter = self.format.delimiter.as_str();

        let text = match entry {
            Row::Continuation(_) => {
                continuation::continuation(&mut file, stat.len, span.start, delimiter, batch)?
            }
            Row::Structured(columns) => {
                let line = columns.join(delimiter);
                let trace =
                    continuation::continuation(&mut file, stat.len, span.end, delimiter, batch)?;
                if trace.is_empty() {
                    line
                } else {
                    format!("{line}\n{trace}")
                }
            }
        };

        Ok(Some(text))
    }

    pub(crate) fn progress(&self) -> Result<i32> {
        let stat = FileStat::of_path(&self.path)?;
        Ok(percentage(self.offset, stat.len))
    }

    pub(crate) fn position(&self, capacity: usize) -> Result<Position> {
        let (mut file, stat) = self.open()?;
        let end = self.offset.min(stat.len);

        if end == stat.len {
            return Ok(Position::AtEnd);
        }

        let start = locator::backward_start(&mut file, capacity, end, stat.len)?;
        Ok(if start == 0 {
            Position::AtStart
        } else {
            Position::Middle
        })
    }

    /// Page of `capacity` lines ending at `end`, or the head page when fewer
    /// lines precede it
    fn page_ending_at(
        &mut self,
        file: &mut File,
        file_len: u64,
        capacity: usize,
        end: u64,
    ) -> Result<Page> {
        let mut located = locator::read_backward(file, file_len, capacity, end)?;

        if located.len() < capacity {
            located = locator::read_forward(file, file_len, capacity, 0)?;
        }

        Ok(self.commit(located))
    }

    fn commit(&mut self, located: Located) -> Page {
        self.offset = located.end;
        self.format.page(located)
    }

    fn open(&self) -> Result<(File, FileStat)> {
        let file = File::open(&self.path)?;
        let stat = FileStat::of(&file)?;
        Ok((file, stat))
    }
}

/// `offset` as a whole percentage of `len`; an empty file counts as fully read
pub fn percentage(offset: u64, len: u64) -> i32 {
    if len == 0 {
        return 100;
    }

    let ratio = u128::from(offset.min(len)) * 100 / u128::from(len);
    i32::try_from(ratio).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_for(file: &NamedTempFile) -> LogSource {
        LogSource::new(
            SourceId::new(0),
            file.path(),
            "test",
            Arc::new(LineFormat::new("~", Vec::new())),
        )
    }

    fn first_column(page: &Page) -> Vec<String> {
        page.rows()
            .iter()
            .map(|r| r.columns()[0].to_string())
            .collect()
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(58, 291), 19);
        assert_eq!(percentage(291, 291), 100);
        assert_eq!(percentage(0, 291), 0);
        assert_eq!(percentage(500, 291), 100);
        assert_eq!(percentage(0, 0), 100);
    }

    #[test]
    fn test_tail_reuses_page_until_file_changes() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1~a")?;
        writeln!(file, "2~b")?;
        file.flush()?;

        let mut source = source_for(&file);
        let first = source.tail(5)?;
        assert_eq!(first_column(&first), vec!["1", "2"]);
        assert!(source.tail_cache.is_some());

        // A capacity change alone does not invalidate the memo
        let cached = source.tail(1)?;
        assert_eq!(cached, first);

        writeln!(file, "3~c")?;
        file.flush()?;

        let fresh = source.tail(1)?;
        assert_eq!(first_column(&fresh), vec!["3"]);
        assert_eq!(source.offset(), 12);
        Ok(())
    }

    #[test]
    fn test_explicit_invalidation() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1~a")?;
        writeln!(file, "2~b")?;
        file.flush()?;

        let mut source = source_for(&file);
        source.tail(5)?;
        source.invalidate_tail();

        let page = source.tail(1)?;
        assert_eq!(first_column(&page), vec!["2"]);
        Ok(())
    }

    #[test]
    fn test_offset_is_clamped_after_truncation() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..10 {
            writeln!(file, "{i}~line")?;
        }
        file.flush()?;

        let mut source = source_for(&file);
        source.tail(3)?;
        assert_eq!(source.offset(), 70);

        file.as_file().set_len(0)?;
        let mut rewritten = file.reopen()?;
        writeln!(rewritten, "x~new")?;
        rewritten.flush()?;

        let page = source.refresh(3)?;
        assert_eq!(first_column(&page), vec!["x"]);
        assert_eq!(source.offset(), 6);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error_here() {
        let mut source = LogSource::new(
            SourceId::new(3),
            "/no/such/file.log",
            "missing",
            Arc::new(LineFormat::new("~", Vec::new())),
        );
        assert!(source.head(5).is_err());
        assert!(source.progress().is_err());
    }
}
