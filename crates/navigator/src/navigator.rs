//! Multi-file navigation front end
//!
//! A [`Navigator`] holds one [`LogSource`] per configured file and routes every
//! call to the active one. Navigation never fails: an unreadable file yields an
//! empty page and a warning in the log.

use crate::config::NavigatorConfig;
use crate::error::{Error, Result};
use crate::row::{LineFormat, Page, Row};
use crate::search::{Matcher, SearchOptions, SearchOutcome};
use crate::source::{LogSource, Position, SourceId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Paginated, multi-file log navigator
#[derive(Debug)]
pub struct Navigator {
    sources: Vec<LogSource>,
    active: SourceId,
    capacity: usize,
    format: Arc<LineFormat>,
    severity_column: Option<usize>,
}

impl Navigator {
    /// Create a navigator for every file in `config`
    pub fn new(config: NavigatorConfig) -> Result<Self> {
        config.validate()?;

        let format = Arc::new(config.line_format());
        let sources: Vec<_> = config
            .files
            .iter()
            .enumerate()
            .map(|(index, file)| {
                LogSource::new(
                    SourceId::new(index),
                    file.path.clone(),
                    file.display_name(),
                    Arc::clone(&format),
                )
            })
            .collect();

        let severity_column = config
            .severity_column
            .as_deref()
            .and_then(|header| format.column_index(header));

        info!(
            sources = sources.len(),
            capacity = config.initial_capacity,
            "log navigator ready"
        );

        Ok(Self {
            sources,
            active: SourceId::new(0),
            capacity: config.initial_capacity,
            format,
            severity_column,
        })
    }

    pub fn sources(&self) -> &[LogSource] {
        &self.sources
    }

    pub fn active(&self) -> &LogSource {
        &self.sources[self.active.index()]
    }

    pub const fn active_id(&self) -> SourceId {
        self.active
    }

    /// Make another source active; its cursor is kept from the last visit
    pub fn select(&mut self, id: SourceId) -> Result<&LogSource> {
        if id.index() >= self.sources.len() {
            return Err(Error::UnknownSource {
                index: id.index(),
                total: self.sources.len(),
            });
        }

        debug!(from = %self.active, to = %id, "switching log source");
        self.active = id;
        Ok(self.active())
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Set the rows per page, applied on the next call
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    pub fn headers(&self) -> Vec<&str> {
        self.format.headers()
    }

    pub fn column_widths(&self) -> Vec<usize> {
        self.format.widths()
    }

    /// Severity value of a structured row, if a severity column is configured
    pub fn severity<'a>(&self, row: &'a Row) -> Option<&'a str> {
        self.severity_column.and_then(|index| row.column(index))
    }

    /// Cursor of the active source
    pub fn offset(&self) -> u64 {
        self.active().offset()
    }

    pub fn is_following(&self) -> bool {
        self.active().is_following()
    }

    pub fn set_following(&mut self, following: bool) {
        self.active_mut().set_following(following);
    }

    pub fn invalidate_tail(&mut self) {
        self.active_mut().invalidate_tail();
    }

    /// Re-tail the active source if it is being followed
    pub fn tick(&mut self) -> Option<Page> {
        self.is_following().then(|| self.tail())
    }

    /// Last `capacity` lines of the file
    pub fn tail(&mut self) -> Page {
        let capacity = self.capacity;
        let source = self.active_mut();
        source.clear_search();
        source.set_following(true);
        let result = source.tail(capacity);
        self.settle("tail", result)
    }

    /// First `capacity` lines of the file
    pub fn head(&mut self) -> Page {
        let capacity = self.capacity;
        let source = self.active_mut();
        source.clear_search();
        source.set_following(false);
        let result = source.head(capacity);
        self.settle("head", result)
    }

    pub fn page_up(&mut self) -> Page {
        let capacity = self.capacity;
        let source = self.active_mut();
        source.clear_search();
        source.set_following(false);
        let result = source.page_up(capacity);
        self.settle("page_up", result)
    }

    pub fn page_down(&mut self) -> Page {
        let capacity = self.capacity;
        let source = self.active_mut();
        source.clear_search();
        source.set_following(false);
        let result = source.page_down(capacity);
        self.settle("page_down", result)
    }

    /// Scroll one line towards the start of the file
    pub fn up(&mut self) -> Page {
        let capacity = self.capacity;
        let source = self.active_mut();
        source.clear_search();
        source.set_following(false);
        let result = source.up(capacity);
        self.settle("up", result)
    }

    /// Scroll one line towards the end of the file
    pub fn down(&mut self) -> Page {
        let capacity = self.capacity;
        let source = self.active_mut();
        source.clear_search();
        let result = source.down(capacity);
        self.settle("down", result)
    }

    /// Recompute the page ending at the current cursor
    pub fn refresh(&mut self) -> Page {
        let capacity = self.capacity;
        let result = self.active_mut().refresh(capacity);
        self.settle("refresh", result)
    }

    /// Case-insensitive search for `term`, starting after line
    /// `current_line` (1-based, 0 for none) and wrapping at the end of the
    /// file. Repeating a term with `current_line` 0 continues from its
    /// previous match.
    pub fn search(&mut self, term: &str, current_line: usize) -> SearchOutcome {
        match self.search_with(term, current_line, &SearchOptions::default()) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "search failed");
                SearchOutcome::not_found(Page::default())
            }
        }
    }

    /// Search with explicit options; only an invalid regex is an error
    pub fn search_with(
        &mut self,
        term: &str,
        current_line: usize,
        options: &SearchOptions,
    ) -> Result<SearchOutcome> {
        if term.is_empty() {
            return Ok(SearchOutcome::not_found(self.refresh()));
        }

        let matcher = Matcher::new(term, options)?;
        let capacity = self.capacity;
        let source = self.active_mut();
        source.set_following(false);

        let outcome = source
            .search(&matcher, term, current_line, capacity)
            .unwrap_or_else(|e| {
                warn!(source = %source.name(), error = %e, "search failed, returning empty page");
                SearchOutcome::not_found(Page::default())
            });

        Ok(outcome)
    }

    /// Full text behind row `row` of `page`, with any continuation lines.
    ///
    /// `page` must come from the active source.
    pub fn message(&self, page: &Page, row: usize) -> Option<String> {
        let source = self.active();
        source
            .message(page, row, self.capacity)
            .unwrap_or_else(|e| {
                warn!(source = %source.name(), row, error = %e, "failed to read message");
                None
            })
    }

    /// Read progress of the active source as a percentage, or -1 when the
    /// file cannot be stat'ed
    pub fn progress(&self) -> i32 {
        self.active().progress().unwrap_or_else(|e| {
            debug!(source = %self.active().name(), error = %e, "cannot stat log file");
            -1
        })
    }

    /// Cursor position of the active source, `None` when unreadable
    pub fn position(&self) -> Option<Position> {
        self.active().position(self.capacity).ok()
    }

    fn active_mut(&mut self) -> &mut LogSource {
        &mut self.sources[self.active.index()]
    }

    fn settle(&self, operation: &'static str, result: Result<Page>) -> Page {
        match result {
            Ok(page) => {
                debug!(
                    source = %self.active().name(),
                    operation,
                    rows = page.len(),
                    offset = self.active().offset(),
                    "navigated"
                );
                page
            }
            Err(e) => {
                warn!(
                    source = %self.active().name(),
                    path = %self.active().path().display(),
                    operation,
                    error = %e,
                    "navigation failed, returning empty page"
                );
                Page::default()
            }
        }
    }
}
