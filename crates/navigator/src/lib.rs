//! Paginated navigation over large, append-only log files
//!
//! This crate moves a byte-offset cursor through line-oriented log files
//! without ever loading a whole file. It supports:
//!
//! - Tail, head, page and single-line scrolling with chunked backward and
//!   forward scans
//! - Independent cursors for several files, switched by [`SourceId`]
//! - Case-insensitive search with wraparound
//! - Continuation (stack-trace) lines gathered into a single message
//! - Read progress as a percentage of the file size
//!
//! Rendering is left to the caller: every navigation returns a [`Page`] of
//! [`Row`]s that converts to plain column data.

pub mod config;
pub mod continuation;
pub mod error;
pub mod locator;
pub mod navigator;
pub mod row;
pub mod search;
pub mod source;

pub use config::{ColumnConfig, FileConfig, NavigatorConfig, NavigatorConfigBuilder};
pub use error::{Error, Result};
pub use locator::{Direction, Line, Located};
pub use navigator::Navigator;
pub use row::{LineFormat, Page, Row};
pub use search::{SearchOptions, SearchOutcome};
pub use source::{FileStat, LogSource, Position, SourceId};
