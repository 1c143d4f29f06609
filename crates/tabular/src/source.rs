//! Draining a paginated record source
//!
//! A [`PageSource`] answers one query per call. [`drain`] walks the cursor
//! chain sequentially until the source reports no more pages, bounded by a
//! page-count ceiling and a wall-clock ceiling.

use crate::error::{Error, Result};
use crate::record::{PropertyBag, flatten};
use crate::table::Table;
use diagnostics::*;
use std::time::{Duration, Instant};

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPage {
    pub records: Vec<PropertyBag>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// External collaborator returning records a page at a time
pub trait PageSource {
    /// Fetch the page starting at `cursor`, or the first page for `None`.
    fn query(&mut self, cursor: Option<&str>) -> Result<RecordPage>;
}

impl<S: PageSource + ?Sized> PageSource for &mut S {
    fn query(&mut self, cursor: Option<&str>) -> Result<RecordPage> {
        (**self).query(cursor)
    }
}

/// Ceilings for one full drain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub max_pages: usize,
    pub timeout: Duration,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Fetch every page and return all records in source order.
///
/// Terminates when a page says `has_more = false` (any cursor it still
/// carries is stale and ignored) or when `has_more = true` arrives without a
/// cursor to continue from.
pub fn drain<S: PageSource>(mut source: S, limits: PageLimits) -> Result<Vec<PropertyBag>> {
    let started = Instant::now();
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if pages >= limits.max_pages {
            warn!("Page source exceeded {max_pages} pages", max_pages: limits.max_pages);
            return Err(Error::SourceExhausted { pages });
        }
        let elapsed = started.elapsed();
        if pages > 0 && elapsed > limits.timeout {
            warn!("Page source timed out after {pages} pages", pages: pages);
            return Err(Error::Timeout { elapsed });
        }

        let page = source.query(cursor.as_deref())?;
        pages += 1;
        debug!(
            "Fetched page {pages} with {fetched} records",
            pages: pages,
            fetched: page.records.len()
        );
        records.extend(page.records);

        if !page.has_more {
            break;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                warn!("Page source reported more pages without a cursor; stopping");
                break;
            }
        }
    }

    info!("Drained {total} records from {pages} pages", total: records.len(), pages: pages);
    Ok(records)
}

/// Drain `source` and flatten the records into a table.
pub fn fetch_table<S: PageSource>(source: S, limits: PageLimits) -> Result<Table> {
    let records = drain(source, limits)?;
    Ok(flatten(&records))
}
