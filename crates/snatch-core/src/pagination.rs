//! Pagination engine: page counts, the "showing X to Y of Z" range, and the
//! compressed window of page buttons.
//!
//! # Window shape
//!
//! With `DELTA = 2` the window is page 1, then the contiguous run
//! `max(2, current-2) ..= min(last-1, current+2)`, then the last page. An
//! ellipsis goes between page 1 and the run when `current - 2 > 2`, and
//! between the run and the last page when `current + 2 < last - 1`. Page 1 and
//! the last page are never duplicated. With one page or fewer the window is
//! empty.
//!
//! ```text
//! current=7, last=10   →  1 … 5 6 7 8 9 10
//! current=1, last=20   →  1 2 3 … 20
//! current=10, last=20  →  1 … 8 9 10 11 12 … 20
//! ```

use serde::Serialize;

/// Pages shown either side of the current page.
pub const DELTA: u64 = 2;

/// One slot in the page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageEntry {
    Page(u64),
    Ellipsis,
}

/// Ordered page buttons. Recomputed on every render, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PageWindow(Vec<PageEntry>);

impl PageWindow {
    pub fn entries(&self) -> &[PageEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Page numbers only, ellipses skipped.
    pub fn pages(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().filter_map(|e| match e {
            PageEntry::Page(p) => Some(*p),
            PageEntry::Ellipsis => None,
        })
    }
}

impl std::fmt::Display for PageWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match entry {
                PageEntry::Page(p) => write!(f, "{p}")?,
                PageEntry::Ellipsis => f.write_str("…")?,
            }
        }
        Ok(())
    }
}

/// Everything a pagination control needs for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLayout {
    /// The current page, clamped into `1..=total_pages` (1 when there are none).
    pub current: u64,
    pub total_pages: u64,
    pub total_results: u64,
    pub window: PageWindow,
    /// 1-based index of the first record on this page; 0 when there are no results.
    pub range_start: u64,
    /// 1-based index of the last record on this page; 0 when there are no results.
    pub range_end: u64,
}

impl PageLayout {
    /// Whether pagination controls should be drawn at all.
    pub fn has_controls(&self) -> bool {
        !self.window.is_empty()
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    /// The page "Previous" leads to, or `None` at the first page.
    pub fn prev_page(&self) -> Option<u64> {
        self.has_prev().then(|| self.current - 1)
    }

    /// The page "Next" leads to, or `None` at the last page.
    pub fn next_page(&self) -> Option<u64> {
        self.has_next().then(|| self.current + 1)
    }

    /// "Showing X to Y of Z results".
    pub fn range_label(&self) -> String {
        format!("Showing {} to {} of {} results", self.range_start, self.range_end, self.total_results)
    }
}

/// `ceil(total_results / page_size)`; 0 when `page_size` is 0.
pub fn total_pages(total_results: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_results.div_ceil(page_size)
}

/// Compute the layout for `current_page` over `total_results` at `page_size`.
pub fn compute_window(current_page: u64, total_results: u64, page_size: u64) -> PageLayout {
    let total_pages = total_pages(total_results, page_size);
    let current = current_page.clamp(1, total_pages.max(1));

    let (range_start, range_end) = if total_results == 0 || page_size == 0 {
        (0, 0)
    } else {
        let start = (current - 1) * page_size + 1;
        let end = (current * page_size).min(total_results);
        (start, end)
    };

    PageLayout {
        current,
        total_pages,
        total_results,
        window: window(current, total_pages),
        range_start,
        range_end,
    }
}

fn window(current: u64, total_pages: u64) -> PageWindow {
    if total_pages <= 1 {
        return PageWindow::default();
    }

    let lo = current.saturating_sub(DELTA).max(2);
    let hi = (current + DELTA).min(total_pages - 1);

    let mut entries = Vec::with_capacity(2 * DELTA as usize + 5);
    entries.push(PageEntry::Page(1));
    if current.saturating_sub(DELTA) > 2 {
        entries.push(PageEntry::Ellipsis);
    }
    entries.extend((lo..=hi).map(PageEntry::Page));
    if current + DELTA < total_pages - 1 {
        entries.push(PageEntry::Ellipsis);
    }
    entries.push(PageEntry::Page(total_pages));

    PageWindow(entries)
}
