use std::num::NonZeroUsize;
use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Pages shown on each side of the current page.
const WINDOW: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("page {page} is out of range, expected 1..={max_page}")]
    OutOfRange { page: usize, max_page: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Previous,
    Next,
    JumpTo(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageLink {
    Page { number: usize, active: bool },
    Ellipsis,
}

impl PageLink {
    pub fn number(&self) -> Option<usize> {
        match self {
            PageLink::Page { number, .. } => Some(*number),
            PageLink::Ellipsis => None,
        }
    }
}

/// Current-page state for one paginated list. Pages are 1-indexed and
/// `current` always stays within `1..=max_page()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    total_items: usize,
    page_size: NonZeroUsize,
    current: usize,
}

impl Pager {
    pub fn new(total_items: usize, page_size: NonZeroUsize) -> Self {
        Self {
            total_items,
            page_size,
            current: 1,
        }
    }

    /// Starts on `page`, clamped into range.
    pub fn with_page(total_items: usize, page_size: NonZeroUsize, page: usize) -> Self {
        let mut pager = Self::new(total_items, page_size);
        pager.current = page.clamp(1, pager.max_page());
        pager
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Zero items still count as one (empty) page.
    pub fn max_page(&self) -> usize {
        self.total_items.div_ceil(self.page_size.get()).max(1)
    }

    pub fn range(&self) -> Range<usize> {
        let size = self.page_size.get();
        let start = ((self.current - 1) * size).min(self.total_items);
        let end = (self.current * size).min(self.total_items);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.max_page()
    }

    pub fn previous(&mut self) -> usize {
        self.current = self.current.saturating_sub(1).max(1);
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1).min(self.max_page());
        self.current
    }

    pub fn jump_to(&mut self, page: usize) -> Result<usize, NavigationError> {
        let max_page = self.max_page();
        if page == 0 || page > max_page {
            return Err(NavigationError::OutOfRange { page, max_page });
        }
        self.current = page;
        Ok(self.current)
    }

    pub fn apply(&mut self, transition: Transition) -> Result<usize, NavigationError> {
        let before = self.current;
        let after = match transition {
            Transition::Previous => self.previous(),
            Transition::Next => self.next(),
            Transition::JumpTo(page) => self.jump_to(page)?,
        };
        tracing::trace!(?transition, before, after, "page transition");
        Ok(after)
    }

    /// Page links to display: the first and last pages when they fall
    /// outside the window, ellipses for the gaps, and the window of
    /// `WINDOW` pages either side of the current one.
    pub fn page_links(&self) -> Vec<PageLink> {
        let current = self.current as i64;
        let max_page = self.max_page() as i64;
        let window = WINDOW as i64;
        let link = |number: i64| PageLink::Page {
            number: number as usize,
            active: number == current,
        };

        let mut links = Vec::new();
        if current > window + 1 {
            links.push(link(1));
        }
        if current > window + 2 {
            links.push(PageLink::Ellipsis);
        }
        let lo = (current - window).max(1);
        let hi = (current + window).min(max_page);
        links.extend((lo..=hi).map(link));
        if current < max_page - (window + 1) {
            links.push(PageLink::Ellipsis);
        }
        if current < max_page - window {
            links.push(link(max_page));
        }
        links
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(0, default_page_size())
    }
}

pub fn default_page_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN)
}
