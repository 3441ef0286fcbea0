//! FILENAME: core/cube-engine/src/pagination.rs
//! Pagination Window - the visible slice of a filtered subset.
//!
//! The requested page is self-correcting: when a predicate change shrinks the
//! subset below the page the user was looking at, the window falls back to
//! page 1 instead of showing an empty table.

use std::ops::Range;

use serde::Serialize;

/// One page of a subset plus the paging state needed to render controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow<T> {
    pub page_data: Vec<T>,
    /// 1-based page actually shown.
    pub effective_page: usize,
    /// Always at least 1.
    pub page_count: usize,
    pub page_size: usize,
    /// Length of the whole subset.
    pub total_records: usize,
}

impl<T> PageWindow<T> {
    /// Converts the page items, keeping the paging state.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageWindow<U> {
        PageWindow {
            page_data: self.page_data.into_iter().map(f).collect(),
            effective_page: self.effective_page,
            page_count: self.page_count,
            page_size: self.page_size,
            total_records: self.total_records,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.effective_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.effective_page < self.page_count
    }
}

/// `max(1, ceil(len / page_size))`. A zero page size is treated as 1.
pub fn page_count(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// The requested page if it is in `1..=page_count`, otherwise 1.
pub fn effective_page(requested: usize, page_count: usize) -> usize {
    if (1..=page_count).contains(&requested) {
        requested
    } else {
        1
    }
}

/// Index range of `page` within a subset of `len` items, clipped to `len`.
pub fn page_range(len: usize, page_size: usize, page: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Page to move to from `current` when stepping back.
pub fn previous_page(current: usize) -> usize {
    current.saturating_sub(1).max(1)
}

/// Page to move to from `current` when stepping forward.
pub fn next_page(current: usize, page_count: usize) -> usize {
    current.saturating_add(1).min(page_count.max(1))
}

/// Cuts the window for `requested_page` out of `subset`.
pub fn paginate<T: Clone>(subset: &[T], page_size: usize, requested_page: usize) -> PageWindow<T> {
    let page_size = page_size.max(1);
    let page_count = page_count(subset.len(), page_size);
    let effective_page = effective_page(requested_page, page_count);
    let range = page_range(subset.len(), page_size, effective_page);

    PageWindow {
        page_data: subset[range].to_vec(),
        effective_page,
        page_count,
        page_size,
        total_records: subset.len(),
    }
}
