use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// One page of an already filtered list. `total` is the size of the whole
/// list, not of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub total: usize,
    pub page_index: usize,
    pub page_size: usize,
}

impl<T> Page<'_, T> {
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index.saturating_add(1) < self.page_count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice `records` into page `page_index` (0-based). An index past the end
/// gives an empty page; a zero page size is a caller bug.
pub fn paginate<T>(records: &[T], page_index: usize, page_size: usize) -> EngineResult<Page<'_, T>> {
    if page_size == 0 {
        return Err(EngineError::InvalidArgument(
            "page size must be positive".into(),
        ));
    }

    let total = records.len();
    let items = match page_index.checked_mul(page_size) {
        Some(start) if start < total => &records[start..start.saturating_add(page_size).min(total)],
        _ => &records[total..],
    };

    Ok(Page {
        items,
        total,
        page_index,
        page_size,
    })
}
