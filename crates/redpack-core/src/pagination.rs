//! Fixed-size pages over a filtered view.

use std::num::NonZeroUsize;

/// Default number of samples per page.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(size) => size,
    None => unreachable!(),
};

/// Highest valid page for `len` entries; 0 for an empty view.
#[must_use]
pub const fn max_page(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get()).saturating_sub(1)
}

/// Number of pages needed for `len` entries; 0 for an empty view.
#[must_use]
pub const fn page_count(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get())
}

/// Slice of `view` shown on `current_page`, and the page actually used.
///
/// A page past the end is clamped down to the last page.
#[must_use]
pub fn page<T>(view: &[T], page_size: NonZeroUsize, current_page: usize) -> (&[T], usize) {
    let clamped = current_page.min(max_page(view.len(), page_size));
    let start = clamped * page_size.get();
    let end = (start + page_size.get()).min(view.len());
    (&view[start.min(end)..end], clamped)
}

/// Current page of a view.
///
/// Invariant: `current_page * page_size < len` whenever the view is not
/// empty, and `current_page == 0` when it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: NonZeroUsize,
    current_page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// A paginator positioned on the first page.
    #[must_use]
    pub const fn new(page_size: NonZeroUsize) -> Self {
        Self {
            page_size,
            current_page: 0,
        }
    }

    /// Entries per page.
    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Current page, zero-based.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Visible slice of `view`.
    #[must_use]
    pub fn window<'a, T>(&self, view: &'a [T]) -> &'a [T] {
        page(view, self.page_size, self.current_page).0
    }

    /// Clamp to the last page of a view of `len` entries.
    /// Returns `true` if the page changed.
    pub fn clamp(&mut self, len: usize) -> bool {
        self.set(self.current_page.min(max_page(len, self.page_size)))
    }

    /// Show the page holding `index`. Returns `true` if the page changed.
    pub fn follow(&mut self, index: usize) -> bool {
        self.set(index / self.page_size.get())
    }

    /// Go to the next page, stopping at the last one.
    pub fn next(&mut self, len: usize) -> bool {
        let last = max_page(len, self.page_size);
        self.set((self.current_page + 1).min(last))
    }

    /// Go to the previous page, stopping at the first one.
    pub fn previous(&mut self) -> bool {
        self.set(self.current_page.saturating_sub(1))
    }

    /// Jump to `page`, clamped to a view of `len` entries.
    pub fn jump(&mut self, page: usize, len: usize) -> bool {
        self.set(page.min(max_page(len, self.page_size)))
    }

    fn set(&mut self, page: usize) -> bool {
        let changed = page != self.current_page;
        self.current_page = page;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_pages_cover_view_exactly() {
        for len in 0..40 {
            for page_size in 1..9 {
                let view: Vec<usize> = (0..len).collect();
                let pages = page_count(len, size(page_size));
                let mut seen = Vec::new();
                for p in 0..pages {
                    let (slice, clamped) = page(&view, size(page_size), p);
                    assert_eq!(clamped, p);
                    assert!(!slice.is_empty() && slice.len() <= page_size);
                    seen.extend_from_slice(slice);
                }
                assert_eq!(seen, view, "len {len} page size {page_size}");
            }
        }
    }

    #[test]
    fn test_last_page_partial() {
        let view: Vec<usize> = (0..7).collect();
        let (slice, clamped) = page(&view, size(3), 2);
        assert_eq!(slice, &[6]);
        assert_eq!(clamped, 2);
    }

    #[test]
    fn test_page_past_end_clamps() {
        let view: Vec<usize> = (0..7).collect();
        let (slice, clamped) = page(&view, size(3), 9);
        assert_eq!(clamped, 2);
        assert_eq!(slice, &[6]);
    }

    #[test]
    fn test_empty_view_is_page_zero() {
        let view: Vec<usize> = Vec::new();
        let (slice, clamped) = page(&view, size(50), 4);
        assert!(slice.is_empty());
        assert_eq!(clamped, 0);
        assert_eq!(max_page(0, size(50)), 0);
    }

    #[test]
    fn test_follow_active_index() {
        let mut paginator = Paginator::new(size(50));
        assert!(paginator.follow(120));
        assert_eq!(paginator.current_page(), 2);
        assert!(!paginator.follow(149));
        assert!(paginator.follow(0));
        assert_eq!(paginator.current_page(), 0);
    }

    #[test]
    fn test_next_previous_stop_at_bounds() {
        let mut paginator = Paginator::new(size(10));
        assert!(!paginator.previous());
        assert!(paginator.next(25));
        assert!(paginator.next(25));
        assert_eq!(paginator.current_page(), 2);
        assert!(!paginator.next(25));
        assert!(paginator.previous());
        assert_eq!(paginator.current_page(), 1);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut paginator = Paginator::new(size(10));
        paginator.jump(4, 100);
        assert_eq!(paginator.current_page(), 4);
        assert!(paginator.clamp(15));
        assert_eq!(paginator.current_page(), 1);
        assert!(paginator.clamp(0));
        assert_eq!(paginator.current_page(), 0);
    }

    #[test]
    fn test_window() {
        let view: Vec<usize> = (0..12).collect();
        let mut paginator = Paginator::new(size(5));
        paginator.jump(2, view.len());
        assert_eq!(paginator.window(&view), &[10, 11]);
    }
}
