//! Selection and keyboard navigation over a filtered view.
//!
//! [`Navigator`] tracks the active index as a position in the current view.
//! Transitions return the new index when it moved so the caller can ask the
//! presentation layer to scroll to it.

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// Whether something is selected, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionState {
    /// The view is empty or nothing was selected yet.
    #[default]
    NoSelection,
    /// Index into the current view.
    Selected(usize),
}

impl SelectionState {
    /// The selected index, if any.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::NoSelection => None,
            Self::Selected(index) => Some(index),
        }
    }
}

/// Selection state machine bound to the length of the current view.
///
/// Invariant: `Selected(i)` implies `i < len`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    state: SelectionState,
    len: usize,
}

impl Navigator {
    /// A navigator over an empty view.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SelectionState::NoSelection,
            len: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SelectionState {
        self.state
    }

    /// The active index, if any.
    #[must_use]
    pub const fn active(&self) -> Option<usize> {
        self.state.index()
    }

    /// Length of the view the navigator is bound to.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the bound view is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Re-validate after the view was rebuilt with `len` entries.
    ///
    /// An index that is still in range is kept; an index past the end falls
    /// back to the first entry; an empty view clears the selection. Returns
    /// `true` if the state changed.
    pub fn on_filter_changed(&mut self, len: usize) -> bool {
        self.len = len;
        let next = match self.state {
            _ if len == 0 => SelectionState::NoSelection,
            SelectionState::Selected(index) if index < len => SelectionState::Selected(index),
            SelectionState::Selected(_) | SelectionState::NoSelection => {
                SelectionState::Selected(0)
            }
        };
        let changed = next != self.state;
        self.state = next;
        changed
    }

    /// Move one entry up, wrapping from the first to the last.
    ///
    /// No-op without a selection or with fewer than two entries.
    pub fn move_up(&mut self) -> Option<usize> {
        let index = self.movable_index()?;
        let next = if index == 0 { self.len - 1 } else { index - 1 };
        self.state = SelectionState::Selected(next);
        Some(next)
    }

    /// Move one entry down, wrapping from the last to the first.
    ///
    /// No-op without a selection or with fewer than two entries.
    pub fn move_down(&mut self) -> Option<usize> {
        let index = self.movable_index()?;
        let next = if index + 1 == self.len { 0 } else { index + 1 };
        self.state = SelectionState::Selected(next);
        Some(next)
    }

    /// Select `index` directly, e.g. after a click.
    ///
    /// Returns the index if the selection moved, `None` if it was already
    /// selected.
    pub fn select(&mut self, index: usize) -> Result<Option<usize>, SelectionError> {
        if self.len == 0 {
            return Err(SelectionError::Empty);
        }
        if index >= self.len {
            return Err(SelectionError::OutOfRange {
                index,
                len: self.len,
            });
        }
        let next = SelectionState::Selected(index);
        if next == self.state {
            return Ok(None);
        }
        self.state = next;
        Ok(Some(index))
    }

    fn movable_index(&self) -> Option<usize> {
        match self.state {
            SelectionState::Selected(index) if self.len > 1 => Some(index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(len: usize, index: usize) -> Navigator {
        let mut nav = Navigator::new();
        nav.on_filter_changed(len);
        nav.select(index).unwrap();
        nav
    }

    #[test]
    fn test_starts_without_selection() {
        let nav = Navigator::new();
        assert_eq!(nav.state(), SelectionState::NoSelection);
        assert!(nav.is_empty());
    }

    #[test]
    fn test_first_non_empty_view_selects_first() {
        let mut nav = Navigator::new();
        assert!(nav.on_filter_changed(4));
        assert_eq!(nav.active(), Some(0));
    }

    #[test]
    fn test_filter_keeps_valid_index() {
        let mut nav = at(10, 3);
        assert!(!nav.on_filter_changed(5));
        assert_eq!(nav.active(), Some(3));
    }

    #[test]
    fn test_filter_shrink_past_index_resets_to_first() {
        let mut nav = at(10, 7);
        assert!(nav.on_filter_changed(7));
        assert_eq!(nav.active(), Some(0));
    }

    #[test]
    fn test_filter_to_empty_clears() {
        let mut nav = at(10, 2);
        assert!(nav.on_filter_changed(0));
        assert_eq!(nav.state(), SelectionState::NoSelection);
    }

    #[test]
    fn test_move_down_wraps() {
        let mut nav = at(3, 1);
        assert_eq!(nav.move_down(), Some(2));
        assert_eq!(nav.move_down(), Some(0));
    }

    #[test]
    fn test_move_up_wraps() {
        let mut nav = at(3, 1);
        assert_eq!(nav.move_up(), Some(0));
        assert_eq!(nav.move_up(), Some(2));
    }

    #[test]
    fn test_single_entry_moves_are_noops() {
        let mut nav = at(1, 0);
        assert_eq!(nav.move_up(), None);
        assert_eq!(nav.move_down(), None);
        assert_eq!(nav.active(), Some(0));
    }

    #[test]
    fn test_moves_without_selection_are_noops() {
        let mut nav = Navigator::new();
        assert_eq!(nav.move_down(), None);
        assert_eq!(nav.move_up(), None);
        assert_eq!(nav.state(), SelectionState::NoSelection);
    }

    #[test]
    fn test_select_bounds() {
        let mut nav = at(3, 0);
        assert_eq!(nav.select(2), Ok(Some(2)));
        assert_eq!(nav.select(2), Ok(None));
        assert_eq!(
            nav.select(3),
            Err(SelectionError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(nav.active(), Some(2));

        let mut empty = Navigator::new();
        assert_eq!(empty.select(0), Err(SelectionError::Empty));
    }

    #[test]
    fn test_index_always_in_range() {
        let mut nav = at(8, 5);
        for len in [8, 6, 3, 9, 1, 0, 2] {
            nav.on_filter_changed(len);
            nav.move_down();
            nav.move_up();
            match nav.active() {
                Some(index) => assert!(index < len),
                None => assert_eq!(len, 0),
            }
        }
    }
}
