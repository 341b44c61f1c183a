//! Browsing session state.
//!
//! A [`BrowserSession`] is the single owner of everything the presentation
//! layer browses: the active query, the filtered view built from it, the
//! selection, the visible page, the playback volume and the sample being
//! dragged. It reads from a shared [`LibraryStore`] and reports every change
//! as a typed [`LibraryEvent`].
//!
//! Drags hold the sample itself rather than its index, so a view rebuilt
//! mid-drag cannot swap the exported file for a different one.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ExportError, PlaybackError, SelectionError};
use crate::events::{EventSink, LibraryEvent};
use crate::export::{ExportTarget, Exporter};
use crate::input::NavigationCommand;
use crate::library::LibraryStore;
use crate::pagination::{Paginator, page_count};
use crate::playback::{Player, clamp_volume};
use crate::query::Query;
use crate::sample::{CategoryFilter, Sample};
use crate::selection::{Navigator, SelectionState};

/// Explicitly owned browsing state over a library.
#[derive(Debug)]
pub struct BrowserSession {
    store: LibraryStore,
    query: Query,
    view: Vec<Arc<Sample>>,
    navigator: Navigator,
    paginator: Paginator,
    volume: f32,
    dragged: Option<Arc<Sample>>,
    events: EventSink,
}

impl BrowserSession {
    /// Create a session over `store` and build the initial view.
    pub fn new(store: LibraryStore, page_size: NonZeroUsize, events: EventSink) -> Self {
        let mut session = Self {
            store,
            query: Query::default(),
            view: Vec::new(),
            navigator: Navigator::new(),
            paginator: Paginator::new(page_size),
            volume: 1.0,
            dragged: None,
            events,
        };
        session.refresh();
        session
    }

    /// Active query.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Current filtered view.
    #[must_use]
    pub fn view(&self) -> &[Arc<Sample>] {
        &self.view
    }

    /// Samples on the current page.
    #[must_use]
    pub fn visible(&self) -> &[Arc<Sample>] {
        self.paginator.window(&self.view)
    }

    /// Current page, zero-based.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.paginator.current_page()
    }

    /// Samples per page.
    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.paginator.page_size()
    }

    /// View index of the first sample on the current page.
    #[must_use]
    pub const fn page_start(&self) -> usize {
        self.paginator.current_page() * self.paginator.page_size().get()
    }

    /// Number of pages in the current view.
    #[must_use]
    pub fn page_count(&self) -> usize {
        page_count(self.view.len(), self.paginator.page_size())
    }

    /// Selection state.
    #[must_use]
    pub const fn selection(&self) -> SelectionState {
        self.navigator.state()
    }

    /// Active index into the view.
    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.navigator.active()
    }

    /// The active sample.
    #[must_use]
    pub fn active_sample(&self) -> Option<&Arc<Sample>> {
        self.active_index().and_then(|i| self.view.get(i))
    }

    /// Playback volume, always within `0.0..=1.0`.
    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the playback volume, clamping it into range.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    /// Change the category predicate and rebuild the view.
    pub fn set_category(&mut self, category: CategoryFilter) {
        if self.query.category != category {
            self.query.category = category;
            self.refresh();
        }
    }

    /// Change the search text and rebuild the view.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if self.query.search != search {
            self.query.search = search;
            self.refresh();
        }
    }

    /// Replace the whole query and rebuild the view.
    pub fn set_query(&mut self, query: Query) {
        if self.query != query {
            self.query = query;
            self.refresh();
        }
    }

    /// Rebuild the view from the library.
    ///
    /// Call after the library changed. The selection is re-validated and the
    /// page clamped to the new view.
    pub fn refresh(&mut self) {
        self.view = self.store.with_samples(|samples| self.query.apply(samples));
        let len = self.view.len();
        debug!(len, query = ?self.query, "Rebuilt view");

        let page_before = self.paginator.current_page();
        let selection_changed = self.navigator.on_filter_changed(len);
        self.paginator.clamp(len);
        if selection_changed {
            self.events
                .emit(LibraryEvent::SelectionChanged(self.navigator.active()));
            if let Some(index) = self.navigator.active() {
                self.events.emit(LibraryEvent::ScrollTo(index));
                self.paginator.follow(index);
            }
        }
        if self.paginator.current_page() != page_before {
            self.events
                .emit(LibraryEvent::PageChanged(self.paginator.current_page()));
        }
    }

    /// Move the selection up, wrapping at the top.
    pub fn move_up(&mut self) -> Option<usize> {
        let index = self.navigator.move_up()?;
        self.announce(index);
        Some(index)
    }

    /// Move the selection down, wrapping at the bottom.
    pub fn move_down(&mut self) -> Option<usize> {
        let index = self.navigator.move_down()?;
        self.announce(index);
        Some(index)
    }

    /// Select `index` in the view directly.
    pub fn select(&mut self, index: usize) -> Result<(), SelectionError> {
        if let Some(index) = self.navigator.select(index)? {
            self.announce(index);
        }
        Ok(())
    }

    /// Show the next page. No-op on the last page.
    pub fn next_page(&mut self) -> bool {
        let changed = self.paginator.next(self.view.len());
        self.announce_page(changed)
    }

    /// Show the previous page. No-op on the first page.
    pub fn previous_page(&mut self) -> bool {
        let changed = self.paginator.previous();
        self.announce_page(changed)
    }

    /// Jump to `page`, clamped to the last page.
    pub fn jump_to_page(&mut self, page: usize) -> bool {
        let changed = self.paginator.jump(page, self.view.len());
        self.announce_page(changed)
    }

    /// Play the active sample at the session volume.
    ///
    /// Returns `Ok(None)` without calling the player when nothing is
    /// selected.
    pub fn play_active(&self, player: &dyn Player) -> Result<Option<Arc<Sample>>, PlaybackError> {
        let Some(sample) = self.active_sample().cloned() else {
            debug!("Play requested with no selection");
            return Ok(None);
        };
        player.play(sample.file_url(), self.volume)?;
        Ok(Some(sample))
    }

    /// Run a navigation command. Moves happen before the follow-up play.
    pub fn handle(
        &mut self,
        command: NavigationCommand,
        player: &dyn Player,
    ) -> Result<Option<Arc<Sample>>, PlaybackError> {
        match command {
            NavigationCommand::Play => return self.play_active(player),
            NavigationCommand::MoveDown => {
                self.move_down();
            }
            NavigationCommand::MoveUp => {
                self.move_up();
            }
            NavigationCommand::NextPage => {
                self.next_page();
            }
            NavigationCommand::PreviousPage => {
                self.previous_page();
            }
        }
        if command.plays_after() {
            self.play_active(player)
        } else {
            Ok(None)
        }
    }

    /// Start dragging the sample at `index` in the view.
    pub fn begin_drag(&mut self, index: usize) -> Result<Arc<Sample>, SelectionError> {
        let sample = self
            .view
            .get(index)
            .cloned()
            .ok_or(if self.view.is_empty() {
                SelectionError::Empty
            } else {
                SelectionError::OutOfRange {
                    index,
                    len: self.view.len(),
                }
            })?;
        debug!("Dragging {}", sample.file_url().display());
        self.dragged = Some(Arc::clone(&sample));
        Ok(sample)
    }

    /// The sample being dragged.
    #[must_use]
    pub const fn dragged(&self) -> Option<&Arc<Sample>> {
        self.dragged.as_ref()
    }

    /// Whether the entry at `index` of the current view is being dragged.
    #[must_use]
    pub fn is_dragged(&self, index: usize) -> bool {
        match (&self.dragged, self.view.get(index)) {
            (Some(dragged), Some(entry)) => Arc::ptr_eq(dragged, entry),
            _ => false,
        }
    }

    /// Stop dragging.
    pub fn end_drag(&mut self) -> Option<Arc<Sample>> {
        self.dragged.take()
    }

    /// Drop the dragged sample into `destination_dir` and end the drag.
    ///
    /// The drag stays active if the export fails.
    pub fn drop_dragged(
        &mut self,
        exporter: &Exporter,
        destination_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let sample = self.dragged.as_ref().ok_or(ExportError::NothingDragged)?;
        let copied = exporter.export(sample, destination_dir)?;
        self.dragged = None;
        Ok(copied)
    }

    /// Export the active sample to `target`.
    ///
    /// Returns `Ok(None)` when nothing is selected.
    pub fn export_active(
        &self,
        exporter: &Exporter,
        target: &ExportTarget,
    ) -> Result<Option<PathBuf>, ExportError> {
        match self.active_sample() {
            Some(sample) => {
                let copied = exporter.export_to(sample, target)?;
                info!("Exported active sample to {}", copied.display());
                Ok(Some(copied))
            }
            None => Ok(None),
        }
    }

    fn announce(&mut self, index: usize) {
        self.events
            .emit(LibraryEvent::SelectionChanged(Some(index)));
        self.events.emit(LibraryEvent::ScrollTo(index));
        self.follow(index);
    }

    fn follow(&mut self, index: usize) {
        if self.paginator.follow(index) {
            self.events
                .emit(LibraryEvent::PageChanged(self.paginator.current_page()));
        }
    }

    fn announce_page(&self, changed: bool) -> bool {
        if changed {
            self.events
                .emit(LibraryEvent::PageChanged(self.paginator.current_page()));
        }
        changed
    }
}
