//! Command handlers for the `redpack` binary.
//!
//! [`AppState`] wires the engine together once per run: a library rebuilt
//! from the configured folders, the ingestor feeding it, the browsing session
//! over it and the exporter. Handlers print to any [`Write`] so they can be
//! driven from tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use redpack_core::{
    AppConfig, BrowserSession, CategoryFilter, Error, EventSink, ExportError, ExportTarget,
    Exporter, FileSystem, IngestReport, Ingestor, LibraryEvent, LibraryStore, PlaybackError,
    Query, RealFileSystem, SelectionError,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Errors surfaced to the user by the binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Engine failure.
    #[error(transparent)]
    Core(#[from] Error),

    /// Export failure.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Playback failure.
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Selection failure.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// A background ingestion task panicked or was cancelled.
    #[error("Background import failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Terminal IO failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No folder to import was given or configured.
    #[error("No sample folders given and none configured in {0}")]
    NoRoots(String),
}

/// Result type for command handlers.
pub type CliResult<T> = std::result::Result<T, CliError>;

/// Totals over every folder imported in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Samples added.
    pub added: usize,
    /// Duplicates skipped.
    pub duplicates: usize,
    /// Skipped subtrees plus roots that failed outright.
    pub skipped: usize,
}

impl ImportSummary {
    fn absorb(&mut self, report: &IngestReport) {
        self.added += report.added;
        self.duplicates += report.duplicates;
        self.skipped += report.errors.len();
    }
}

/// How one background import run ended.
#[derive(Debug)]
pub enum ImportOutcome {
    /// The run completed; `report` lists what it could not read.
    Finished {
        /// Folder that was imported.
        root: PathBuf,
        /// What the run added and skipped.
        report: IngestReport,
    },
    /// The run could not import `root` at all.
    Failed {
        /// Folder that was requested.
        root: PathBuf,
        /// Why it failed.
        error: CliError,
    },
}

impl ImportOutcome {
    fn from_run(
        root: PathBuf,
        run: std::result::Result<redpack_core::Result<IngestReport>, tokio::task::JoinError>,
    ) -> Self {
        match run {
            Ok(Ok(report)) => Self::Finished { root, report },
            Ok(Err(err)) => {
                warn!("{}", err);
                Self::Failed {
                    root,
                    error: err.into(),
                }
            }
            Err(err) => {
                warn!("Import of {} did not complete: {}", root.display(), err);
                Self::Failed {
                    root,
                    error: err.into(),
                }
            }
        }
    }
}

/// Something the browse loop has to react to.
#[derive(Debug)]
pub enum Notice {
    /// The engine published an event.
    Event(LibraryEvent),
    /// A background import finished.
    Import(ImportOutcome),
}

/// Everything one invocation works on.
pub struct AppState {
    config: AppConfig,
    ingestor: Ingestor,
    exporter: Exporter,
    session: BrowserSession,
    events: UnboundedReceiver<LibraryEvent>,
    outcomes_tx: UnboundedSender<ImportOutcome>,
    outcomes: UnboundedReceiver<ImportOutcome>,
}

impl AppState {
    /// Build the engine on the real file system.
    pub fn new(config: AppConfig) -> Self {
        Self::with_file_system(config, Arc::new(RealFileSystem))
    }

    /// Build the engine on `fs`.
    pub fn with_file_system(config: AppConfig, fs: Arc<dyn FileSystem>) -> Self {
        let store = LibraryStore::new();
        let (events, rx) = EventSink::channel();
        let ingestor = Ingestor::new(Arc::clone(&fs), store.clone(), events.clone())
            .with_options(config.ingest_options());
        let mut session = BrowserSession::new(store, config.page_size(), events);
        session.set_volume(config.volume);

        let (outcomes_tx, outcomes) = mpsc::unbounded_channel();

        Self {
            ingestor,
            exporter: Exporter::new(fs),
            session,
            events: rx,
            outcomes_tx,
            outcomes,
            config,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Browsing session.
    pub const fn session(&self) -> &BrowserSession {
        &self.session
    }

    /// Browsing session, mutably.
    pub const fn session_mut(&mut self) -> &mut BrowserSession {
        &mut self.session
    }

    /// Exporter over the same file system as the ingestor.
    pub const fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Folders to import: `roots` if given, the configured ones otherwise.
    pub fn import_roots(&self, roots: &[PathBuf]) -> Vec<PathBuf> {
        if roots.is_empty() {
            self.config.library_roots.clone()
        } else {
            roots.to_vec()
        }
    }

    /// Import `roots` (and the built-in kit if asked) and wait for all runs.
    ///
    /// A root that cannot be read is logged and counted as skipped; the
    /// other roots are still imported.
    pub async fn import(&mut self, roots: &[PathBuf], with_kit: bool) -> CliResult<ImportSummary> {
        let roots = self.import_roots(roots);
        if roots.is_empty() && !with_kit {
            return Err(CliError::NoRoots(
                redpack_core::config_file_path().display().to_string(),
            ));
        }

        let mut runs: Vec<_> = roots
            .into_iter()
            .map(|root| self.ingestor.spawn_ingest(root))
            .collect();
        if with_kit {
            let ingestor = self.ingestor.clone();
            let bundle_root = self.config.bundle_root.clone();
            let kit = self.config.builtin_kit.clone();
            runs.push(tokio::task::spawn_blocking(move || {
                ingestor.ingest_kit(bundle_root.as_deref(), &kit)
            }));
        }

        let mut summary = ImportSummary::default();
        for run in runs {
            match run.await? {
                Ok(report) => summary.absorb(&report),
                Err(err) => {
                    warn!("{}", err);
                    summary.skipped += 1;
                }
            }
        }
        info!(
            added = summary.added,
            skipped = summary.skipped,
            "Import finished"
        );

        self.pump_events();
        Ok(summary)
    }

    /// Drain pending events, rebuilding the view if the library changed.
    ///
    /// Returns `true` if the view was rebuilt.
    pub fn pump_events(&mut self) -> bool {
        let mut library_changed = false;
        while let Ok(event) = self.events.try_recv() {
            debug!(?event, "Event");
            if matches!(event, LibraryEvent::LibraryChanged { .. }) {
                library_changed = true;
            }
        }
        if library_changed {
            self.session.refresh();
            // Drop the selection/page events the rebuild just emitted.
            while self.events.try_recv().is_ok() {}
        }
        library_changed
    }

    /// Wait for the next engine event or finished background import.
    pub async fn next_notice(&mut self) -> Option<Notice> {
        tokio::select! {
            Some(event) = self.events.recv() => Some(Notice::Event(event)),
            Some(outcome) = self.outcomes.recv() => Some(Notice::Import(outcome)),
            else => None,
        }
    }

    /// Start importing `roots` (and the built-in kit if asked) in the
    /// background without waiting. Each run reports back through
    /// [`AppState::next_notice`] as an [`ImportOutcome`].
    pub fn import_in_background(&self, roots: &[PathBuf], with_kit: bool) {
        for root in self.import_roots(roots) {
            let run = self.ingestor.spawn_ingest(root.clone());
            let outcomes = self.outcomes_tx.clone();
            tokio::spawn(async move {
                let _ = outcomes.send(ImportOutcome::from_run(root, run.await));
            });
        }
        if with_kit {
            let ingestor = self.ingestor.clone();
            let bundle_root = self.config.bundle_root.clone();
            let kit = self.config.builtin_kit.clone();
            let root = bundle_root
                .as_ref()
                .map_or_else(|| PathBuf::from(&kit), |bundle| bundle.join(&kit));
            let outcomes = self.outcomes_tx.clone();
            tokio::spawn(async move {
                let run = tokio::task::spawn_blocking(move || {
                    ingestor.ingest_kit(bundle_root.as_deref(), &kit)
                })
                .await;
                let _ = outcomes.send(ImportOutcome::from_run(root, run));
            });
        }
    }
}

/// Print how a background import ended, one line per skipped entry.
pub fn render_outcome(outcome: &ImportOutcome, out: &mut impl Write) -> CliResult<()> {
    match outcome {
        ImportOutcome::Finished { root, report } => {
            writeln!(
                out,
                "Imported {} samples from {}",
                report.added,
                root.display()
            )?;
            for err in &report.errors {
                writeln!(out, "  skipped: {err}")?;
            }
        }
        ImportOutcome::Failed { root, error } => {
            writeln!(out, "Could not import {}: {error}", root.display())?;
        }
    }
    Ok(())
}

/// Print the current page of the session.
pub fn render_page(session: &BrowserSession, out: &mut impl Write) -> CliResult<()> {
    let query = session.query();
    writeln!(
        out,
        "Page {}/{}  {} samples  category: {}  search: {:?}",
        session.current_page() + 1,
        session.page_count().max(1),
        session.view().len(),
        query.category,
        query.search
    )?;

    let page_start = session.page_start();
    for (offset, sample) in session.visible().iter().enumerate() {
        let index = page_start + offset;
        let marker = if session.active_index() == Some(index) {
            '>'
        } else if session.is_dragged(index) {
            '*'
        } else {
            ' '
        };
        writeln!(out, "{marker} {index:>4}  {sample}")?;
    }
    Ok(())
}

/// `redpack list`: import, filter and print one page.
pub async fn list(
    state: &mut AppState,
    roots: &[PathBuf],
    with_kit: bool,
    query: Query,
    page: usize,
    json: bool,
    out: &mut impl Write,
) -> CliResult<()> {
    let summary = state.import(roots, with_kit).await?;
    let session = state.session_mut();
    session.set_query(query);
    session.jump_to_page(page.saturating_sub(1));

    if json {
        let visible: Vec<_> = session.visible().iter().map(AsRef::as_ref).collect();
        serde_json::to_writer_pretty(&mut *out, &visible).map_err(Error::from)?;
        writeln!(out)?;
    } else {
        render_page(session, out)?;
        if summary.duplicates > 0 {
            writeln!(out, "({} already imported files skipped)", summary.duplicates)?;
        }
        if summary.skipped > 0 {
            writeln!(out, "({} folders could not be read)", summary.skipped)?;
        }
    }
    Ok(())
}

/// `redpack import-file`: add one file and print how it was classified.
pub fn import_file(state: &mut AppState, path: &Path, out: &mut impl Write) -> CliResult<()> {
    let sample = state.ingestor.ingest_file(path)?;
    state.pump_events();
    writeln!(out, "{sample}")?;
    writeln!(out, "{}", sample.metadata())?;
    Ok(())
}

/// `redpack export`: import, filter and copy the sample at `index`.
pub async fn export(
    state: &mut AppState,
    roots: &[PathBuf],
    with_kit: bool,
    query: Query,
    index: usize,
    target: Option<ExportTarget>,
    out: &mut impl Write,
) -> CliResult<()> {
    state.import(roots, with_kit).await?;
    let target = target.unwrap_or_else(|| state.config().export_target.clone());

    let exporter = state.exporter.clone();
    let session = state.session_mut();
    session.set_query(query);
    session.select(index)?;
    if let Some(copied) = session.export_active(&exporter, &target)? {
        writeln!(out, "{}", copied.display())?;
    }
    Ok(())
}

/// `redpack config show`.
pub fn show_config(config: &AppConfig, out: &mut impl Write) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, config).map_err(Error::from)?;
    writeln!(out)?;
    Ok(())
}

/// `redpack config init`: write defaults unless a file is already there.
pub fn init_config(path: &Path, out: &mut impl Write) -> CliResult<()> {
    if path.exists() {
        writeln!(out, "Config already exists at {}", path.display())?;
        return Ok(());
    }
    AppConfig::default().save_to(path)?;
    writeln!(out, "Wrote default config to {}", path.display())?;
    Ok(())
}

/// Build a query from command-line filter arguments.
pub fn query_from_args(category: Option<CategoryFilter>, search: Option<String>) -> Query {
    Query {
        category: category.unwrap_or_default(),
        search: search.unwrap_or_default(),
    }
}
