//! Sample ingestion.
//!
//! Import is split in two steps:
//! - [`scan`] walks a directory tree through a [`FileSystem`] and lazily
//!   yields supported audio files and per-subtree failures. It never touches
//!   the library.
//! - [`Ingestor`] consumes a scan, classifies each file, appends it to the
//!   [`LibraryStore`] and publishes a single [`LibraryEvent::LibraryChanged`]
//!   once the whole run is done.
//!
//! An unreadable subdirectory is recorded in the [`IngestReport`] and the walk
//! continues with its siblings. A missing or unreadable root fails the run.
//!
//! # Example
//!
//! ```rust,ignore
//! use redpack_core::{Ingestor, LibraryStore, RealFileSystem, EventSink};
//!
//! let ingestor = Ingestor::new(Arc::new(RealFileSystem), LibraryStore::new(), EventSink::disconnected());
//! let report = ingestor.ingest(Path::new("/samples/drums"))?;
//! println!("added {}, skipped {} directories", report.added, report.errors.len());
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, FileSystemError, IngestError, Result};
use crate::events::{EventSink, LibraryEvent};
use crate::fs::{EntryKind, FileSystem};
use crate::library::LibraryStore;
use crate::sample::Sample;
use crate::taxonomy::classify;

/// File extensions accepted for import, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "aiff"];

/// Check if a path has a supported audio extension.
#[must_use]
pub fn is_supported_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// One step of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanItem {
    /// A supported audio file.
    Audio(PathBuf),
    /// A subtree or entry that could not be read.
    Skipped(IngestError),
}

/// Lazily walk `root` depth-first, yielding supported audio files and
/// failures. Unsupported files and directories themselves are not yielded,
/// nor are failures on entries without a supported extension.
pub fn scan<'a>(fs: &'a dyn FileSystem, root: &Path) -> impl Iterator<Item = ScanItem> + 'a {
    fs.walk(root).filter_map(|item| match item {
        Ok(entry) => match entry.kind {
            EntryKind::File if is_supported_audio(&entry.path) => {
                Some(ScanItem::Audio(entry.path))
            }
            EntryKind::File | EntryKind::Directory => None,
        },
        Err(failure) if failure.is_directory => {
            Some(ScanItem::Skipped(IngestError::UnreadableDirectory {
                path: failure.path,
                reason: failure.reason,
            }))
        }
        // Only audio files are worth reporting.
        Err(failure) if !is_supported_audio(&failure.path) => None,
        Err(failure) => Some(ScanItem::Skipped(IngestError::UnreadableEntry {
            path: failure.path,
            reason: failure.reason,
        })),
    })
}

/// Options for an ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Skip files whose path is already in the library.
    /// Default: false (re-importing a folder duplicates its samples).
    pub deduplicate: bool,
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Samples appended to the library.
    pub added: usize,
    /// Files skipped because they were already imported.
    pub duplicates: usize,
    /// Subtrees and entries that could not be read.
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<IngestError>,
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[IngestError],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

impl IngestReport {
    /// Whether every entry was read.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Appends scanned samples to a library.
///
/// Clones share the library, the event sink and the run lock, so runs
/// started from any clone are serialized against each other.
#[derive(Clone)]
pub struct Ingestor {
    fs: Arc<dyn FileSystem>,
    store: LibraryStore,
    events: EventSink,
    options: IngestOptions,
    run_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("store_len", &self.store.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Ingestor {
    /// Create an ingestor writing into `store`.
    pub fn new(fs: Arc<dyn FileSystem>, store: LibraryStore, events: EventSink) -> Self {
        Self {
            fs,
            store,
            events,
            options: IngestOptions::default(),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Set ingestion options.
    #[must_use]
    pub const fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    /// The library this ingestor writes to.
    #[must_use]
    pub const fn store(&self) -> &LibraryStore {
        &self.store
    }

    /// Import every supported file under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidRoot`] if `root` is missing, not a
    /// directory, or cannot be listed. Failures below the root are reported
    /// in [`IngestReport::errors`] instead.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn ingest(&self, root: &Path) -> Result<IngestReport> {
        let _run = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.fs.is_dir(root) {
            let reason = if self.fs.exists(root) {
                FileSystemError::NotADirectory {
                    path: root.to_path_buf(),
                }
                .to_string()
            } else {
                "not found".to_string()
            };
            return Err(invalid_root(root, reason));
        }

        let mut known: HashSet<PathBuf> = if self.options.deduplicate {
            self.store
                .with_samples(|samples| samples.iter().map(|s| s.file_url().to_path_buf()).collect())
        } else {
            HashSet::new()
        };

        let mut report = IngestReport::default();
        for item in scan(self.fs.as_ref(), root) {
            match item {
                ScanItem::Audio(path) => {
                    if self.options.deduplicate && !known.insert(path.clone()) {
                        debug!("Skipping already imported {}", path.display());
                        report.duplicates += 1;
                        continue;
                    }
                    let sample = self.store.push(build_sample(path));
                    debug!(
                        "Imported {} as {}",
                        sample.file_url().display(),
                        sample.category()
                    );
                    report.added += 1;
                }
                ScanItem::Skipped(err) => {
                    if err.path() == Some(root) {
                        return Err(invalid_root(root, skipped_reason(&err)));
                    }
                    warn!("{}", err);
                    report.errors.push(err);
                }
            }
        }

        info!(
            added = report.added,
            duplicates = report.duplicates,
            skipped = report.errors.len(),
            "Imported samples from {}",
            root.display()
        );
        self.events
            .emit(LibraryEvent::LibraryChanged { added: report.added });
        Ok(report)
    }

    /// Import a single audio file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or its extension is not
    /// supported.
    pub fn ingest_file(&self, path: &Path) -> Result<Arc<Sample>> {
        let _run = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.fs.is_file(path) {
            return Err(Error::FileSystem(FileSystemError::NotFound {
                path: path.to_path_buf(),
            }));
        }
        if !is_supported_audio(path) {
            return Err(Error::Ingest(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            }));
        }

        let sample = self.store.push(build_sample(path.to_path_buf()));
        info!("Imported {}", sample);
        self.events.emit(LibraryEvent::LibraryChanged { added: 1 });
        Ok(sample)
    }

    /// Import a built-in kit located at `kit` relative to `bundle_root`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NoBundleRoot`] when no bundle root is known,
    /// otherwise the same errors as [`Ingestor::ingest`].
    pub fn ingest_kit(&self, bundle_root: Option<&Path>, kit: &str) -> Result<IngestReport> {
        let bundle_root = bundle_root.ok_or_else(|| IngestError::NoBundleRoot {
            kit: kit.to_string(),
        })?;
        self.ingest(&bundle_root.join(kit))
    }

    /// Run [`Ingestor::ingest`] on the blocking thread pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_ingest(&self, root: PathBuf) -> JoinHandle<Result<IngestReport>> {
        let ingestor = self.clone();
        tokio::task::spawn_blocking(move || ingestor.ingest(&root))
    }
}

fn build_sample(path: PathBuf) -> Sample {
    let category = path
        .file_name()
        .map_or(crate::sample::Category::Other, |name| {
            classify(&name.to_string_lossy())
        });
    Sample::new(path, category)
}

fn invalid_root(root: &Path, reason: String) -> Error {
    Error::Ingest(IngestError::InvalidRoot {
        path: root.to_path_buf(),
        reason,
    })
}

fn skipped_reason(err: &IngestError) -> String {
    match err {
        IngestError::UnreadableDirectory { reason, .. }
        | IngestError::UnreadableEntry { reason, .. }
        | IngestError::InvalidRoot { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
