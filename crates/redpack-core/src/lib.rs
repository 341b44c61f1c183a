//! `RedPack` Core Library
//!
//! This crate provides the sample library engine behind `RedPack`:
//! - Recursive ingestion of audio sample folders
//! - Keyword-based taxonomy classification of file names
//! - Category and text filtering over the library
//! - Selection, keyboard navigation and pagination of the filtered view
//! - Export of single samples, including drag-and-drop targets
//! - Application configuration management
//!
//! # Error Handling
//!
//! Every fallible operation returns a typed error. See the [`error`] module
//! for the taxonomy.
//!
//! ```rust,ignore
//! use redpack_core::{BrowserSession, EventSink, Ingestor, LibraryStore, RealFileSystem};
//!
//! let store = LibraryStore::new();
//! let (events, _rx) = EventSink::channel();
//! let ingestor = Ingestor::new(Arc::new(RealFileSystem), store.clone(), events.clone());
//! ingestor.ingest(Path::new("/samples"))?;
//!
//! let mut session = BrowserSession::new(store, DEFAULT_PAGE_SIZE, events);
//! session.set_category("Kick".parse()?);
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod fs;
pub mod ingest;
pub mod input;
pub mod library;
pub mod pagination;
pub mod playback;
pub mod query;
pub mod sample;
pub mod selection;
pub mod session;
pub mod taxonomy;

pub use config::{AppConfig, config_file_path};
pub use error::{
    Error, ExportError, FileSystemError, IngestError, PlaybackError, Result, SelectionError,
};
pub use events::{EventSink, LibraryEvent};
pub use export::{ExportTarget, Exporter};
pub use fs::{FileSystem, MemoryFileSystem, RealFileSystem};
pub use ingest::{
    IngestOptions, IngestReport, Ingestor, SUPPORTED_EXTENSIONS, ScanItem, is_supported_audio,
    scan,
};
pub use input::{KeyBindings, NavigationCommand};
pub use library::LibraryStore;
pub use pagination::{DEFAULT_PAGE_SIZE, Paginator, max_page, page, page_count};
pub use playback::{Player, SystemPlayer, clamp_volume};
pub use query::{Query, filter};
pub use sample::{Category, CategoryFilter, Sample};
pub use selection::{Navigator, SelectionState};
pub use session::BrowserSession;
pub use taxonomy::{KEYWORDS, classify};
