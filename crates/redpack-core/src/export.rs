//! Exporting samples out of the library.
//!
//! An export copies the sample's backing file into a directory under its
//! original file name. Existing files are never overwritten or renamed
//! around: a name clash is reported as [`ExportError::Collision`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ExportError, FileSystemError};
use crate::fs::FileSystem;
use crate::sample::Sample;

/// Where an export should land.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "path")]
pub enum ExportTarget {
    /// The user's desktop directory.
    Desktop,
    /// The user's documents directory.
    #[default]
    Documents,
    /// An explicit directory.
    Folder(PathBuf),
}

impl ExportTarget {
    /// Resolve the target to a directory.
    pub fn resolve(&self) -> Result<PathBuf, ExportError> {
        match self {
            Self::Desktop => dirs::desktop_dir()
                .ok_or_else(|| ExportError::NoTarget("desktop directory".to_string())),
            Self::Documents => dirs::document_dir()
                .ok_or_else(|| ExportError::NoTarget("documents directory".to_string())),
            Self::Folder(path) => Ok(path.clone()),
        }
    }
}

/// Copies samples to export destinations.
#[derive(Clone)]
pub struct Exporter {
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter").finish_non_exhaustive()
    }
}

impl Exporter {
    /// Create an exporter over `fs`.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Copy `sample` into `destination_dir`, keeping its file name.
    ///
    /// Returns the path of the new copy. On failure nothing is written and
    /// the sample is untouched.
    pub fn export(&self, sample: &Sample, destination_dir: &Path) -> Result<PathBuf, ExportError> {
        let destination = destination_dir.join(sample.name());

        if !self.fs.is_dir(destination_dir) {
            return Err(ExportError::DestinationUnwritable {
                destination,
                reason: format!("{} is not a directory", destination_dir.display()),
            });
        }

        match self.fs.copy_new(sample.file_url(), &destination) {
            Ok(bytes) => {
                info!(bytes, "Exported {} to {}", sample.name(), destination.display());
                Ok(destination)
            }
            Err(e) => {
                warn!("Export of {} failed: {}", sample.name(), e);
                Err(match e {
                    FileSystemError::AlreadyExists { .. } => ExportError::Collision { destination },
                    FileSystemError::NotFound { .. } => ExportError::SourceMissing {
                        source_path: sample.file_url().to_path_buf(),
                    },
                    other => ExportError::DestinationUnwritable {
                        destination,
                        reason: other.to_string(),
                    },
                })
            }
        }
    }

    /// Copy `sample` into the directory named by `target`.
    pub fn export_to(&self, sample: &Sample, target: &ExportTarget) -> Result<PathBuf, ExportError> {
        let dir = target.resolve()?;
        self.export(sample, &dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{MemoryFileSystem, RealFileSystem};
    use crate::sample::Category;

    fn memory_exporter() -> (MemoryFileSystem, Exporter) {
        let fs = MemoryFileSystem::new();
        let exporter = Exporter::new(Arc::new(fs.clone()));
        (fs, exporter)
    }

    #[test]
    fn test_export_keeps_file_name() {
        let (fs, exporter) = memory_exporter();
        fs.add_file("/lib/deep/kit/kick_01.wav", b"kick");
        fs.add_dir("/out");
        let sample = Sample::new(PathBuf::from("/lib/deep/kit/kick_01.wav"), Category::Kick);

        let copied = exporter.export(&sample, Path::new("/out")).unwrap();
        assert_eq!(copied, PathBuf::from("/out/kick_01.wav"));
        assert_eq!(fs.contents("/out/kick_01.wav"), Some(b"kick".to_vec()));
    }

    #[test]
    fn test_export_collision_leaves_files_alone() {
        let (fs, exporter) = memory_exporter();
        fs.add_file("/lib/snare.wav", b"new");
        fs.add_file("/out/snare.wav", b"old");
        let sample = Sample::new(PathBuf::from("/lib/snare.wav"), Category::Snare);

        let err = exporter.export(&sample, Path::new("/out")).unwrap_err();
        assert_eq!(
            err,
            ExportError::Collision {
                destination: PathBuf::from("/out/snare.wav")
            }
        );
        assert_eq!(fs.contents("/out/snare.wav"), Some(b"old".to_vec()));
        assert_eq!(fs.contents("/lib/snare.wav"), Some(b"new".to_vec()));
    }

    #[test]
    fn test_export_missing_source() {
        let (fs, exporter) = memory_exporter();
        fs.add_dir("/out");
        let sample = Sample::new(PathBuf::from("/lib/gone.wav"), Category::Other);

        let err = exporter.export(&sample, Path::new("/out")).unwrap_err();
        assert!(matches!(err, ExportError::SourceMissing { .. }));
    }

    #[test]
    fn test_export_unwritable_destination() {
        let (fs, exporter) = memory_exporter();
        fs.add_file("/lib/tom.wav", b"t");
        fs.add_dir("/locked");
        fs.mark_read_only("/locked");
        let sample = Sample::new(PathBuf::from("/lib/tom.wav"), Category::Tom);

        let err = exporter.export(&sample, Path::new("/locked")).unwrap_err();
        assert!(matches!(err, ExportError::DestinationUnwritable { .. }));

        let err = exporter.export(&sample, Path::new("/nowhere")).unwrap_err();
        assert!(matches!(err, ExportError::DestinationUnwritable { .. }));
        assert_eq!(fs.file_count(), 1);
    }

    #[test]
    fn test_export_to_folder_on_disk() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let file = src.path().join("clap_tight.aiff");
        std::fs::write(&file, b"clap").unwrap();
        let sample = Sample::new(file.clone(), Category::Clap);
        let exporter = Exporter::new(Arc::new(RealFileSystem));

        let target = ExportTarget::Folder(dst.path().to_path_buf());
        let copied = exporter.export_to(&sample, &target).unwrap();
        assert_eq!(std::fs::read(&copied).unwrap(), b"clap");

        let err = exporter.export_to(&sample, &target).unwrap_err();
        assert!(matches!(err, ExportError::Collision { .. }));
        assert_eq!(std::fs::read(&file).unwrap(), b"clap");
    }

    #[test]
    fn test_export_target_serde() {
        let json = serde_json::to_string(&ExportTarget::Desktop).unwrap();
        assert_eq!(json, r#"{"kind":"desktop"}"#);
        let folder: ExportTarget =
            serde_json::from_str(r#"{"kind":"folder","path":"/tmp/out"}"#).unwrap();
        assert_eq!(folder, ExportTarget::Folder(PathBuf::from("/tmp/out")));
    }
}
