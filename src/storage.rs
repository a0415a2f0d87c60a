//! Storage area for uploads and generated decks.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//!  ├─ input/   00000001-<uuid>-report.pdf
//!  └─ output/  00000002-<uuid>-report.pptx
//! ```
//!
//! Every allocated name starts with a process-wide sequence number and a
//! fresh UUID, so two allocations never collide even when concurrent jobs
//! upload files with the same name. The suggested name is kept (sanitised)
//! only to make the directory readable when debugging.
//!
//! The area is an explicit value handed to the orchestrator rather than a
//! global directory; its lifetime is the service's lifetime, and
//! [`StorageArea::purge`] removes everything at shutdown.

use crate::error::ConversionError;
use crate::output::UploadedDocument;
use chrono::Utc;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Longest sanitised name kept in an allocated file name.
const MAX_NAME_LEN: usize = 96;

static NEXT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Which half of the storage area a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Input,
    Output,
}

impl StorageKind {
    fn dir_name(&self) -> &'static str {
        match self {
            StorageKind::Input => "input",
            StorageKind::Output => "output",
        }
    }
}

/// Filesystem failures inside the storage area.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot create storage directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot remove '{}': {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Refusing to touch '{}': outside the storage area", path.display())]
    OutsideRoot { path: PathBuf },
}

impl From<StorageError> for ConversionError {
    /// Drops the path: job errors are shown to clients.
    fn from(e: StorageError) -> Self {
        let detail = match &e {
            StorageError::CreateDir { source, .. } => {
                format!("could not prepare storage ({source})")
            }
            StorageError::Write { source, .. } => format!("could not store file ({source})"),
            StorageError::Remove { source, .. } => format!("could not remove file ({source})"),
            StorageError::OutsideRoot { .. } => "path outside the storage area".to_string(),
        };
        ConversionError::Storage { detail }
    }
}

/// Owns the directory tree that holds every job's files.
#[derive(Debug)]
pub struct StorageArea {
    root: PathBuf,
}

impl StorageArea {
    /// Create a handle rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that holds files of `kind`.
    pub fn dir(&self, kind: StorageKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Reserve a fresh, collision-free path. The file itself is not created.
    pub async fn allocate(
        &self,
        kind: StorageKind,
        suggested_name: &str,
    ) -> Result<PathBuf, StorageError> {
        let dir = self.dir(kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "{seq:08}-{}-{}",
            Uuid::new_v4().simple(),
            sanitize_filename(suggested_name)
        );
        Ok(dir.join(name))
    }

    /// Allocate an input slot and write the upload into it.
    ///
    /// The file is opened with `create_new`, so an existing file is never
    /// overwritten. A partial file is removed if the write fails.
    pub async fn store_upload(
        &self,
        original_filename: &str,
        declared_mime_type: Option<String>,
        bytes: &[u8],
    ) -> Result<UploadedDocument, StorageError> {
        let path = self.allocate(StorageKind::Input, original_filename).await?;

        let written = async {
            let mut file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await?;
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;

        if let Err(source) = written {
            self.discard(&path).await;
            return Err(StorageError::Write { path, source });
        }

        debug!("Stored upload '{}' ({} bytes)", original_filename, bytes.len());
        Ok(UploadedDocument {
            id: Uuid::new_v4(),
            stored_path: path,
            original_filename: original_filename.to_string(),
            declared_mime_type,
            size_bytes: bytes.len() as u64,
            received_at: Utc::now(),
        })
    }

    /// Delete a previously allocated file. Already-missing files are fine.
    pub async fn release(&self, path: &Path) -> Result<(), StorageError> {
        if !self.contains(path) {
            return Err(StorageError::OutsideRoot {
                path: path.to_path_buf(),
            });
        }
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!("Released {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// [`release`](Self::release), logging instead of returning failures.
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = self.release(path).await {
            warn!("Storage cleanup failed: {}", e);
        }
    }

    /// Remove the whole storage tree.
    pub async fn purge(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove {
                path: self.root.clone(),
                source,
            }),
        }
    }

    /// `true` if `path` lies under the storage root without `..` escapes.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
            && !path.components().any(|c| matches!(c, Component::ParentDir))
    }
}

/// Reduce a client-supplied name to `[A-Za-z0-9._-]`.
///
/// Directory parts are dropped, whitespace becomes `_`, leading dots are
/// stripped and the result is capped at 96 characters with the extension
/// kept. An empty result becomes `upload`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']);

    if cleaned.is_empty() {
        return "upload".to_string();
    }
    if cleaned.len() <= MAX_NAME_LEN {
        return cleaned.to_string();
    }

    // ASCII-only at this point, so byte slicing is safe.
    match cleaned.rfind('.') {
        Some(i) if cleaned.len() - i <= 16 => {
            let ext = &cleaned[i..];
            format!("{}{}", &cleaned[..MAX_NAME_LEN - ext.len()], ext)
        }
        _ => cleaned[..MAX_NAME_LEN].to_string(),
    }
}
