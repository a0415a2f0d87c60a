//! Files a job owns on disk: the uploaded source and the generated deck.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// A file accepted at intake and written into the storage area.
///
/// Owned by the storage area until extraction or delegation consumes it;
/// released once the owning job reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: Uuid,
    /// Location inside the storage area. Never shown to clients.
    #[serde(skip_serializing)]
    pub stored_path: PathBuf,
    pub original_filename: String,
    pub declared_mime_type: Option<String>,
    pub size_bytes: u64,
    pub received_at: DateTime<Utc>,
}

/// The generated `.pptx` for a completed job. Read-only after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckArtifact {
    #[serde(skip_serializing)]
    pub path: PathBuf,
    /// Download name offered to the client, e.g. `report.pptx`.
    pub filename: String,
    pub slide_count: usize,
}

impl DeckArtifact {
    /// Download name derived from the uploaded file's name.
    pub fn download_name(original_filename: &str) -> String {
        let stem = original_filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(original_filename);
        let stem = match stem.rfind('.') {
            Some(i) if i > 0 => &stem[..i],
            _ => stem,
        };
        let stem = stem.trim();
        if stem.is_empty() {
            "presentation.pptx".to_string()
        } else {
            format!("{stem}.pptx")
        }
    }
}
