pub mod json_backend;
pub mod rest_backend;
pub mod rows;

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};

use crate::config::{BackendKind, Config};
use crate::domain::{ExpenseCategory, ExpenseRecord, GuestRecord, NewGuest, RecordId};
use crate::errors::Result;

use self::{json_backend::JsonStorage, rest_backend::RestBackend};

/// Remote or local table holding expense records.
pub trait ExpenseStore: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<ExpenseRecord>>;
    fn fetch_by_category(&self, category: ExpenseCategory) -> Result<Vec<ExpenseRecord>>;
    fn insert_one(&self, record: &ExpenseRecord) -> Result<()>;
    /// Inserts every record or none of them.
    fn insert_many(&self, records: &[ExpenseRecord]) -> Result<()>;
    /// Replaces the mutable fields of the record with the same id.
    fn update(&self, record: &ExpenseRecord) -> Result<()>;
    fn delete(&self, id: &RecordId) -> Result<()>;
}

/// Guest list table.
pub trait GuestStore: Send + Sync {
    /// Newest first.
    fn fetch_all(&self) -> Result<Vec<GuestRecord>>;
    fn insert(&self, guest: &NewGuest) -> Result<GuestRecord>;
    fn delete(&self, id: &RecordId) -> Result<()>;
}

/// Object storage for receipts and documents.
pub trait AttachmentStore: Send + Sync {
    /// Stores the blob and returns a publicly resolvable URL.
    fn upload(&self, attachment: &Attachment) -> Result<String>;
}

/// A file selected by the user, held in memory until uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("attachment");
        Ok(Self::new(name, bytes))
    }
}

/// The three store handles the application needs, backed by one backend.
pub struct Stores {
    pub expenses: Box<dyn ExpenseStore>,
    pub guests: Box<dyn GuestStore>,
    pub attachments: Box<dyn AttachmentStore>,
}

/// Opens the backend selected in `config`. `data_dir` roots the local store.
pub fn open_stores(config: &Config, data_dir: &std::path::Path) -> Result<Stores> {
    match config.backend {
        BackendKind::Rest => {
            let backend = RestBackend::new(config.rest.clone())?;
            tracing::info!(url = %config.rest.url, "using hosted backend");
            Ok(Stores {
                expenses: Box::new(backend.clone()),
                guests: Box::new(backend.clone()),
                attachments: Box::new(backend),
            })
        }
        BackendKind::Json => {
            let storage = JsonStorage::new(data_dir)?;
            tracing::info!(path = %data_dir.display(), "using local json store");
            Ok(Stores {
                expenses: Box::new(storage.clone()),
                guests: Box::new(storage.clone()),
                attachments: Box::new(storage),
            })
        }
    }
}

const RANDOM_SUFFIX_LEN: usize = 6;

/// Collision-resistant object name: `{millis}_{random}.{ext}`.
///
/// The extension keeps only ASCII alphanumerics and is dropped when nothing remains.
pub fn storage_file_name(original: &str, now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    let stem = format!("{}_{}", now.timestamp_millis(), suffix);
    match sanitized_extension(original) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn sanitized_extension(original: &str) -> Option<String> {
    let (_, ext) = original.rsplit_once('.')?;
    let cleaned: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn content_type_for(file_name: &str) -> &'static str {
    match sanitized_extension(file_name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
