use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    domain::{ExpenseCategory, ExpenseRecord, GuestRecord, NewGuest, RecordId},
    errors::{BudgetError, Result},
    utils::ensure_dir,
};

use super::{
    rows::{guests_from_rows, records_from_rows, ExpenseRow, GuestRow},
    storage_file_name, Attachment, AttachmentStore, ExpenseStore, GuestStore,
};

const EXPENSES_FILE: &str = "expenses.json";
const GUESTS_FILE: &str = "guests.json";
const ATTACHMENTS_DIR: &str = "attachments";
const TMP_SUFFIX: &str = "tmp";

/// Local store keeping the backend table shapes in JSON files.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    attachments_dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonStorage {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        let attachments_dir = root.join(ATTACHMENTS_DIR);
        ensure_dir(&attachments_dir)?;
        Ok(Self {
            root,
            attachments_dir,
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    fn expenses_path(&self) -> PathBuf {
        self.root.join(EXPENSES_FILE)
    }

    fn guests_path(&self) -> PathBuf {
        self.root.join(GUESTS_FILE)
    }

    fn read_expense_rows(&self) -> Result<Vec<ExpenseRow>> {
        read_rows(&self.expenses_path())
    }

    /// Runs a read-modify-write cycle on the expenses file under the store lock.
    fn modify_expenses<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<ExpenseRow>) -> Result<()>,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| BudgetError::Config("json store lock poisoned".into()))?;
        let mut rows = self.read_expense_rows()?;
        change(&mut rows)?;
        write_rows(&self.expenses_path(), &rows)
    }

    fn modify_guests<F, T>(&self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<GuestRow>) -> Result<T>,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| BudgetError::Config("json store lock poisoned".into()))?;
        let mut rows: Vec<GuestRow> = read_rows(&self.guests_path())?;
        let output = change(&mut rows)?;
        write_rows(&self.guests_path(), &rows)?;
        Ok(output)
    }
}

impl ExpenseStore for JsonStorage {
    fn fetch_all(&self) -> Result<Vec<ExpenseRecord>> {
        let mut records = records_from_rows(self.read_expense_rows()?)?;
        records.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(records)
    }

    fn fetch_by_category(&self, category: ExpenseCategory) -> Result<Vec<ExpenseRecord>> {
        let mut records = ExpenseStore::fetch_all(self)?;
        records.retain(|record| record.category == category);
        Ok(records)
    }

    fn insert_one(&self, record: &ExpenseRecord) -> Result<()> {
        self.insert_many(std::slice::from_ref(record))
    }

    fn insert_many(&self, records: &[ExpenseRecord]) -> Result<()> {
        self.modify_expenses(|rows| {
            for record in records {
                let id = record.id.to_string();
                if rows.iter().any(|row| row_id(&row.id).as_deref() == Some(id.as_str())) {
                    return Err(BudgetError::Backend {
                        status: 409,
                        message: format!("duplicate key value: id {id} already exists"),
                    });
                }
            }
            rows.extend(records.iter().map(ExpenseRow::from));
            Ok(())
        })
    }

    fn update(&self, record: &ExpenseRecord) -> Result<()> {
        self.modify_expenses(|rows| {
            let id = record.id.to_string();
            let row = rows
                .iter_mut()
                .find(|row| row_id(&row.id).as_deref() == Some(id.as_str()))
                .ok_or_else(|| BudgetError::NotFound(id.clone()))?;
            let created_at = row.created_at.take();
            *row = ExpenseRow::from(record);
            row.created_at = created_at;
            Ok(())
        })
    }

    fn delete(&self, id: &RecordId) -> Result<()> {
        self.modify_expenses(|rows| {
            rows.retain(|row| row_id(&row.id).as_deref() != Some(id.as_str()));
            Ok(())
        })
    }
}

impl GuestStore for JsonStorage {
    fn fetch_all(&self) -> Result<Vec<GuestRecord>> {
        let mut guests = guests_from_rows(read_rows(&self.guests_path())?)?;
        guests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(guests)
    }

    fn insert(&self, guest: &NewGuest) -> Result<GuestRecord> {
        self.modify_guests(|rows| {
            let mut row = GuestRow::for_insert(guest, Utc::now());
            row.id = Some(serde_json::Value::String(RecordId::generate().to_string()));
            rows.push(row.clone());
            GuestRecord::try_from(row)
        })
    }

    fn delete(&self, id: &RecordId) -> Result<()> {
        self.modify_guests(|rows| {
            rows.retain(|row| row_id(&row.id).as_deref() != Some(id.as_str()));
            Ok(())
        })
    }
}

impl AttachmentStore for JsonStorage {
    fn upload(&self, attachment: &Attachment) -> Result<String> {
        ensure_dir(&self.attachments_dir)?;
        let name = storage_file_name(&attachment.file_name, Utc::now());
        let path = self.attachments_dir.join(&name);
        let tmp = tmp_path(&path);
        let mut file = File::create(&tmp)?;
        file.write_all(&attachment.bytes)?;
        file.flush()?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(path = %path.display(), "stored attachment");
        Ok(format!("file://{}", path.display()))
    }
}

fn row_id(value: &Option<serde_json::Value>) -> Option<String> {
    match value.as_ref()? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&data)?)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
