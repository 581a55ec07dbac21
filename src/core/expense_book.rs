use crate::domain::{ExpenseCategory, ExpenseRecord, PaymentStatus, RecordId};
use crate::errors::{BudgetError, Result};
use crate::storage::{Attachment, AttachmentStore, ExpenseStore};

/// In-memory view of the expense table, owned by the caller.
///
/// Writes go to the store first; the cache only changes after the store
/// accepted the write.
pub struct ExpenseBook {
    records: Vec<ExpenseRecord>,
    store: Box<dyn ExpenseStore>,
    attachments: Box<dyn AttachmentStore>,
}

impl ExpenseBook {
    pub fn new(store: Box<dyn ExpenseStore>, attachments: Box<dyn AttachmentStore>) -> Self {
        Self {
            records: Vec::new(),
            store,
            attachments,
        }
    }

    /// Replaces the cache with the store contents.
    ///
    /// A failed fetch leaves an empty cache so screens render with no data;
    /// the error is still returned for the caller to report.
    pub fn load(&mut self) -> Result<usize> {
        match self.store.fetch_all() {
            Ok(records) => {
                tracing::info!(count = records.len(), "expenses loaded");
                self.records = records;
                Ok(self.records.len())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load expenses; continuing with none");
                self.records.clear();
                Err(err)
            }
        }
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn by_category(&self, category: ExpenseCategory) -> Vec<&ExpenseRecord> {
        self.records
            .iter()
            .filter(|record| record.category == category)
            .collect()
    }

    pub fn get(&self, id: &RecordId) -> Option<&ExpenseRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Uploads the attachment (if any) and then writes the record.
    pub fn add(
        &mut self,
        mut record: ExpenseRecord,
        attachment: Option<&Attachment>,
    ) -> Result<ExpenseRecord> {
        if let Some(file) = attachment {
            record.receipt_url = Some(self.attachments.upload(file)?);
        }
        self.store.insert_one(&record)?;
        tracing::info!(id = %record.id, category = %record.category, "expense created");
        let stored = record.clone();
        self.refresh_or_apply(move |records| records.push(record));
        Ok(stored)
    }

    /// Writes every record in one store call.
    pub fn add_batch(&mut self, records: Vec<ExpenseRecord>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        self.store.insert_many(&records)?;
        let count = records.len();
        tracing::info!(count, "expense batch created");
        self.refresh_or_apply(move |cached| cached.extend(records));
        Ok(count)
    }

    /// Replaces a stored record. A new attachment replaces the receipt URL;
    /// without one the record's current URL is written back unchanged.
    pub fn update(
        &mut self,
        mut record: ExpenseRecord,
        attachment: Option<&Attachment>,
    ) -> Result<ExpenseRecord> {
        if let Some(file) = attachment {
            record.receipt_url = Some(self.attachments.upload(file)?);
        }
        self.store.update(&record)?;
        tracing::info!(id = %record.id, "expense updated");
        let stored = record.clone();
        self.refresh_or_apply(move |records| replace(records, record));
        Ok(stored)
    }

    pub fn set_status(&mut self, id: &RecordId, status: PaymentStatus) -> Result<ExpenseRecord> {
        let current = self
            .get(id)
            .ok_or_else(|| BudgetError::NotFound(id.to_string()))?;
        let record = current.clone().with_status(status);
        self.store.update(&record)?;
        tracing::info!(id = %id, status = %status, "expense status changed");
        let stored = record.clone();
        self.refresh_or_apply(move |records| replace(records, record));
        Ok(stored)
    }

    /// Removes the record. Its attachment, if any, stays in storage.
    pub fn delete(&mut self, id: &RecordId) -> Result<()> {
        self.store.delete(id)?;
        tracing::info!(id = %id, "expense deleted");
        let id = id.clone();
        self.refresh_or_apply(move |records| records.retain(|record| record.id != id));
        Ok(())
    }

    /// Re-reads the store after a successful write. If the re-read fails the
    /// write is mirrored locally instead.
    fn refresh_or_apply<F>(&mut self, apply: F)
    where
        F: FnOnce(&mut Vec<ExpenseRecord>),
    {
        match self.store.fetch_all() {
            Ok(records) => self.records = records,
            Err(err) => {
                tracing::warn!(error = %err, "refresh after write failed; applying change locally");
                apply(&mut self.records);
            }
        }
    }
}

fn replace(records: &mut [ExpenseRecord], record: ExpenseRecord) {
    if let Some(slot) = records.iter_mut().find(|existing| existing.id == record.id) {
        *slot = record;
    }
}
