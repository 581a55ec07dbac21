use crate::core::search::{filter_guests, guest_stats, GuestStats, SideFilter};
use crate::domain::{GuestRecord, NewGuest, RecordId};
use crate::errors::Result;
use crate::storage::GuestStore;

/// In-memory guest list, newest first.
pub struct GuestBook {
    guests: Vec<GuestRecord>,
    store: Box<dyn GuestStore>,
}

impl GuestBook {
    pub fn new(store: Box<dyn GuestStore>) -> Self {
        Self {
            guests: Vec::new(),
            store,
        }
    }

    pub fn load(&mut self) -> Result<usize> {
        match self.store.fetch_all() {
            Ok(guests) => {
                tracing::info!(count = guests.len(), "guests loaded");
                self.guests = guests;
                Ok(self.guests.len())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load guests; continuing with none");
                self.guests.clear();
                Err(err)
            }
        }
    }

    pub fn guests(&self) -> &[GuestRecord] {
        &self.guests
    }

    pub fn add(&mut self, guest: NewGuest) -> Result<GuestRecord> {
        let stored = self.store.insert(&guest)?;
        tracing::info!(id = %stored.id, side = %stored.side, "guest added");
        match self.store.fetch_all() {
            Ok(guests) => self.guests = guests,
            Err(err) => {
                tracing::warn!(error = %err, "refresh after write failed; applying change locally");
                self.guests.insert(0, stored.clone());
            }
        }
        Ok(stored)
    }

    pub fn delete(&mut self, id: &RecordId) -> Result<()> {
        self.store.delete(id)?;
        tracing::info!(id = %id, "guest removed");
        match self.store.fetch_all() {
            Ok(guests) => self.guests = guests,
            Err(err) => {
                tracing::warn!(error = %err, "refresh after write failed; applying change locally");
                self.guests.retain(|guest| &guest.id != id);
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> GuestStats {
        guest_stats(&self.guests)
    }

    pub fn filter(&self, query: &str, side: SideFilter) -> Vec<&GuestRecord> {
        filter_guests(&self.guests, query, side)
    }
}
