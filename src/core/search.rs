//! List filtering for the category and guest screens.

use serde::Serialize;

use crate::domain::{ExpenseRecord, GuestRecord, GuestSide};

/// Records whose description contains `query` (case-insensitive), newest due
/// date first. Ties fall back to the most recently created record.
pub fn search_expenses<'a, I>(records: I, query: &str) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let needle = query.trim().to_lowercase();
    let mut found: Vec<&ExpenseRecord> = records
        .into_iter()
        .filter(|record| needle.is_empty() || record.description.to_lowercase().contains(&needle))
        .collect();
    found.sort_by(|a, b| {
        b.date
            .as_str()
            .cmp(a.date.as_str())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    found
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SideFilter {
    #[default]
    All,
    Bride,
    Groom,
}

impl SideFilter {
    pub fn accepts(&self, side: GuestSide) -> bool {
        match self {
            SideFilter::All => true,
            SideFilter::Bride => side == GuestSide::Bride,
            SideFilter::Groom => side == GuestSide::Groom,
        }
    }
}

impl std::str::FromStr for SideFilter {
    type Err = crate::errors::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(SideFilter::All);
        }
        Ok(match s.parse::<GuestSide>()? {
            GuestSide::Bride => SideFilter::Bride,
            GuestSide::Groom => SideFilter::Groom,
        })
    }
}

/// Guests matching both the name fragment and the side filter, input order kept.
pub fn filter_guests<'a>(
    guests: &'a [GuestRecord],
    query: &str,
    side: SideFilter,
) -> Vec<&'a GuestRecord> {
    let needle = query.trim().to_lowercase();
    guests
        .iter()
        .filter(|guest| side.accepts(guest.side))
        .filter(|guest| needle.is_empty() || guest.name.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GuestStats {
    pub bride: usize,
    pub groom: usize,
    pub children: usize,
    pub total: usize,
}

pub fn guest_stats(guests: &[GuestRecord]) -> GuestStats {
    guests.iter().fold(GuestStats::default(), |mut stats, guest| {
        match guest.side {
            GuestSide::Bride => stats.bride += 1,
            GuestSide::Groom => stats.groom += 1,
        }
        if guest.is_child {
            stats.children += 1;
        }
        stats.total += 1;
        stats
    })
}
