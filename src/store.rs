//! The engine's two external read contracts and their in-memory
//! implementations. Any storage technology satisfying these signatures is
//! substitutable; the engine never mutates bookings and never caches
//! settings (callers own caching policy — settings rarely change
//! mid-session).

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::engine::{EngineError, check_no_conflict};
use crate::limits::{MAX_BOOKINGS_PER_DAY, MAX_CATEGORY_LEN, MAX_NOTE_LEN};
use crate::model::*;
use crate::observability;
use crate::timefmt;

/// Read access to per-shop business-hour configuration.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn settings(&self, shop_id: &str) -> Result<ShopSettings, EngineError>;
}

/// Read access to the bookings already on the books for one date.
/// Implementations must exclude cancelled/deleted/archived records and
/// resolve an effective duration for legacy records that lack one.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn bookings_for_date(&self, date: NaiveDate) -> Result<Vec<Booking>, EngineError>;
}

/// A booking document as stored: duration is optional because legacy
/// records predate the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Ulid,
    pub date: NaiveDate,
    #[serde(with = "timefmt::hm")]
    pub start: Minutes,
    pub duration_min: Option<Minutes>,
    pub category: String,
    pub status: BookingStatus,
    pub note: Option<String>,
}

impl BookingRecord {
    pub fn new(date: NaiveDate, start: Minutes, duration_min: Option<Minutes>, category: &str) -> Self {
        Self {
            id: Ulid::new(),
            date,
            start,
            duration_min,
            category: category.into(),
            status: BookingStatus::Confirmed,
            note: None,
        }
    }

    fn effective_duration(&self, default_duration: Minutes) -> Minutes {
        self.duration_min.unwrap_or(default_duration)
    }

    /// Resolve into the engine's view, normalizing a missing duration.
    pub fn into_booking(self, default_duration: Minutes) -> Booking {
        let duration_min = self.effective_duration(default_duration);
        Booking {
            id: self.id,
            date: self.date,
            start: self.start,
            duration_min,
            category: self.category,
            status: self.status,
            note: self.note,
        }
    }

    fn validate(&self, default_duration: Minutes) -> Result<(), EngineError> {
        use EngineError::InvalidRequest;
        let duration = self.effective_duration(default_duration);
        if duration <= 0 {
            return Err(InvalidRequest("duration must be positive"));
        }
        if self.start < 0 || self.start + duration > MINUTES_PER_DAY {
            return Err(InvalidRequest("booking must end by 24:00 of its date"));
        }
        if self.category.is_empty() {
            return Err(InvalidRequest("category must not be empty"));
        }
        if self.category.len() > MAX_CATEGORY_LEN {
            return Err(EngineError::LimitExceeded("category name too long"));
        }
        if let Some(note) = &self.note
            && note.len() > MAX_NOTE_LEN {
                return Err(EngineError::LimitExceeded("note too long"));
            }
        Ok(())
    }
}

/// In-memory booking store. The per-day entry lock makes check-then-insert
/// atomic for a date: of two near-simultaneous conflicting writes, exactly
/// one lands — the advisory availability answer upstream cannot promise
/// that.
pub struct MemoryBookingStore {
    days: DashMap<NaiveDate, Vec<BookingRecord>>,
    category_capacity: u32,
    default_duration: Minutes,
}

impl Default for MemoryBookingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Store for a shop running `category_capacity` parallel bays per
    /// category.
    pub fn with_capacity(category_capacity: u32) -> Self {
        Self::with_config(category_capacity, DEFAULT_DURATION_MIN)
    }

    /// Full configuration: capacity plus the effective duration assigned to
    /// legacy records that lack one.
    pub fn with_config(category_capacity: u32, default_duration: Minutes) -> Self {
        Self {
            days: DashMap::new(),
            category_capacity,
            default_duration,
        }
    }

    /// Insert a booking, rejecting same-category double-booking.
    pub fn insert(&self, record: BookingRecord) -> Result<Ulid, EngineError> {
        record.validate(self.default_duration)?;

        let mut day = self.days.entry(record.date).or_default();
        if day.len() >= MAX_BOOKINGS_PER_DAY {
            return Err(EngineError::LimitExceeded("too many bookings on date"));
        }

        if record.status.occupies_time() {
            let existing: Vec<Booking> = day
                .iter()
                .cloned()
                .map(|r| r.into_booking(self.default_duration))
                .collect();
            let duration = record.effective_duration(self.default_duration);
            let span = TimeSpan::new(record.start, record.start + duration);
            if let Err(e) =
                check_no_conflict(&existing, &record.category, span, self.category_capacity)
            {
                metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
                tracing::warn!(%record.date, category = %record.category, "booking rejected: {e}");
                return Err(e);
            }
        }

        let id = record.id;
        tracing::info!(%record.date, category = %record.category, "booking {id} accepted");
        metrics::counter!(observability::BOOKINGS_CONFIRMED_TOTAL).increment(1);
        day.push(record);
        Ok(id)
    }

    /// Cancel a booking: it keeps its identity but stops occupying time.
    pub fn cancel(&self, date: NaiveDate, id: Ulid) -> Result<(), EngineError> {
        let mut day = self.days.get_mut(&date).ok_or(EngineError::NotFound(id))?;
        let record = day
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EngineError::NotFound(id))?;
        record.status = BookingStatus::Cancelled;
        tracing::info!(%date, "booking {id} cancelled");
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingStore {
    async fn bookings_for_date(&self, date: NaiveDate) -> Result<Vec<Booking>, EngineError> {
        let mut out: Vec<Booking> = match self.days.get(&date) {
            Some(day) => day
                .iter()
                .filter(|r| r.status.occupies_time())
                .cloned()
                .map(|r| r.into_booking(self.default_duration))
                .collect(),
            None => Vec::new(),
        };
        out.sort_by_key(|b| b.start);
        Ok(out)
    }
}

/// In-memory settings provider keyed by shop id.
#[derive(Default)]
pub struct MemorySettings {
    shops: DashMap<String, ShopSettings>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, shop_id: &str, settings: ShopSettings) {
        self.shops.insert(shop_id.into(), settings);
    }
}

#[async_trait]
impl SettingsProvider for MemorySettings {
    async fn settings(&self, shop_id: &str) -> Result<ShopSettings, EngineError> {
        self.shops
            .get(shop_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| EngineError::UnknownShop(shop_id.into()))
    }
}
