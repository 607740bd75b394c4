use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::timefmt;

/// Minutes since local midnight — the only time-of-day type.
pub type Minutes = i32;

/// Exclusive upper bound for a day: jobs may end at 24:00 but never cross it.
pub const MINUTES_PER_DAY: Minutes = 1440;

/// Effective duration for legacy booking records that lack an explicit one.
pub const DEFAULT_DURATION_MIN: Minutes = 30;

/// Half-open interval `[start, end)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    #[serde(with = "timefmt::hm")]
    pub start: Minutes,
    #[serde(with = "timefmt::hm")]
    pub end: Minutes,
}

impl TimeSpan {
    pub fn new(start: Minutes, end: Minutes) -> Self {
        debug_assert!(start < end, "TimeSpan start must be before end");
        Self { start, end }
    }

    pub fn duration_min(&self) -> Minutes {
        self.end - self.start
    }

    /// Half-open overlap test: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Minutes) -> bool {
        self.start <= t && t < self.end
    }
}

/// Lifecycle of a booking document. Only some states occupy shop time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Deleted,
    Archived,
}

impl BookingStatus {
    /// Whether a booking in this state holds its category's resource.
    pub fn occupies_time(&self) -> bool {
        !matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::Deleted | BookingStatus::Archived
        )
    }
}

/// A booking as the engine consumes it: effective duration already resolved,
/// immutable from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub date: NaiveDate,
    #[serde(with = "timefmt::hm")]
    pub start: Minutes,
    pub duration_min: Minutes,
    pub category: String,
    pub status: BookingStatus,
    pub note: Option<String>,
}

impl Booking {
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.start + self.duration_min)
    }

    pub fn occupies(&self) -> bool {
        self.status.occupies_time()
    }
}

fn default_granularity() -> Minutes {
    5
}

fn default_capacity() -> u32 {
    1
}

fn default_buffer() -> Minutes {
    30
}

fn default_past_grace() -> Minutes {
    5
}

/// Per-shop business-hour configuration. Long-lived admin document, read by
/// the engine on every availability query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSettings {
    #[serde(with = "timefmt::hm")]
    pub open: Minutes,
    #[serde(with = "timefmt::hm")]
    pub close: Minutes,
    /// Scan step. A sampling cadence, not an availability guarantee.
    #[serde(default = "default_granularity")]
    pub granularity_min: Minutes,
    /// Windows during which no job may start or continue (e.g. lunch).
    #[serde(default)]
    pub breaks: Vec<TimeSpan>,
    /// Jobs of the same category that may run concurrently.
    #[serde(default = "default_capacity")]
    pub category_capacity: u32,
    /// Hand-off padding added when several services combine into one visit.
    #[serde(default = "default_buffer")]
    pub multi_service_buffer_min: Minutes,
    /// How far behind "now" a start time may lag before it counts as passed.
    #[serde(default = "default_past_grace")]
    pub past_grace_min: Minutes,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            open: 540,
            close: 1080,
            granularity_min: default_granularity(),
            breaks: Vec::new(),
            category_capacity: default_capacity(),
            multi_service_buffer_min: default_buffer(),
            past_grace_min: default_past_grace(),
        }
    }
}

impl ShopSettings {
    pub fn working_window(&self) -> TimeSpan {
        TimeSpan::new(self.open, self.close)
    }

    /// Break windows sorted by start, for the scan.
    pub fn break_spans(&self) -> Vec<TimeSpan> {
        let mut breaks = self.breaks.clone();
        breaks.sort_by_key(|b| b.start);
        breaks
    }

    pub fn validate(&self) -> Result<(), crate::engine::EngineError> {
        use crate::engine::EngineError::InvalidSettings;
        if self.open < 0 || self.close > MINUTES_PER_DAY || self.open >= self.close {
            return Err(InvalidSettings("working window is inverted or out of day"));
        }
        if self.granularity_min <= 0 {
            return Err(InvalidSettings("slot granularity must be positive"));
        }
        if self.category_capacity == 0 {
            return Err(InvalidSettings("category capacity must be at least 1"));
        }
        if self.multi_service_buffer_min < 0 || self.past_grace_min < 0 {
            return Err(InvalidSettings("buffer and grace must be non-negative"));
        }
        for b in &self.breaks {
            if b.start >= b.end || b.start < 0 || b.end > MINUTES_PER_DAY {
                return Err(InvalidSettings("break window is inverted or out of day"));
            }
        }
        Ok(())
    }
}

/// One underlying service, as priced in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub name: String,
    pub duration_min: Minutes,
    pub category: String,
}

/// What the caller wants a slot for. May stand for several combined services;
/// the engine only ever sees the final duration and one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub duration_min: Minutes,
    pub category: String,
}

impl ServiceRequest {
    /// Combine several services into one request: durations sum, the
    /// multi-service buffer applies when more than one item, manual extra
    /// time is added, and the first item's category resolves conflicts.
    pub fn combine(
        items: &[ServiceItem],
        extra_min: Minutes,
        settings: &ShopSettings,
    ) -> Option<Self> {
        let first = items.first()?;
        let mut duration: Minutes = items.iter().map(|i| i.duration_min).sum();
        if items.len() > 1 {
            duration += settings.multi_service_buffer_min;
        }
        duration += extra_min;
        Some(Self {
            duration_min: duration,
            category: first.category.clone(),
        })
    }

    pub fn validate(&self) -> Result<(), crate::engine::EngineError> {
        use crate::engine::EngineError::InvalidRequest;
        if self.duration_min <= 0 {
            return Err(InvalidRequest("duration must be positive"));
        }
        if self.duration_min > MINUTES_PER_DAY {
            return Err(InvalidRequest("duration exceeds a day"));
        }
        if self.category.is_empty() {
            return Err(InvalidRequest("category must not be empty"));
        }
        if self.category.len() > crate::limits::MAX_CATEGORY_LEN {
            return Err(crate::engine::EngineError::LimitExceeded(
                "category name too long",
            ));
        }
        Ok(())
    }
}

/// Why a scanned start time is not freely bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotReason {
    #[serde(rename = "outside business hours")]
    OutsideHours,
    #[serde(rename = "insufficient continuous time")]
    InsufficientTime,
    #[serde(rename = "break")]
    Break,
    #[serde(rename = "booked")]
    Booked,
    #[serde(rename = "passed")]
    Passed,
}

impl std::fmt::Display for SlotReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SlotReason::OutsideHours => "outside business hours",
            SlotReason::InsufficientTime => "insufficient continuous time",
            SlotReason::Break => "break",
            SlotReason::Booked => "booked",
            SlotReason::Passed => "passed",
        };
        f.write_str(s)
    }
}

/// One candidate start time for a given day. Fresh on every query, never
/// stored, returned in ascending time order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    #[serde(rename = "time", with = "timefmt::hm")]
    pub start: Minutes,
    pub display: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlotReason>,
    /// When blocked by a same-category booking: the minute the occupancy
    /// clears, so the UI can suggest the next free moment.
    #[serde(skip_serializing_if = "Option::is_none", with = "timefmt::hm_opt")]
    pub blocked_until: Option<Minutes>,
}
