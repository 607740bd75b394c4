mod conflict;
mod error;
mod scan;
#[cfg(test)]
mod tests;

pub use conflict::check_no_conflict;
pub use error::EngineError;
pub use scan::{merge_spans, saturated_spans, scan_day, subtract_spans};

use std::sync::Arc;

use chrono::{Local, NaiveDate, Timelike};

use crate::model::*;
use crate::observability;
use crate::store::{BookingRepository, SettingsProvider};

/// Options for one availability query.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityOptions {
    /// Caller-prefetched bookings for the date. When set, treated as
    /// authoritative — the repository is not consulted. Lets a calendar
    /// view that already loaded the day avoid a duplicate read.
    pub bookings: Option<Vec<Booking>>,
    /// Calendar-view flow: passed slots keep a "passed" label instead of
    /// being excluded from booking.
    pub include_past: bool,
}

/// The dynamic scheduling core. Stateless and side-effect-free per call:
/// every query independently reads settings and bookings and returns a
/// fresh slot list, so concurrent callers never share mutable state.
pub struct AvailabilityEngine {
    settings: Arc<dyn SettingsProvider>,
    bookings: Arc<dyn BookingRepository>,
}

impl AvailabilityEngine {
    pub fn new(settings: Arc<dyn SettingsProvider>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { settings, bookings }
    }

    /// Compute which start times on `date` are offerable for `request`.
    ///
    /// Input errors reject before any read; a failing settings or bookings
    /// read surfaces as [`EngineError::Store`] ("availability unknown"),
    /// never as an empty slot list.
    pub async fn compute_availability(
        &self,
        shop_id: &str,
        date: NaiveDate,
        request: &ServiceRequest,
        opts: AvailabilityOptions,
    ) -> Result<Vec<Slot>, EngineError> {
        let started = std::time::Instant::now();

        request.validate()?;
        if shop_id.len() > crate::limits::MAX_SHOP_ID_LEN {
            return Err(EngineError::LimitExceeded("shop id too long"));
        }

        let settings = self.settings.settings(shop_id).await?;
        settings.validate()?;

        let day: Vec<Booking> = match opts.bookings {
            Some(list) => list
                .into_iter()
                .filter(|b| b.date == date && b.occupies())
                .collect(),
            None => self.bookings.bookings_for_date(date).await?,
        };

        let now = minute_of_day_if_today(date);
        let slots = scan_day(&settings, request, &day, now, opts.include_past);

        metrics::counter!(observability::AVAILABILITY_QUERIES_TOTAL).increment(1);
        metrics::histogram!(observability::AVAILABILITY_QUERY_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        tracing::debug!(
            shop = shop_id,
            %date,
            category = %request.category,
            duration = request.duration_min,
            slots = slots.len(),
            open = slots.iter().filter(|s| s.available).count(),
            "availability computed"
        );

        Ok(slots)
    }
}

/// Shop-local minute of day, but only when `date` is today — a future date
/// is never "past", and the scan skips the past rule entirely otherwise.
fn minute_of_day_if_today(date: NaiveDate) -> Option<Minutes> {
    let now = Local::now();
    if now.date_naive() == date {
        Some((now.hour() * 60 + now.minute()) as Minutes)
    } else {
        None
    }
}
