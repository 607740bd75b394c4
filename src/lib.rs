//! bayline — slot availability engine for shop-floor booking.
//!
//! Given a calendar date, a requested service (duration + category) and the
//! bookings already on the books, computes which start times are offerable:
//! business hours, break windows, per-category bay contention, multi-service
//! buffers and past-time exclusion. Every query recomputes from scratch —
//! slots carry no identity across calls.
//!
//! Storage is external: the engine reads through the two contracts in
//! [`store`] and never writes. The availability answer is advisory; the
//! booking repository is where a conflicting write must lose.

pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod store;
pub mod timefmt;

pub use engine::{AvailabilityEngine, AvailabilityOptions, EngineError};
pub use model::{
    Booking, BookingStatus, Minutes, ServiceItem, ServiceRequest, ShopSettings, Slot, SlotReason,
    TimeSpan,
};
pub use store::{BookingRecord, BookingRepository, MemoryBookingStore, MemorySettings, SettingsProvider};
