// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: availability queries computed.
pub const AVAILABILITY_QUERIES_TOTAL: &str = "bayline_availability_queries_total";

/// Histogram: availability query latency in seconds (fetch + scan).
pub const AVAILABILITY_QUERY_DURATION_SECONDS: &str =
    "bayline_availability_query_duration_seconds";

// ── Write-side metrics ──────────────────────────────────────────

/// Counter: bookings accepted by the store.
pub const BOOKINGS_CONFIRMED_TOTAL: &str = "bayline_bookings_confirmed_total";

/// Counter: bookings rejected for same-category contention — the
/// check-then-act race the advisory availability answer cannot prevent.
pub const BOOKING_CONFLICTS_TOTAL: &str = "bayline_booking_conflicts_total";
