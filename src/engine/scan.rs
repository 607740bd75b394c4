use crate::model::*;
use crate::timefmt;

// ── Interval algebra ──────────────────────────────────────────────

/// Merge sorted overlapping/adjacent spans into disjoint spans.
pub fn merge_spans(sorted: &[TimeSpan]) -> Vec<TimeSpan> {
    let mut merged: Vec<TimeSpan> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start <= last.end {
                last.end = last.end.max(span.end);
                continue;
            }
        merged.push(span);
    }
    merged
}

/// Subtract `to_remove` (sorted, disjoint) from `base` (sorted, disjoint).
pub fn subtract_spans(base: &[TimeSpan], to_remove: &[TimeSpan]) -> Vec<TimeSpan> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut current_start = b.start;
        let current_end = b.end;

        while ri < to_remove.len() && to_remove[ri].end <= current_start {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start < current_end {
            let r = &to_remove[j];
            if r.start > current_start {
                result.push(TimeSpan::new(current_start, r.start));
            }
            current_start = current_start.max(r.end);
            j += 1;
        }

        if current_start < current_end {
            result.push(TimeSpan::new(current_start, current_end));
        }
    }

    result
}

/// Sweep line: time ranges where concurrent occupancy reaches `capacity`.
/// Returns sorted, merged spans. Capacity 1 degenerates to a plain merge.
pub fn saturated_spans(allocs: &[TimeSpan], capacity: u32) -> Vec<TimeSpan> {
    if allocs.is_empty() || capacity == 0 {
        return Vec::new();
    }
    if capacity == 1 {
        return merge_spans(allocs);
    }

    let mut events: Vec<(Minutes, i32)> = Vec::with_capacity(allocs.len() * 2);
    for a in allocs {
        events.push((a.start, 1));
        events.push((a.end, -1));
    }
    events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut result = Vec::new();
    let mut count: u32 = 0;
    let mut saturated_start: Option<Minutes> = None;

    for (time, delta) in &events {
        if *delta > 0 {
            count += *delta as u32;
        } else {
            count -= (-*delta) as u32;
        }

        if count >= capacity && saturated_start.is_none() {
            saturated_start = Some(*time);
        } else if count < capacity
            && let Some(start) = saturated_start.take()
            && *time > start {
                result.push(TimeSpan::new(start, *time));
            }
    }

    result
}

// ── Day scan ──────────────────────────────────────────────────────

fn classify(
    candidate: &TimeSpan,
    window: &TimeSpan,
    breaks: &[TimeSpan],
    blocked: &[TimeSpan],
) -> (bool, Option<SlotReason>, Option<Minutes>) {
    if !window.contains_instant(candidate.start) {
        return (false, Some(SlotReason::OutsideHours), None);
    }
    if candidate.end > window.end {
        return (false, Some(SlotReason::InsufficientTime), None);
    }
    if breaks.iter().any(|b| b.overlaps(candidate)) {
        return (false, Some(SlotReason::Break), None);
    }
    if let Some(hit) = blocked.iter().find(|s| s.overlaps(candidate)) {
        return (false, Some(SlotReason::Booked), Some(hit.end));
    }
    (true, None, None)
}

/// Scan one day at granularity steps and label every candidate start time.
///
/// `bookings` is the day's booking list; cancelled/deleted records are
/// skipped here, and only same-category bookings contend (distinct
/// categories are independently staffed). `now` is the shop-local minute of
/// day and must be `Some` only when the queried date is today; slots more
/// than `past_grace_min` behind it have passed — unavailable for booking
/// flows, a display label when `include_past` is set.
///
/// Caller validates `settings` and `request` first; duration is the final
/// required continuous occupancy, buffers already included.
///
/// If no contiguous run of the working window minus breaks can hold the
/// duration, returns an empty list: no availability is a normal outcome.
pub fn scan_day(
    settings: &ShopSettings,
    request: &ServiceRequest,
    bookings: &[Booking],
    now: Option<Minutes>,
    include_past: bool,
) -> Vec<Slot> {
    let window = settings.working_window();
    let breaks = merge_spans(&settings.break_spans());
    let duration = request.duration_min;

    let mut occupied: Vec<TimeSpan> = bookings
        .iter()
        .filter(|b| b.occupies() && b.category == request.category)
        .map(|b| b.span())
        .collect();
    occupied.sort_by_key(|s| s.start);
    let blocked = saturated_spans(&occupied, settings.category_capacity);

    let free_runs = subtract_spans(&[window], &breaks);
    if !free_runs.iter().any(|r| r.duration_min() >= duration) {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut t = window.start;
    while t < window.end {
        let candidate = TimeSpan::new(t, t + duration);
        let (mut available, mut reason, blocked_until) =
            classify(&candidate, &window, &breaks, &blocked);

        // Past rule, last: earlier blockers keep their own reason.
        if let Some(now) = now
            && t + settings.past_grace_min < now {
                if include_past {
                    if available {
                        reason = Some(SlotReason::Passed);
                    }
                } else if available {
                    available = false;
                    reason = Some(SlotReason::Passed);
                }
            }

        slots.push(Slot {
            start: t,
            display: timefmt::format_label(t),
            available,
            reason,
            blocked_until,
        });
        t += settings.granularity_min;
    }

    slots
}
