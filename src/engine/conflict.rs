use crate::model::*;

use super::EngineError;
use super::scan::saturated_spans;

/// Write-time guard: would `span` double-book the category's resource?
///
/// The engine's availability answer is advisory only; two callers can be
/// shown the same open slot. The repository runs this check inside its
/// per-day critical section so exactly one of two conflicting writes lands.
///
/// Capacity 1: any overlapping same-category occupancy is a conflict.
/// Capacity N: a conflict only where N same-category jobs already run.
pub fn check_no_conflict(
    existing: &[Booking],
    category: &str,
    span: TimeSpan,
    capacity: u32,
) -> Result<(), EngineError> {
    if capacity <= 1 {
        for b in existing {
            if b.occupies() && b.category == category && b.span().overlaps(&span) {
                return Err(EngineError::Conflict(b.id));
            }
        }
    } else {
        let mut allocs: Vec<TimeSpan> = existing
            .iter()
            .filter(|b| b.occupies() && b.category == category)
            .map(|b| b.span())
            .collect();
        allocs.sort_by_key(|s| s.start);
        let saturated = saturated_spans(&allocs, capacity);
        for sat in &saturated {
            if sat.overlaps(&span) {
                return Err(EngineError::CapacityExceeded(capacity));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use ulid::Ulid;

    use super::*;

    fn booking(start: Minutes, duration_min: Minutes, category: &str) -> Booking {
        Booking {
            id: Ulid::new(),
            date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            start,
            duration_min,
            category: category.into(),
            status: BookingStatus::Confirmed,
            note: None,
        }
    }

    #[test]
    fn overlap_same_category_conflicts() {
        let day = vec![booking(600, 60, "wash")];
        let result = check_no_conflict(&day, "wash", TimeSpan::new(630, 690), 1);
        assert!(matches!(result, Err(EngineError::Conflict(id)) if id == day[0].id));
    }

    #[test]
    fn touching_spans_do_not_conflict() {
        let day = vec![booking(600, 60, "wash")];
        assert!(check_no_conflict(&day, "wash", TimeSpan::new(660, 720), 1).is_ok());
        assert!(check_no_conflict(&day, "wash", TimeSpan::new(540, 600), 1).is_ok());
    }

    #[test]
    fn different_category_never_conflicts() {
        let day = vec![booking(600, 60, "wash")];
        assert!(check_no_conflict(&day, "interior", TimeSpan::new(600, 660), 1).is_ok());
    }

    #[test]
    fn cancelled_bookings_ignored() {
        let mut b = booking(600, 60, "wash");
        b.status = BookingStatus::Cancelled;
        assert!(check_no_conflict(&[b], "wash", TimeSpan::new(600, 660), 1).is_ok());
    }

    #[test]
    fn capacity_two_allows_one_parallel_job() {
        let day = vec![booking(600, 60, "wash")];
        assert!(check_no_conflict(&day, "wash", TimeSpan::new(630, 690), 2).is_ok());
    }

    #[test]
    fn capacity_two_rejects_third_overlap() {
        let day = vec![booking(600, 60, "wash"), booking(630, 60, "wash")];
        let result = check_no_conflict(&day, "wash", TimeSpan::new(640, 655), 2);
        assert!(matches!(result, Err(EngineError::CapacityExceeded(2))));
    }
}
