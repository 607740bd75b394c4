use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};

use super::*;
use crate::store::{BookingRecord, MemoryBookingStore, MemorySettings};

const SHOP: &str = "detailco";

/// A repository whose backend is unreachable.
struct FailingRepository;

#[async_trait]
impl BookingRepository for FailingRepository {
    async fn bookings_for_date(&self, _date: NaiveDate) -> Result<Vec<Booking>, EngineError> {
        Err(EngineError::Store("bookings backend unreachable".into()))
    }
}

fn future_date() -> NaiveDate {
    // far enough out that the past-time rule can never apply
    Local::now().date_naive() + Duration::days(30)
}

fn request(duration_min: Minutes, category: &str) -> ServiceRequest {
    ServiceRequest {
        duration_min,
        category: category.into(),
    }
}

fn engine_with_defaults() -> (AvailabilityEngine, Arc<MemoryBookingStore>) {
    let settings = Arc::new(MemorySettings::new());
    settings.insert(SHOP, ShopSettings::default());
    let store = Arc::new(MemoryBookingStore::new());
    let engine = AvailabilityEngine::new(settings, store.clone());
    (engine, store)
}

#[tokio::test]
async fn full_open_day() {
    let (engine, _) = engine_with_defaults();
    let slots = engine
        .compute_availability(SHOP, future_date(), &request(30, "wash"), Default::default())
        .await
        .unwrap();

    assert_eq!(slots[0].start, 540);
    assert!(slots[0].available);
    let last_open = slots.iter().rev().find(|s| s.available).unwrap();
    assert_eq!(last_open.start, 1050); // 17:30 + 30 ends at close
}

#[tokio::test]
async fn booked_hour_blocks_same_category() {
    let (engine, store) = engine_with_defaults();
    let date = future_date();
    store
        .insert(BookingRecord::new(date, 600, Some(60), "wash"))
        .unwrap();

    let slots = engine
        .compute_availability(SHOP, date, &request(30, "wash"), Default::default())
        .await
        .unwrap();

    let blocked = slots.iter().find(|s| s.start == 585).unwrap();
    assert!(!blocked.available);
    assert_eq!(blocked.reason, Some(SlotReason::Booked));
    assert_eq!(blocked.blocked_until, Some(660));

    assert!(slots.iter().find(|s| s.start == 570).unwrap().available);
    assert!(slots.iter().find(|s| s.start == 660).unwrap().available);
}

#[tokio::test]
async fn different_category_runs_in_parallel() {
    let (engine, store) = engine_with_defaults();
    let date = future_date();
    // interior bay occupied all day
    store
        .insert(BookingRecord::new(date, 540, Some(540), "interior"))
        .unwrap();

    let slots = engine
        .compute_availability(SHOP, date, &request(30, "wash"), Default::default())
        .await
        .unwrap();
    let empty_day = engine
        .compute_availability(
            SHOP,
            date,
            &request(30, "wash"),
            AvailabilityOptions {
                bookings: Some(Vec::new()),
                include_past: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(slots, empty_day);
}

#[tokio::test]
async fn prefetched_bookings_skip_repository() {
    let settings = Arc::new(MemorySettings::new());
    settings.insert(SHOP, ShopSettings::default());
    let engine = AvailabilityEngine::new(settings, Arc::new(FailingRepository));

    let date = future_date();
    let prefetched = vec![Booking {
        id: ulid::Ulid::new(),
        date,
        start: 600,
        duration_min: 60,
        category: "wash".into(),
        status: BookingStatus::Confirmed,
        note: None,
    }];

    // repository would fail — caller-supplied bookings are authoritative
    let slots = engine
        .compute_availability(
            SHOP,
            date,
            &request(30, "wash"),
            AvailabilityOptions {
                bookings: Some(prefetched),
                include_past: false,
            },
        )
        .await
        .unwrap();

    assert!(!slots.iter().find(|s| s.start == 630).unwrap().available);
}

#[tokio::test]
async fn prefetched_bookings_filtered_to_date() {
    let settings = Arc::new(MemorySettings::new());
    settings.insert(SHOP, ShopSettings::default());
    let engine = AvailabilityEngine::new(settings, Arc::new(FailingRepository));

    let date = future_date();
    let other_day = vec![Booking {
        id: ulid::Ulid::new(),
        date: date + Duration::days(1),
        start: 600,
        duration_min: 60,
        category: "wash".into(),
        status: BookingStatus::Confirmed,
        note: None,
    }];

    let slots = engine
        .compute_availability(
            SHOP,
            date,
            &request(30, "wash"),
            AvailabilityOptions {
                bookings: Some(other_day),
                include_past: false,
            },
        )
        .await
        .unwrap();

    // the other day's booking must not leak into this date
    assert!(slots.iter().find(|s| s.start == 630).unwrap().available);
    assert!(slots.iter().filter(|s| s.start <= 1050).all(|s| s.available));
}

#[tokio::test]
async fn repository_failure_is_not_fully_booked() {
    let settings = Arc::new(MemorySettings::new());
    settings.insert(SHOP, ShopSettings::default());
    let engine = AvailabilityEngine::new(settings, Arc::new(FailingRepository));

    let result = engine
        .compute_availability(SHOP, future_date(), &request(30, "wash"), Default::default())
        .await;
    assert!(matches!(result, Err(EngineError::Store(_))));
}

#[tokio::test]
async fn invalid_duration_rejected_before_any_read() {
    // both providers would fail; validation must trip first
    let settings = Arc::new(MemorySettings::new());
    let engine = AvailabilityEngine::new(settings, Arc::new(FailingRepository));

    let result = engine
        .compute_availability(SHOP, future_date(), &request(0, "wash"), Default::default())
        .await;
    assert!(matches!(result, Err(EngineError::InvalidRequest(_))));
}

#[tokio::test]
async fn unknown_shop_rejected() {
    let (engine, _) = engine_with_defaults();
    let result = engine
        .compute_availability("elsewhere", future_date(), &request(30, "wash"), Default::default())
        .await;
    assert!(matches!(result, Err(EngineError::UnknownShop(_))));
}

#[tokio::test]
async fn invalid_settings_rejected() {
    let settings = Arc::new(MemorySettings::new());
    settings.insert(
        SHOP,
        ShopSettings {
            granularity_min: 0,
            ..ShopSettings::default()
        },
    );
    let engine = AvailabilityEngine::new(settings, Arc::new(MemoryBookingStore::new()));

    let result = engine
        .compute_availability(SHOP, future_date(), &request(30, "wash"), Default::default())
        .await;
    assert!(matches!(result, Err(EngineError::InvalidSettings(_))));
}

#[tokio::test]
async fn future_date_is_never_past() {
    let (engine, _) = engine_with_defaults();
    let slots = engine
        .compute_availability(SHOP, future_date(), &request(30, "wash"), Default::default())
        .await
        .unwrap();
    assert!(slots.iter().all(|s| s.reason != Some(SlotReason::Passed)));
}

#[tokio::test]
async fn oversized_request_yields_empty_not_error() {
    let (engine, _) = engine_with_defaults();
    let slots = engine
        .compute_availability(SHOP, future_date(), &request(600, "wash"), Default::default())
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn breaks_block_all_categories() {
    let settings = Arc::new(MemorySettings::new());
    settings.insert(
        SHOP,
        ShopSettings {
            breaks: vec![TimeSpan::new(720, 750)],
            ..ShopSettings::default()
        },
    );
    let engine = AvailabilityEngine::new(settings, Arc::new(MemoryBookingStore::new()));

    for category in ["wash", "interior"] {
        let slots = engine
            .compute_availability(SHOP, future_date(), &request(30, category), Default::default())
            .await
            .unwrap();
        let lunch = slots.iter().find(|s| s.start == 720).unwrap();
        assert!(!lunch.available);
        assert_eq!(lunch.reason, Some(SlotReason::Break));
    }
}
