//! Hard input limits. Guard rails against malformed or hostile callers, not
//! business rules — business rules live in `ShopSettings`.

/// Max bookings held for a single calendar date.
pub const MAX_BOOKINGS_PER_DAY: usize = 512;

/// Max length of a category (conflict-resolution key).
pub const MAX_CATEGORY_LEN: usize = 64;

/// Max length of a booking note.
pub const MAX_NOTE_LEN: usize = 256;

/// Max length of a shop id accepted by the settings provider.
pub const MAX_SHOP_ID_LEN: usize = 64;
