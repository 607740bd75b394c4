//! Conversions between minute-of-day values and "HH:MM" strings, plus the
//! 12-hour labels the booking UI shows. Pure and stateless; the scan itself
//! only ever works in minutes.

use crate::model::{MINUTES_PER_DAY, Minutes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTimeError {
    Malformed(String),
    OutOfRange(String),
}

impl std::fmt::Display for ParseTimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseTimeError::Malformed(s) => write!(f, "malformed time of day: {s:?} (want HH:MM)"),
            ParseTimeError::OutOfRange(s) => write!(f, "time of day out of range: {s:?}"),
        }
    }
}

impl std::error::Error for ParseTimeError {}

/// Parse a 24-hour "HH:MM" string into minutes since midnight.
/// "24:00" is accepted as the end-of-day sentinel (a job may end there).
pub fn parse_hm(s: &str) -> Result<Minutes, ParseTimeError> {
    let (h, m) = s
        .split_once(':')
        .ok_or_else(|| ParseTimeError::Malformed(s.into()))?;
    let digits = |p: &str| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit());
    if !digits(h) || !digits(m) {
        return Err(ParseTimeError::Malformed(s.into()));
    }
    let hours: Minutes = h
        .parse()
        .map_err(|_| ParseTimeError::Malformed(s.into()))?;
    let minutes: Minutes = m
        .parse()
        .map_err(|_| ParseTimeError::Malformed(s.into()))?;
    if minutes >= 60 {
        return Err(ParseTimeError::OutOfRange(s.into()));
    }
    let total = hours * 60 + minutes;
    if total > MINUTES_PER_DAY {
        return Err(ParseTimeError::OutOfRange(s.into()));
    }
    Ok(total)
}

/// Format minutes since midnight as 24-hour "HH:MM". 1440 formats as "24:00".
pub fn format_hm(t: Minutes) -> String {
    format!("{:02}:{:02}", t / 60, t % 60)
}

/// 12-hour label for display: 570 → "9:30 AM", 0 → "12:00 AM", 720 → "12:00 PM".
pub fn format_label(t: Minutes) -> String {
    let h24 = (t / 60) % 24;
    let m = t % 60;
    let suffix = if h24 < 12 { "AM" } else { "PM" };
    let h12 = match h24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{h12}:{m:02} {suffix}")
}

/// Serde adapter: `Minutes` on the wire as "HH:MM".
pub mod hm {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::model::Minutes;

    pub fn serialize<S: Serializer>(t: &Minutes, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&super::format_hm(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Minutes, D::Error> {
        let s = String::deserialize(de)?;
        super::parse_hm(&s).map_err(D::Error::custom)
    }
}

/// Serde adapter for optional minute fields; pair with `skip_serializing_if`.
pub mod hm_opt {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::model::Minutes;

    pub fn serialize<S: Serializer>(t: &Option<Minutes>, ser: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => ser.serialize_some(&super::format_hm(*t)),
            None => ser.serialize_none(),
        }
    }

    #[allow(dead_code)]
    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Minutes>, D::Error> {
        let s = Option::<String>::deserialize(de)?;
        match s {
            Some(s) => super::parse_hm(&s).map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}
