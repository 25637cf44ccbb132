//! Conversions between `OffsetDateTime` and epoch milliseconds, the
//! representation used on the wire.

use serde::{Deserialize, Deserializer, Serializer};
use time::{Duration, OffsetDateTime};

/// 0001-01-01T00:00:00Z.
const MIN_MILLIS: i64 = -62_135_596_800_000;

/// 9999-12-31T23:59:59.999Z.
const MAX_MILLIS: i64 = 253_402_300_799_999;

/// Converts epoch milliseconds to a UTC date-time, or `None` if the
/// instant falls outside years 1 through 9999.
///
/// ```
/// use players::timestamp::{from_millis, to_millis};
/// let moment = from_millis(1_000).unwrap();
/// assert_eq!(to_millis(moment), 1_000);
/// assert!(from_millis(i64::MAX).is_none());
/// ```
pub fn from_millis(millis: i64) -> Option<OffsetDateTime> {
    if (MIN_MILLIS..=MAX_MILLIS).contains(&millis) {
        Some(OffsetDateTime::unix_epoch() + Duration::milliseconds(millis))
    } else {
        None
    }
}

/// Like `from_millis`, but clamps out-of-range instants to the nearest
/// representable one.
pub fn from_millis_saturating(millis: i64) -> OffsetDateTime {
    OffsetDateTime::unix_epoch() + Duration::milliseconds(millis.max(MIN_MILLIS).min(MAX_MILLIS))
}

pub fn to_millis(moment: OffsetDateTime) -> i64 {
    // always in range, since `moment` lies within years 1 through 9999
    (moment - OffsetDateTime::unix_epoch()).whole_milliseconds() as i64
}

/// Serializes a date-time as epoch milliseconds.
pub fn serialize<S>(moment: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where S: Serializer {
    serializer.serialize_i64(to_millis(*moment))
}

/// Deserializes a date-time from epoch milliseconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where D: Deserializer<'de> {
    let millis: i64 = Deserialize::deserialize(deserializer)?;
    from_millis(millis).ok_or_else(|| out_of_range(millis))
}

/// Deserializes an optional date-time from epoch milliseconds.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where D: Deserializer<'de> {
    let millis: Option<i64> = Deserialize::deserialize(deserializer)?;

    match millis {
        Some(millis) => from_millis(millis).map(Some).ok_or_else(|| out_of_range(millis)),
        None => Ok(None),
    }
}

fn out_of_range<E: serde::de::Error>(millis: i64) -> E {
    E::custom(format!("timestamp {} is out of range", millis))
}
