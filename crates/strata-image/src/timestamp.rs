//! Descriptor timestamps.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire form of the unset timestamp.
pub const UNSET_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// Seconds from the Unix epoch to `0001-01-01T00:00:00Z`.
const UNSET_SECONDS: i64 = -62_135_596_800;

/// A creation timestamp that may be unset.
///
/// Descriptors always carry a `created` key. An unset value is written as
/// [`UNSET_TIMESTAMP`], and reading that instant (or `null`) back yields an
/// unset value again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Option<DateTime<Utc>>);

impl Timestamp {
    /// The unset timestamp.
    pub const UNSET: Self = Self(None);

    /// Wrap a point in time. The zero instant maps to [`Timestamp::UNSET`].
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        if at.timestamp() == UNSET_SECONDS && at.timestamp_subsec_nanos() == 0 {
            Self::UNSET
        } else {
            Self(Some(at))
        }
    }

    /// The point in time, if set.
    #[must_use]
    pub const fn get(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    /// Returns true if no time was recorded.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.0.is_none()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::new(at)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(at) => f.write_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => f.write_str(UNSET_TIMESTAMP),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(Self::UNSET);
        };
        // RFC 3339 allows a lowercase or space separator; descriptors do not.
        if text.as_bytes().get(10) != Some(&b'T') || text.ends_with('z') {
            return Err(<D::Error as serde::de::Error>::custom(format!(
                "timestamp {text:?} is not in YYYY-MM-DDTHH:MM:SSZ form"
            )));
        }
        let at = DateTime::parse_from_rfc3339(&text).map_err(<D::Error as serde::de::Error>::custom)?;
        Ok(Self::new(at.with_timezone(&Utc)))
    }
}
