use chrono::{DateTime, Utc};

/// The single timestamp format of the history file: ISO-8601 UTC with
/// millisecond precision, e.g. `2024-12-03T08:00:00.000Z`.
pub const ISO_MILLIS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_iso_millis(value: DateTime<Utc>) -> String {
    value.format(ISO_MILLIS_FORMAT).to_string()
}

/// Serde module for `Option<DateTime<Utc>>` fields in the millisecond ISO
/// format. Revival happens per-field through this module, never as a textual
/// sweep over the whole document, so unrelated strings that happen to look
/// like dates stay strings.
pub mod iso_millis_opt {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::ISO_MILLIS_FORMAT;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&super::format_iso_millis(*v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| {
                NaiveDateTime::parse_from_str(&s, ISO_MILLIS_FORMAT)
                    .map(|v| v.and_utc())
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}
