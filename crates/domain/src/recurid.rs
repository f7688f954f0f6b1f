use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Timestamp part of a recurrence id: ISO 8601 with explicit milliseconds.
///
/// Millisecond precision is kept on purpose so that two occurrences whose
/// original starts differ by less than a second can never alias each other.
const RECURID_TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const RECURID_TS_LEN: usize = 23;

/// Identifier of a recurrence exception, derived from the base event's
/// `uid` and the exception's original occurrence start time:
/// `"{uid}-{ISO8601 start}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Recurid {
    pub uid: String,
    pub original_start_ts: i64,
}

impl Recurid {
    pub fn new(uid: &str, original_start_ts: i64) -> Self {
        Self {
            uid: uid.to_string(),
            original_start_ts,
        }
    }

    pub fn as_string(&self) -> String {
        format!(
            "{}-{}",
            self.uid,
            Utc.timestamp_millis(self.original_start_ts)
                .format(RECURID_TS_FORMAT)
        )
    }
}

impl Display for Recurid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[derive(Error, Debug)]
pub enum InvalidRecuridError {
    #[error("Recurid: {0} is malformed")]
    Malformed(String),
}

impl FromStr for Recurid {
    type Err = InvalidRecuridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // fixed width timestamp suffix, separated from the uid by a dash
        if s.len() < RECURID_TS_LEN + 2 {
            return Err(InvalidRecuridError::Malformed(s.to_string()));
        }
        let (head, ts_part) = s.split_at(s.len() - RECURID_TS_LEN);
        if !head.ends_with('-') {
            return Err(InvalidRecuridError::Malformed(s.to_string()));
        }
        let uid = &head[..head.len() - 1];
        if uid.is_empty() {
            return Err(InvalidRecuridError::Malformed(s.to_string()));
        }
        let dt = NaiveDateTime::parse_from_str(ts_part, RECURID_TS_FORMAT)
            .map_err(|_| InvalidRecuridError::Malformed(s.to_string()))?;
        Ok(Self {
            uid: uid.to_string(),
            original_start_ts: dt.timestamp_millis(),
        })
    }
}

impl Serialize for Recurid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Recurid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct RecuridVisitor;

        impl<'de> Visitor<'de> for RecuridVisitor {
            type Value = Recurid;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A valid recurrence id representation")
            }

            fn visit_str<E>(self, value: &str) -> Result<Recurid, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<Recurid>()
                    .map_err(|_| E::custom(format!("Malformed recurid: {}", value)))
            }
        }

        deserializer.deserialize_str(RecuridVisitor)
    }
}
