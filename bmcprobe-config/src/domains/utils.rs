//! Shared serde helpers for configuration domains

use humantime_serde::re::humantime;
use std::time::Duration;

/// Parse a duration written either as whole seconds (`30`) or in
/// humantime notation (`500ms`, `1m 30s`)
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }
    humantime::parse_duration(raw).map_err(|e| format!("invalid duration '{}': {}", raw, e))
}

/// Durations in config files
///
/// Plain numbers are seconds, strings go through [`parse_duration`].
/// Durations are written back in humantime notation so sub-second values
/// such as poll intervals survive `config show`.
pub mod serde_duration {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;
    use std::time::Duration;

    use super::{humantime, parse_duration};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DurationVisitor)
    }

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("seconds or a duration such as \"500ms\"")
        }

        fn visit_u64<E: de::Error>(self, seconds: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(seconds))
        }

        fn visit_i64<E: de::Error>(self, seconds: i64) -> Result<Duration, E> {
            u64::try_from(seconds)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration cannot be negative"))
        }

        fn visit_f64<E: de::Error>(self, seconds: f64) -> Result<Duration, E> {
            Duration::try_from_secs_f64(seconds).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, raw: &str) -> Result<Duration, E> {
            parse_duration(raw).map_err(E::custom)
        }
    }
}

pub fn default_true() -> bool {
    true
}

pub fn default_false() -> bool {
    false
}
