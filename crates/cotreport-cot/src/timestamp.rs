//! Zulu timestamps for the `time`, `start` and `stale` event attributes

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Seconds after generation at which an event goes stale.
pub const STALE_AFTER_SECS: i64 = 120;

/// How the millisecond component is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MillisFormat {
    /// Zero-padded to three digits: `2024-01-15T10:30:00.045Z`
    #[default]
    Padded,
    /// Bare integer: `2024-01-15T10:30:00.45Z`. Matches older reporters
    /// whose consumers may compare strings byte for byte.
    Unpadded,
}

/// A generation instant and its stale instant, plus their wire strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZuluTimes {
    /// Generation instant, truncated to milliseconds
    pub now: DateTime<Utc>,
    /// `now` + [`STALE_AFTER_SECS`]
    pub stale: DateTime<Utc>,
    /// `now` in `CCYY-MM-DDThh:mm:ss.mmmZ`
    pub now_z: String,
    /// `stale` in the same format
    pub stale_z: String,
}

/// Produces the `(nowZ, staleZ)` pair used by every event built in a tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampGenerator {
    millis: MillisFormat,
}

impl TimestampGenerator {
    pub fn new(millis: MillisFormat) -> Self {
        Self { millis }
    }

    /// Reads the wall clock.
    pub fn now_and_stale(&self) -> ZuluTimes {
        self.at(Utc::now())
    }

    /// Same as [`now_and_stale`](Self::now_and_stale) for a given instant.
    ///
    /// The instant is truncated to whole milliseconds first, so both strings
    /// carry the same sub-second component and the two instants are exactly
    /// [`STALE_AFTER_SECS`] apart.
    pub fn at(&self, now: DateTime<Utc>) -> ZuluTimes {
        let now = now.trunc_subsecs(3);
        let stale = now + Duration::seconds(STALE_AFTER_SECS);

        ZuluTimes {
            now,
            stale,
            now_z: format_zulu(&now, self.millis),
            stale_z: format_zulu(&stale, self.millis),
        }
    }
}

/// Formats an instant as `CCYY-MM-DDThh:mm:ss.mmmZ`.
pub fn format_zulu(time: &DateTime<Utc>, millis: MillisFormat) -> String {
    match millis {
        MillisFormat::Padded => time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        MillisFormat::Unpadded => format!(
            "{}.{}Z",
            time.format("%Y-%m-%dT%H:%M:%S"),
            time.timestamp_subsec_millis()
        ),
    }
}
