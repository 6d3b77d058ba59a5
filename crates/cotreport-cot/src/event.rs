//! CoT event structure emitted for each node report

use crate::report::NodeReport;
use crate::timestamp::ZuluTimes;
use serde::{Deserialize, Serialize};

/// CoT schema version
pub const COT_VERSION: &str = "2.0";

/// Event type for every reported vehicle: atom, ground.
///
/// The report's `TYPE` field is not mapped onto a more specific CoT type;
/// it only feeds into the UID.
pub const EVENT_TYPE: &str = "a-G";

/// `how` code: machine, GPS derived
pub const HOW_MACHINE_GPS: &str = "m-g";

/// Height above ellipsoid; depth is not converted
pub const POINT_HAE: &str = "0";
/// Circular error in meters
pub const POINT_CE: &str = "5";
/// Linear error in meters
pub const POINT_LE: &str = "5";

/// Builds the event UID `<base>_<type>_<name>`.
///
/// Vehicles sharing both type and name map to the same UID.
pub fn identifier(base: &str, vehicle_type: &str, name: &str) -> String {
    format!("{}_{}_{}", base, vehicle_type, name)
}

/// One CoT event.
///
/// Attribute values are kept as the strings that go on the wire: latitude
/// and longitude pass through from the report untouched, and the times are
/// already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CotEvent {
    /// CoT version (always "2.0")
    pub version: String,
    /// CoT type
    #[serde(rename = "type")]
    pub event_type: String,
    /// Unique identifier of the tracked vehicle
    pub uid: String,
    /// How the position was obtained
    pub how: String,
    /// Generation time
    pub time: String,
    /// Start of validity, equal to `time`
    pub start: String,
    /// End of validity
    pub stale: String,
    /// Position
    pub point: Point,
}

/// Position and accuracy of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub lat: String,
    pub lon: String,
    pub hae: String,
    pub ce: String,
    pub le: String,
}

impl Point {
    /// Point with the fixed height and error values.
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
            hae: POINT_HAE.to_string(),
            ce: POINT_CE.to_string(),
            le: POINT_LE.to_string(),
        }
    }
}

impl CotEvent {
    /// Creates an event from the per-tick timestamps and report-derived values.
    pub fn new(
        now_z: &str,
        stale_z: &str,
        uid: impl Into<String>,
        lat: impl Into<String>,
        lon: impl Into<String>,
    ) -> Self {
        Self {
            version: COT_VERSION.to_string(),
            event_type: EVENT_TYPE.to_string(),
            uid: uid.into(),
            how: HOW_MACHINE_GPS.to_string(),
            time: now_z.to_string(),
            start: now_z.to_string(),
            stale: stale_z.to_string(),
            point: Point::new(lat, lon),
        }
    }

    /// Creates the event for a node report.
    pub fn from_report(report: &NodeReport, uid_base: &str, times: &ZuluTimes) -> Self {
        Self::new(
            &times.now_z,
            &times.stale_z,
            identifier(uid_base, &report.vehicle_type, &report.name),
            report.lat.as_str(),
            report.lon.as_str(),
        )
    }
}
