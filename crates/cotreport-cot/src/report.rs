//! Node report parsing.
//!
//! A node report is a flat `KEY=VALUE,KEY=VALUE,...` string. Parsing is best
//! effort: a token without `=` or with nothing after it is skipped, later
//! duplicates overwrite earlier ones, and reading a missing key yields `""`.

use std::collections::HashMap;
use tracing::trace;

/// Vehicle name
pub const NAME: &str = "NAME";
/// Vehicle type
pub const TYPE: &str = "TYPE";
/// Report time as sent by the vehicle
pub const TIME: &str = "TIME";
/// Latitude in decimal degrees
pub const LAT: &str = "LAT";
/// Longitude in decimal degrees
pub const LON: &str = "LON";
/// Depth in meters
pub const DEP: &str = "DEP";
/// Vehicle mode
pub const MODE: &str = "MODE";

/// Field mapping for a single report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReport {
    fields: HashMap<String, String>,
}

impl ParsedReport {
    /// Returns the value for `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    /// Returns true if `key` was present with a non-empty value.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consumes the report and returns the underlying map.
    pub fn into_fields(self) -> HashMap<String, String> {
        self.fields
    }
}

/// Parses a raw report. Never fails.
///
/// The key is everything before the first `=`; the value is the rest of the
/// token up to the first `'\n'`. A carriage return is ordinary value text.
/// An empty value drops the token.
pub fn parse(raw: &str) -> ParsedReport {
    let mut fields = HashMap::new();

    for token in raw.split(',') {
        let Some((key, rest)) = token.split_once('=') else {
            trace!(token, "Skipping report token without '='");
            continue;
        };

        let value = rest.split('\n').next().unwrap_or("");
        if value.is_empty() {
            trace!(key, "Skipping report field with empty value");
            continue;
        }

        fields.insert(key.to_string(), value.to_string());
    }

    ParsedReport { fields }
}

/// The fields of a node report the reporter reads.
///
/// `time`, `depth` and `mode` are carried but not emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeReport {
    pub name: String,
    pub vehicle_type: String,
    pub time: String,
    pub lat: String,
    pub lon: String,
    pub depth: String,
    pub mode: String,
}

impl NodeReport {
    /// Parses `raw` and extracts the known fields.
    pub fn parse(raw: &str) -> Self {
        Self::from_parsed(&parse(raw))
    }

    pub fn from_parsed(report: &ParsedReport) -> Self {
        Self {
            name: report.get(NAME).to_string(),
            vehicle_type: report.get(TYPE).to_string(),
            time: report.get(TIME).to_string(),
            lat: report.get(LAT).to_string(),
            lon: report.get(LON).to_string(),
            depth: report.get(DEP).to_string(),
            mode: report.get(MODE).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_report() {
        let report = parse("NAME=alpha,TYPE=uuv,LAT=10.5,LON=-20.25");

        let expected: HashMap<String, String> = [
            ("NAME", "alpha"),
            ("TYPE", "uuv"),
            ("LAT", "10.5"),
            ("LON", "-20.25"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(report.into_fields(), expected);
    }

    #[test]
    fn test_missing_key_reads_empty() {
        let report = parse("NAME=alpha");
        assert_eq!(report.get(NAME), "alpha");
        assert_eq!(report.get(LAT), "");
        assert!(!report.contains(LAT));
    }

    #[test]
    fn test_tokens_without_equals_are_dropped() {
        let report = parse("NAME=alpha,garbage,,LAT=1");
        assert_eq!(report.len(), 2);
        assert_eq!(report.get("garbage"), "");
    }

    #[test]
    fn test_empty_values_are_dropped() {
        let report = parse("NAME=,TYPE=uuv,MODE=");
        assert_eq!(report.len(), 1);
        assert!(!report.contains(NAME));
        assert!(!report.contains(MODE));
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let report = parse("MODE=MODE@ACTIVE:LOITERING=true,NAME=b");
        assert_eq!(report.get(MODE), "MODE@ACTIVE:LOITERING=true");
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let report = parse("LAT=1.0,LAT=2.0");
        assert_eq!(report.get(LAT), "2.0");
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_value_stops_at_line_break() {
        let report = parse("NAME=alpha\ntrailing,LAT=\nnothing");
        assert_eq!(report.get(NAME), "alpha");
        assert!(!report.contains(LAT));
    }

    #[test]
    fn test_carriage_return_is_kept() {
        let report = parse("NAME=alpha\r,TYPE=\r,LAT=1.5\r\nrest");
        assert_eq!(report.get(NAME), "alpha\r");
        assert!(report.contains(TYPE));
        assert_eq!(report.get(TYPE), "\r");
        assert_eq!(report.get(LAT), "1.5\r");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(parse("").is_empty());
        assert!(parse(",,,").is_empty());
        assert!(parse("=").is_empty());
        assert_eq!(parse("=orphan").get(""), "orphan");
    }

    #[test]
    fn test_node_report_fields() {
        let node = NodeReport::parse(
            "NAME=henry,X=10,Y=-4,SPD=1.2,HDG=90,TYPE=kayak,MODE=PARK,DEP=0.5,LAT=43.825,LON=-70.33,TIME=1252348077.59",
        );
        assert_eq!(node.name, "henry");
        assert_eq!(node.vehicle_type, "kayak");
        assert_eq!(node.lat, "43.825");
        assert_eq!(node.lon, "-70.33");
        assert_eq!(node.depth, "0.5");
        assert_eq!(node.mode, "PARK");
        assert_eq!(node.time, "1252348077.59");
    }

    #[test]
    fn test_node_report_defaults_to_empty() {
        assert_eq!(NodeReport::parse("junk"), NodeReport::default());
    }
}
