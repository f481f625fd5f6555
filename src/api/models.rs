//! Typed shapes for the transit query API
//!
//! Response structs are deliberately lenient: every field defaults so that a
//! well-formed-but-empty body parses to an empty result instead of an error.

use serde::{Deserialize, Serialize};

/// Route direction flag: 0 = forward, 1 = return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Direction {
    Outbound,
    Inbound,
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> u8 {
        match direction {
            Direction::Outbound => 0,
            Direction::Inbound => 1,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Outbound),
            1 => Ok(Direction::Inbound),
            other => Err(format!("Invalid direction: {}", other)),
        }
    }
}

impl Direction {
    /// Value used in query strings
    pub fn as_query(self) -> &'static str {
        match self {
            Direction::Outbound => "0",
            Direction::Inbound => "1",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Direction::Outbound => Direction::Inbound,
            Direction::Inbound => Direction::Outbound,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Outbound => "forward",
            Direction::Inbound => "return",
        }
    }
}

/// Schedule variant: weekday or weekend service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// Value used in query strings and favorite ids
    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            DayType::Weekday => DayType::Weekend,
            DayType::Weekend => DayType::Weekday,
        }
    }

    /// Day type matching a calendar weekday
    pub fn for_weekday(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Sat | chrono::Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }
}

/// A transit route as returned by `GET /api/routes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Route identifier in the backing feed
    #[serde(default)]
    pub route_id: String,
    /// Route number shown to riders (e.g. "12")
    #[serde(default)]
    pub route_short_name: String,
    /// Full route name (terminus to terminus)
    #[serde(default)]
    pub route_long_name: String,
}

/// A stop on a route, in travel order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub stop_name: String,
    #[serde(default)]
    pub stop_id: String,
    #[serde(default)]
    pub stop_lat: Option<f64>,
    #[serde(default)]
    pub stop_lon: Option<f64>,
}

/// Per-hour headway statistics for a stop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalStats {
    /// Hours of the day covered by the arrays below
    #[serde(default)]
    pub hours: Vec<u32>,
    /// Shortest interval between departures for each hour, in minutes
    #[serde(default)]
    pub min_intervals: Vec<f64>,
    /// Longest interval between departures for each hour, in minutes
    #[serde(default)]
    pub max_intervals: Vec<f64>,
}

impl IntervalStats {
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

/// End-to-end trip duration statistics for a route and direction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripDurations {
    /// Average trip duration in minutes
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    /// Number of trips behind the statistics
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub trips: Vec<TripDuration>,
}

/// A single trip's departure time and duration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripDuration {
    /// Departure time from the first stop, "HH:MM"
    #[serde(default)]
    pub first_time: String,
    /// Trip duration in minutes
    #[serde(default)]
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Direction::Outbound).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Direction::Inbound).unwrap(), "1");
    }

    #[test]
    fn test_direction_deserializes_from_integer() {
        assert_eq!(
            serde_json::from_str::<Direction>("0").unwrap(),
            Direction::Outbound
        );
        assert_eq!(
            serde_json::from_str::<Direction>("1").unwrap(),
            Direction::Inbound
        );
        assert!(serde_json::from_str::<Direction>("2").is_err());
    }

    #[test]
    fn test_day_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DayType::Weekday).unwrap(),
            "\"weekday\""
        );
        assert_eq!(
            serde_json::from_str::<DayType>("\"weekend\"").unwrap(),
            DayType::Weekend
        );
    }

    #[test]
    fn test_toggles() {
        assert_eq!(Direction::Outbound.toggle(), Direction::Inbound);
        assert_eq!(DayType::Weekend.toggle(), DayType::Weekday);
    }

    #[test]
    fn test_day_type_for_weekday() {
        assert_eq!(
            DayType::for_weekday(chrono::Weekday::Mon),
            DayType::Weekday
        );
        assert_eq!(
            DayType::for_weekday(chrono::Weekday::Sat),
            DayType::Weekend
        );
        assert_eq!(
            DayType::for_weekday(chrono::Weekday::Sun),
            DayType::Weekend
        );
    }

    #[test]
    fn test_route_parses_with_missing_fields() {
        let route: Route = serde_json::from_str("{\"route_short_name\":\"12\"}").unwrap();

        assert_eq!(route.route_short_name, "12");
        assert_eq!(route.route_long_name, "");
        assert_eq!(route.route_id, "");
    }

    #[test]
    fn test_stop_parses_without_coordinates() {
        let stop: Stop = serde_json::from_str("{\"stop_name\":\"Main St\"}").unwrap();

        assert_eq!(stop.stop_name, "Main St");
        assert!(stop.stop_lat.is_none());
        assert!(stop.stop_lon.is_none());
    }

    #[test]
    fn test_interval_stats_default_is_empty() {
        let stats: IntervalStats = serde_json::from_str("{}").unwrap();

        assert!(stats.is_empty());
        assert!(stats.min_intervals.is_empty());
    }

    #[test]
    fn test_trip_durations_parse() {
        let json = r#"{
            "average": 45.5,
            "min": 38,
            "max": 60,
            "count": 2,
            "trips": [
                {"first_time": "06:00", "duration": 45},
                {"first_time": "06:20", "duration": 46}
            ]
        }"#;

        let durations: TripDurations = serde_json::from_str(json).unwrap();

        assert!((durations.average - 45.5).abs() < 0.01);
        assert_eq!(durations.count, 2);
        assert_eq!(durations.trips.len(), 2);
        assert_eq!(durations.trips[0].first_time, "06:00");
    }
}
