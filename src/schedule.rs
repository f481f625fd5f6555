//! Next-departure computation over transit-day time
//!
//! Moscow surface transit operates on a transit day running 04:00 to 03:59
//! the next calendar day. Overnight departures (hour < 4) belong to the
//! previous transit day for ordering, so both the current time and such
//! schedule entries are shifted by 24 hours of minutes before comparison.
//! The current time is always an explicit parameter, keeping the computation
//! pure and the tests deterministic.

use chrono::{NaiveTime, Timelike};

/// Hour at which the transit day starts
pub const TRANSIT_DAY_START_HOUR: u32 = 4;

/// The next upcoming departure from a stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextDeparture {
    /// Departure time as "HH:MM", truncated to the minute
    pub time: String,
    /// Minutes until departure
    pub diff_min: u32,
}

/// Computes the next departure after `now` from a list of "HH:MM[:SS]" times.
///
/// The schedule may be unordered; entries that do not parse are skipped.
/// Returns `None` when no entry lies after `now` under transit-day
/// normalization, i.e. there are no more departures this transit day.
pub fn next_departure(times: &[String], now: NaiveTime) -> Option<NextDeparture> {
    let normalized_now = normalize_minutes(now.hour(), now.minute());

    let mut departures: Vec<(String, u32)> = times
        .iter()
        .filter_map(|raw| {
            let (hour, minute) = parse_hhmm(raw)?;
            let display = format!("{:02}:{:02}", hour % 24, minute);
            Some((display, normalize_minutes(hour, minute)))
        })
        .collect();
    departures.sort_by_key(|&(_, total)| total);

    departures
        .into_iter()
        .find(|&(_, total)| total > normalized_now)
        .map(|(time, total)| NextDeparture {
            time,
            diff_min: total - normalized_now,
        })
}

/// Minutes since midnight, shifted past the day boundary for overnight hours.
fn normalize_minutes(hour: u32, minute: u32) -> u32 {
    let total = hour * 60 + minute;
    if hour < TRANSIT_DAY_START_HOUR {
        total + 24 * 60
    } else {
        total
    }
}

/// Parses "HH:MM" or "HH:MM:SS", truncating seconds.
///
/// GTFS-derived schedules may carry hours of 24 and beyond for trips crossing
/// midnight; those are accepted as already lying past the day boundary.
fn parse_hhmm(raw: &str) -> Option<(u32, u32)> {
    let mut parts = raw.split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next()?.trim().parse().ok()?;
    if hour >= 30 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn times(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_overnight_departure_after_late_evening() {
        // 00:10 normalizes to 1450 min, 23:55 to 1435 min
        let schedule = times(&["23:50", "00:10", "02:00"]);

        let next = next_departure(&schedule, at(23, 55)).expect("Should find departure");

        assert_eq!(next.time, "00:10");
        assert_eq!(next.diff_min, 15);
    }

    #[test]
    fn test_empty_schedule_returns_none() {
        assert!(next_departure(&[], at(23, 0)).is_none());
    }

    #[test]
    fn test_no_later_departure_returns_none() {
        // 05:00 is earlier in the transit day than 23:00
        let schedule = times(&["05:00"]);

        assert!(next_departure(&schedule, at(23, 0)).is_none());
    }

    #[test]
    fn test_unsorted_schedule_is_ordered_before_search() {
        let schedule = times(&["12:00", "09:15", "18:45", "07:30"]);

        let next = next_departure(&schedule, at(8, 0)).expect("Should find departure");

        assert_eq!(next.time, "09:15");
        assert_eq!(next.diff_min, 75);
    }

    #[test]
    fn test_seconds_are_truncated() {
        let schedule = times(&["05:00:30"]);

        let next = next_departure(&schedule, at(4, 30)).expect("Should find departure");

        assert_eq!(next.time, "05:00");
        assert_eq!(next.diff_min, 30);
    }

    #[test]
    fn test_departure_at_exactly_now_is_skipped() {
        // Strictly later departures only
        let schedule = times(&["10:00", "10:20"]);

        let next = next_departure(&schedule, at(10, 0)).expect("Should find departure");

        assert_eq!(next.time, "10:20");
        assert_eq!(next.diff_min, 20);
    }

    #[test]
    fn test_early_morning_now_is_normalized() {
        // At 00:30 both now and the 01:00 entry shift by 1440
        let schedule = times(&["01:00", "23:00"]);

        let next = next_departure(&schedule, at(0, 30)).expect("Should find departure");

        assert_eq!(next.time, "01:00");
        assert_eq!(next.diff_min, 30);
    }

    #[test]
    fn test_unparseable_entries_are_skipped() {
        let schedule = times(&["garbage", "25:99", "10:15"]);

        let next = next_departure(&schedule, at(10, 0)).expect("Should find departure");

        assert_eq!(next.time, "10:15");
    }

    #[test]
    fn test_gtfs_hour_past_midnight_is_accepted() {
        // GTFS encodes 00:10 on the next calendar day as 24:10
        let schedule = times(&["24:10"]);

        let next = next_departure(&schedule, at(23, 55)).expect("Should find departure");

        assert_eq!(next.time, "00:10");
        assert_eq!(next.diff_min, 15);
    }

    #[test]
    fn test_picks_soonest_of_multiple_upcoming() {
        let schedule = times(&["22:00", "23:50", "00:10"]);

        let next = next_departure(&schedule, at(21, 45)).expect("Should find departure");

        assert_eq!(next.time, "22:00");
        assert_eq!(next.diff_min, 15);
    }
}
