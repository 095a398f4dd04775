use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{AvailabilityResult, TimeSlot};

const BUSINESS_HOURS: RangeInclusive<u32> = 9..=16;
const SLOT_MINUTES: [u32; 2] = [0, 30];
const NEIGHBOR_DAYS: RangeInclusive<i64> = -3..=3;
const MAX_SUGGESTIONS: usize = 5;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y at %I:%M %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%m/%d/%Y"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidDateInput {
    #[error("No date provided. Please specify a date and time for checking availability.")]
    Missing,
    #[error("Invalid date format. Please provide a valid date.")]
    Unparsable(String),
}

pub fn check_availability(input: Option<&str>) -> AvailabilityResult {
    match parse_requested(input) {
        Ok(requested) => check_availability_at(requested),
        Err(e) => {
            tracing::debug!(input = ?input, error = ?e, "unusable availability input");
            AvailabilityResult::unavailable(e.to_string())
        }
    }
}

pub fn check_availability_at(requested: NaiveDateTime) -> AvailabilityResult {
    let day = requested.date();
    let exact = slots_for_day(day);

    let result = if exact.is_empty() {
        AvailabilityResult::nearby(neighbor_slots(day))
    } else {
        AvailabilityResult::exact_day(exact)
    };

    tracing::debug!(
        %requested,
        available = result.available,
        suggestions = result.suggested_times.len(),
        "checked availability"
    );
    result
}

// RFC 3339 keeps the wall-clock time of its offset; bare dates mean midnight.
pub fn parse_requested(input: Option<&str>) -> Result<NaiveDateTime, InvalidDateInput> {
    let raw = input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(InvalidDateInput::Missing)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| InvalidDateInput::Unparsable(raw.to_string()))
}

fn day_seed(date: NaiveDate) -> u32 {
    date.day() + date.month() + date.year().rem_euclid(100) as u32
}

pub fn slots_for_day(date: NaiveDate) -> Vec<TimeSlot> {
    let seed = day_seed(date);
    if seed % 5 == 0 {
        return Vec::new();
    }

    let day = date.day();
    let limit = 3 + (seed % 3) as usize;

    BUSINESS_HOURS
        .filter(|hour| (hour + seed) % 3 != 0)
        .flat_map(|hour| SLOT_MINUTES.into_iter().map(move |minute| (hour, minute)))
        .filter(|(hour, minute)| !((minute + day) % 2 == 0 && hour % 2 == 1))
        .filter_map(|(hour, minute)| date.and_hms_opt(hour, minute, 0))
        .map(TimeSlot)
        .take(limit)
        .collect()
}

fn neighbor_slots(date: NaiveDate) -> Vec<TimeSlot> {
    let mut found = Vec::new();

    for offset in NEIGHBOR_DAYS.filter(|o| *o != 0) {
        let Some(neighbor) = date.checked_add_signed(Duration::days(offset)) else {
            continue;
        };
        found.extend(slots_for_day(neighbor));
        if found.len() >= MAX_SUGGESTIONS {
            break;
        }
    }

    found.sort();
    found.truncate(MAX_SUGGESTIONS);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn times(slots: &[TimeSlot]) -> Vec<String> {
        slots
            .iter()
            .map(|s| s.0.format("%m-%d %H:%M").to_string())
            .collect()
    }

    #[test]
    fn test_seed_uses_two_digit_year() {
        assert_eq!(day_seed(date("2025-04-20")), 49);
        assert_eq!(day_seed(date("1999-12-31")), 142);
    }

    #[test]
    fn test_slots_for_available_day() {
        // seed 49: hours 11 and 14 dropped, odd hours dropped on even days,
        // four slots kept
        let slots = slots_for_day(date("2025-04-20"));
        assert_eq!(
            times(&slots),
            vec!["04-20 10:00", "04-20 10:30", "04-20 12:00", "04-20 12:30"]
        );
    }

    #[test]
    fn test_odd_day_keeps_odd_hours() {
        // seed 42: hours 9, 12, 15 dropped, three slots kept
        let slots = slots_for_day(date("2025-04-13"));
        assert_eq!(times(&slots), vec!["04-13 10:00", "04-13 10:30", "04-13 11:00"]);
    }

    #[test]
    fn test_seed_divisible_by_five_closes_day() {
        assert!(slots_for_day(date("2025-04-16")).is_empty());
    }

    #[test]
    fn test_exact_day_available() {
        let result = check_availability(Some("2025-04-20T14:00:00"));
        assert!(result.available);
        assert!(result.is_exact_available);
        assert_eq!(result.suggested_times.len(), 4);
        assert_eq!(result.alternatives[0], "Sunday, April 20th, 2025 at 10:00 AM");
        assert_eq!(result.alternatives[3], "Sunday, April 20th, 2025 at 12:30 PM");
        assert!(result
            .message
            .starts_with("The requested time is available for an appointment."));
        assert!(result.message.contains("Sunday, April 20th, 2025 at 10:00 AM"));
    }

    #[test]
    fn test_closed_day_offers_neighbors() {
        let result = check_availability(Some("2025-04-16T09:00:00"));
        assert!(!result.available);
        assert!(!result.is_exact_available);
        assert_eq!(
            times(&result.suggested_times),
            vec![
                "04-13 10:00",
                "04-13 10:30",
                "04-13 11:00",
                "04-14 10:00",
                "04-14 10:30",
            ]
        );
        assert!(result
            .message
            .starts_with("The requested time is not available."));
        assert!(result.message.contains("Sunday, April 13th, 2025 at 10:00 AM"));
    }

    #[test]
    fn test_neighbors_cross_month_boundary() {
        let result = check_availability(Some("2025-04-01"));
        assert!(!result.is_exact_available);
        assert_eq!(
            times(&result.suggested_times),
            vec![
                "03-29 10:00",
                "03-29 10:30",
                "03-29 11:00",
                "03-30 10:00",
                "03-30 10:30",
            ]
        );
        assert_eq!(
            result.alternatives[0],
            "Saturday, March 29th, 2025 at 10:00 AM"
        );
    }

    #[test]
    fn test_same_input_same_answer() {
        for input in ["2025-04-20T14:00:00", "2025-04-16", "2025-12-31T23:59:00"] {
            assert_eq!(check_availability(Some(input)), check_availability(Some(input)));
        }
    }

    #[test]
    fn test_missing_input_is_not_an_error() {
        for input in [None, Some(""), Some("   ")] {
            let result = check_availability(input);
            assert!(!result.available);
            assert!(result.suggested_times.is_empty());
            assert_eq!(
                result.message,
                "No date provided. Please specify a date and time for checking availability."
            );
        }
    }

    #[test]
    fn test_garbage_input_is_not_an_error() {
        let result = check_availability(Some("next blue moon"));
        assert!(!result.available);
        assert_eq!(
            result.message,
            "Invalid date format. Please provide a valid date."
        );
        assert_eq!(
            parse_requested(Some("next blue moon")),
            Err(InvalidDateInput::Unparsable("next blue moon".to_string()))
        );
    }

    #[test]
    fn test_parse_accepts_common_shapes() {
        let expected = NaiveDateTime::parse_from_str("2025-04-20 14:00", "%Y-%m-%d %H:%M").unwrap();
        for input in [
            "2025-04-20T14:00:00",
            "2025-04-20T14:00",
            "2025-04-20T14:00:00.000",
            "2025-04-20 14:00",
            "2025-04-20T14:00:00-07:00",
            "2025-04-20T14:00:00Z",
            "2025-04-20 2:00 PM",
            "April 20, 2025 2:00 PM",
            "April 20, 2025 at 2:00 pm",
            "04/20/2025 02:00 PM",
        ] {
            assert_eq!(parse_requested(Some(input)), Ok(expected), "{input}");
        }

        let midnight = expected.date().and_time(NaiveTime::MIN);
        assert_eq!(parse_requested(Some("2025-04-20")), Ok(midnight));
        assert_eq!(parse_requested(Some("April 20, 2025")), Ok(midnight));
        assert_eq!(parse_requested(Some("04/20/2025")), Ok(midnight));
    }

    #[test]
    fn test_slot_count_stays_in_range() {
        let start = date("2025-01-01");
        for offset in 0..366 {
            let day = start + Duration::days(offset);
            let slots = slots_for_day(day);
            if day_seed(day) % 5 == 0 {
                assert!(slots.is_empty());
            } else {
                assert!((3..=5).contains(&slots.len()), "{day}: {}", slots.len());
                assert!(slots.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
