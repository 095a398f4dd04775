use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlot(pub NaiveDateTime);

impl TimeSlot {
    // "Sunday, April 20th, 2025 at 10:00 AM"
    pub fn to_human_readable(&self) -> String {
        let dt = self.0;
        let day = dt.day();
        format!(
            "{}, {} {day}{}, {}",
            dt.format("%A"),
            dt.format("%B"),
            ordinal_suffix(day),
            dt.format("%Y at %-I:%M %p"),
        )
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub available: bool,
    pub is_exact_available: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_times: Vec<TimeSlot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    pub message: String,
}

impl AvailabilityResult {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            is_exact_available: false,
            suggested_times: Vec::new(),
            alternatives: Vec::new(),
            message: message.into(),
        }
    }

    pub fn exact_day(slots: Vec<TimeSlot>) -> Self {
        let alternatives: Vec<String> = slots.iter().map(TimeSlot::to_human_readable).collect();
        let message = format!(
            "The requested time is available for an appointment. We also have the following times available on the same day: {}",
            alternatives.join(", ")
        );
        Self {
            available: true,
            is_exact_available: true,
            suggested_times: slots,
            alternatives,
            message,
        }
    }

    pub fn nearby(slots: Vec<TimeSlot>) -> Self {
        if slots.is_empty() {
            return Self::unavailable(
                "Unfortunately, we don't have any available time slots in the next few days. Please try a different week.",
            );
        }

        let alternatives: Vec<String> = slots.iter().map(TimeSlot::to_human_readable).collect();
        let message = format!(
            "The requested time is not available. Here are some alternative times we can offer: {}",
            alternatives.join(", ")
        );
        Self {
            available: false,
            is_exact_available: false,
            suggested_times: slots,
            alternatives,
            message,
        }
    }
}
