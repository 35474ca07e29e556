// libs/availability-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_models::LocationType;

// ==============================================================================
// STORED SCHEDULE ROWS
// ==============================================================================

/// Weekly recurring window. `day_of_week` runs 0 (Sunday) to 6 (Saturday).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegularAvailability {
    pub id: String,
    pub day_of_week: u32,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    pub location_type: LocationType,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Date-specific override: either a blackout or custom hours.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecialDate {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default, with = "clock::option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "clock::option")]
    pub end_time: Option<NaiveTime>,
    /// `None` applies to both studio and home bookings.
    pub location_type: Option<LocationType>,
    pub reason: Option<String>,
}

impl SpecialDate {
    pub fn applies_to(&self, location_type: LocationType) -> bool {
        self.location_type.map_or(true, |lt| lt == location_type)
    }
}

fn default_active() -> bool {
    true
}

// ==============================================================================
// RESOLVED VIEW
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    #[serde(with = "clock")]
    pub start: NaiveTime,
    #[serde(with = "clock")]
    pub end: NaiveTime,
}

impl TimeWindow {
    /// The "HH:MM - HH:MM" form appointments are booked with.
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub location_type: LocationType,
    pub blocked: bool,
    pub reason: Option<String>,
    pub windows: Vec<TimeWindow>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Availability unavailable: {0}")]
    Unavailable(String),

    #[error("Availability data could not be parsed: {0}")]
    InvalidData(String),
}

/// Wall-clock times stored as "HH:MM" or "HH:MM:SS".
pub(crate) mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", raw)))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", raw))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_accept_both_clock_formats() {
        let regular: RegularAvailability = serde_json::from_value(json!({
            "id": "r1",
            "dayOfWeek": 6,
            "startTime": "08:00:00",
            "endTime": "13:00",
            "locationType": "STUDIO"
        })).unwrap();

        assert_eq!(regular.start_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(regular.end_time, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
        assert!(regular.is_active);
    }

    #[test]
    fn test_special_date_without_hours() {
        let special: SpecialDate = serde_json::from_value(json!({
            "id": "s1",
            "date": "2025-12-25",
            "isBlocked": true,
            "startTime": null,
            "locationType": null,
            "reason": "Navidad"
        })).unwrap();

        assert!(special.is_blocked);
        assert_eq!(special.start_time, None);
        assert!(special.applies_to(LocationType::Home));
        assert!(special.applies_to(LocationType::Studio));
    }

    #[test]
    fn test_window_label() {
        let window = TimeWindow {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        };
        assert_eq!(window.label(), "09:00 - 13:00");
        assert_eq!(serde_json::to_value(window).unwrap(), json!({ "start": "09:00", "end": "13:00" }));
    }
}
