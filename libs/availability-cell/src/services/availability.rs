// libs/availability-cell/src/services/availability.rs
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::debug;

use shared_models::LocationType;

use crate::models::{AvailabilityError, DayAvailability, RegularAvailability, SpecialDate, TimeWindow};
use crate::services::reader::AvailabilityReader;

pub struct AvailabilityService {
    reader: Arc<dyn AvailabilityReader>,
}

impl AvailabilityService {
    pub fn new(reader: Arc<dyn AvailabilityReader>) -> Self {
        Self { reader }
    }

    /// Working windows for one date and location type, overrides applied.
    pub async fn day_availability(
        &self,
        date: NaiveDate,
        location_type: LocationType,
    ) -> Result<DayAvailability, AvailabilityError> {
        debug!("Resolving availability for {} ({})", date, location_type);

        let regular = self.reader.regular_availability(location_type).await?;
        let special = self.reader.special_dates(date).await?;

        Ok(resolve_day(date, location_type, &regular, &special))
    }
}

/// Special dates for the day win over the weekly schedule. A blocked entry
/// closes the day; otherwise their custom hours replace the regular windows.
pub fn resolve_day(
    date: NaiveDate,
    location_type: LocationType,
    regular: &[RegularAvailability],
    special: &[SpecialDate],
) -> DayAvailability {
    let overrides: Vec<&SpecialDate> = special
        .iter()
        .filter(|s| s.date == date && s.applies_to(location_type))
        .collect();

    if let Some(blackout) = overrides.iter().find(|s| s.is_blocked) {
        return DayAvailability {
            date,
            location_type,
            blocked: true,
            reason: blackout.reason.clone(),
            windows: Vec::new(),
        };
    }

    let mut windows: Vec<TimeWindow> = if overrides.is_empty() {
        let weekday = date.weekday().num_days_from_sunday();
        regular
            .iter()
            .filter(|r| r.is_active && r.location_type == location_type && r.day_of_week == weekday)
            .filter(|r| r.start_time < r.end_time)
            .map(|r| TimeWindow { start: r.start_time, end: r.end_time })
            .collect()
    } else {
        overrides
            .iter()
            .filter_map(|s| match (s.start_time, s.end_time) {
                (Some(start), Some(end)) if start < end => Some(TimeWindow { start, end }),
                _ => None,
            })
            .collect()
    };

    windows.sort_by_key(|w| w.start);
    windows.dedup();

    DayAvailability {
        date,
        location_type,
        blocked: false,
        reason: overrides.iter().find_map(|s| s.reason.clone()),
        windows,
    }
}
