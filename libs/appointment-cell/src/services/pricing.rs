// libs/appointment-cell/src/services/pricing.rs
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

use catalog_cell::{find_transport_cost, Service, TransportCost};
use shared_config::AppConfig;
use shared_models::LocationType;

use crate::models::{PricingBreakdown, PricingError, SelectedService, ServiceSelection};

const DEFAULT_SURCHARGE: i64 = 20;

/// Late-hours surcharge. The window is `[start_hour, end_hour)` and wraps past
/// midnight when `end_hour < start_hour`. Equal hours disable the surcharge.
#[derive(Debug, Clone, PartialEq)]
pub struct NightShiftPolicy {
    pub start_hour: u32,
    pub end_hour: u32,
    pub surcharge: Decimal,
}

impl Default for NightShiftPolicy {
    fn default() -> Self {
        Self {
            start_hour: 20,
            end_hour: 24,
            surcharge: Decimal::from(DEFAULT_SURCHARGE),
        }
    }
}

impl NightShiftPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        let surcharge = Decimal::from_str(config.night_shift_surcharge.trim())
            .ok()
            .filter(|amount| !amount.is_sign_negative())
            .unwrap_or_else(|| {
                warn!(
                    "NIGHT_SHIFT_SURCHARGE '{}' is not a valid amount, using {}",
                    config.night_shift_surcharge, DEFAULT_SURCHARGE
                );
                Decimal::from(DEFAULT_SURCHARGE)
            });

        Self {
            start_hour: config.night_shift_start_hour,
            end_hour: config.night_shift_end_hour,
            surcharge,
        }
    }

    pub fn covers(&self, hour: u32) -> bool {
        if self.start_hour < self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else if self.start_hour > self.end_hour {
            hour >= self.start_hour || hour < self.end_hour
        } else {
            false
        }
    }

    /// Never fails: an unreadable time range simply carries no surcharge.
    pub fn night_shift_cost(&self, time_range: &str) -> Decimal {
        match parse_start_hour(time_range) {
            Some(hour) if self.covers(hour) => self.surcharge,
            Some(_) => Decimal::ZERO,
            None => {
                debug!("Could not read start hour from '{}', no night surcharge", time_range);
                Decimal::ZERO
            }
        }
    }
}

/// Hour (0-23) of the start component of a `"start - end"` range. Accepts
/// `"09:00"`, `"21:30"`, `"9:00 PM"`, `"9pm"` and `"12:00 AM"`.
pub fn parse_start_hour(time_range: &str) -> Option<u32> {
    let start = time_range.split('-').next()?.trim().to_ascii_lowercase();

    let (clock, meridiem) = if let Some(rest) = start.strip_suffix("am") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = start.strip_suffix("pm") {
        (rest.trim_end(), Some(true))
    } else {
        (start.as_str(), None)
    };

    let mut parts = clock.splitn(2, ':');
    let hour_part = parts.next()?;
    if hour_part.is_empty() || hour_part.len() > 2 || !hour_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hour_part.parse().ok()?;

    if let Some(minutes) = parts.next() {
        if minutes.len() != 2 || !minutes.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if minutes.parse::<u32>().ok()? > 59 {
            return None;
        }
    }

    match meridiem {
        None if hour <= 23 => Some(hour),
        None => None,
        Some(_) if !(1..=12).contains(&hour) => None,
        Some(false) => Some(hour % 12),
        Some(true) => Some(hour % 12 + 12),
    }
}

pub struct PricingEngine {
    night_shift: NightShiftPolicy,
}

impl PricingEngine {
    pub fn new(night_shift: NightShiftPolicy) -> Self {
        Self { night_shift }
    }

    pub fn night_shift(&self) -> &NightShiftPolicy {
        &self.night_shift
    }

    /// Prices a selection against the current catalog. Any unknown or inactive
    /// service id rejects the whole selection.
    pub fn price(
        &self,
        selection: &ServiceSelection,
        catalog: &[Service],
        location_type: LocationType,
        district: Option<&str>,
        time_range: &str,
        transport_costs: &[TransportCost],
    ) -> Result<PricingBreakdown, PricingError> {
        let by_id: HashMap<&str, &Service> = catalog
            .iter()
            .filter(|s| s.is_active)
            .map(|s| (s.id.as_str(), s))
            .collect();

        let mut line_items = Vec::new();
        let mut service_price = Decimal::ZERO;
        let mut total_duration: i32 = 0;

        for (service_id, &quantity) in selection.iter().filter(|&(_, &qty)| qty > 0) {
            let service = by_id
                .get(service_id.as_str())
                .ok_or_else(|| PricingError::UnknownService(service_id.clone()))?;

            let line = SelectedService {
                id: service.id.clone(),
                name: service.name.clone(),
                price: service.price,
                duration: service.duration,
                category: service.category,
                quantity,
            };

            let overflow = || PricingError::QuantityOverflow(service_id.clone());
            let line_price = line.line_price().ok_or_else(overflow)?;
            service_price = service_price.checked_add(line_price).ok_or_else(overflow)?;
            total_duration = line
                .line_duration()
                .and_then(|minutes| total_duration.checked_add(minutes))
                .ok_or_else(overflow)?;
            line_items.push(line);
        }

        if line_items.is_empty() {
            return Err(PricingError::EmptySelection);
        }

        let night_shift_cost = self.night_shift.night_shift_cost(time_range);

        let transport_cost = match (location_type, district) {
            (LocationType::Home, Some(district)) => find_transport_cost(transport_costs, district)
                .map(|entry| entry.cost)
                .unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        };

        let total_price = service_price + transport_cost + night_shift_cost;

        debug!(
            "Priced {} line(s): services {} + transport {} + night {} = {} ({} min)",
            line_items.len(), service_price, transport_cost, night_shift_cost, total_price, total_duration
        );

        Ok(PricingBreakdown {
            service_price,
            transport_cost,
            night_shift_cost,
            total_price,
            total_duration,
            line_items,
        })
    }
}
