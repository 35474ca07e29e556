pub mod availability;
pub mod reader;

pub use availability::{resolve_day, AvailabilityService};
pub use reader::{AvailabilityReader, StaticAvailability, SupabaseAvailability};
