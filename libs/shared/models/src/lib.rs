pub mod auth;
pub mod error;
pub mod location;

pub use location::LocationType;
