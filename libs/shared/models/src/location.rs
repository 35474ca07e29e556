use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the service is delivered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Studio,
    Home,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Studio => "STUDIO",
            LocationType::Home => "HOME",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
