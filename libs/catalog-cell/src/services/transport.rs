use crate::models::TransportCost;

/// Case-insensitive exact match on the district name among active entries.
pub fn find_transport_cost<'a>(table: &'a [TransportCost], district: &str) -> Option<&'a TransportCost> {
    let wanted = district.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    table
        .iter()
        .filter(|entry| entry.is_active)
        .find(|entry| entry.district.trim().to_lowercase() == wanted)
}
