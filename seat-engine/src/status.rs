//! Per-table status resolution

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Status shown for a table on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Selected,
    Reserved,
    /// Not offered by the latest availability and not known to be reserved
    Held,
}

impl TableStatus {
    /// Whether the guest can continue to booking with this table
    pub fn is_bookable(&self) -> bool {
        matches!(self, Self::Available | Self::Selected)
    }
}

/// Resolve the status of one table.
///
/// Precedence:
/// 1. the selected table is `Selected`, whatever else is known about it;
/// 2. a table in `occupied` is `Reserved`;
/// 3. a table in `available` is `Available`;
/// 4. when only availability is known, a table it leaves out is `Reserved`;
/// 5. anything else is `Held` (unknown, rather than actively reserved).
pub fn resolve(
    table_id: &str,
    selected: Option<&str>,
    available: Option<&HashSet<String>>,
    occupied: Option<&HashSet<String>>,
) -> TableStatus {
    if selected == Some(table_id) {
        return TableStatus::Selected;
    }
    if occupied.is_some_and(|ids| ids.contains(table_id)) {
        return TableStatus::Reserved;
    }
    match (available, occupied) {
        (Some(ids), _) if ids.contains(table_id) => TableStatus::Available,
        (Some(_), None) => TableStatus::Reserved,
        _ => TableStatus::Held,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_both_sets_known() {
        let available = set(&["t1"]);
        let occupied = set(&["t2"]);
        let r = |id| resolve(id, None, Some(&available), Some(&occupied));
        assert_eq!(r("t1"), TableStatus::Available);
        assert_eq!(r("t2"), TableStatus::Reserved);
        assert_eq!(r("unknown"), TableStatus::Held);
    }

    #[test]
    fn test_selection_wins() {
        let available = set(&["t1"]);
        let occupied = set(&["t2"]);
        assert_eq!(
            resolve("t2", Some("t2"), Some(&available), Some(&occupied)),
            TableStatus::Selected
        );
        assert_eq!(resolve("t9", Some("t9"), None, None), TableStatus::Selected);
    }

    #[test]
    fn test_availability_only() {
        let available = set(&["t1"]);
        assert_eq!(resolve("t1", None, Some(&available), None), TableStatus::Available);
        assert_eq!(resolve("t3", None, Some(&available), None), TableStatus::Reserved);
    }

    #[test]
    fn test_nothing_known_is_held() {
        assert_eq!(resolve("t1", None, None, None), TableStatus::Held);
        let occupied = set(&["t2"]);
        assert_eq!(resolve("t1", None, None, Some(&occupied)), TableStatus::Held);
        assert_eq!(resolve("t2", None, None, Some(&occupied)), TableStatus::Reserved);
    }

    #[test]
    fn test_occupied_beats_available() {
        let both = set(&["t1"]);
        assert_eq!(resolve("t1", None, Some(&both), Some(&both)), TableStatus::Reserved);
    }

    #[test]
    fn test_bookable_and_serde() {
        assert!(TableStatus::Available.is_bookable());
        assert!(TableStatus::Selected.is_bookable());
        assert!(!TableStatus::Reserved.is_bookable());
        assert!(!TableStatus::Held.is_bookable());
        assert_eq!(serde_json::to_string(&TableStatus::Held).unwrap(), "\"held\"");
    }
}
