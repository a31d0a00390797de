//! Name search over an in-memory inventory list.

use crate::item::InventoryItem;

/// Items whose name contains `query`, ignoring case, in their original order.
///
/// An empty query returns the full list.
pub fn filter_by_name(items: &[InventoryItem], query: &str) -> Vec<InventoryItem> {
    if query.is_empty() {
        return items.to_vec();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<InventoryItem> {
        names.iter().map(|n| InventoryItem::new(*n)).collect()
    }

    fn names(items: &[InventoryItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn substring_match() {
        let all = items(&["Apple", "banana", "Cherry"]);
        assert_eq!(names(&filter_by_name(&all, "an")), vec!["banana"]);
    }

    #[test]
    fn empty_query_returns_all() {
        let all = items(&["Apple", "banana", "Cherry"]);
        assert_eq!(filter_by_name(&all, ""), all);
    }

    #[test]
    fn case_insensitive() {
        let all = items(&["Apple", "banana", "Cherry"]);
        assert_eq!(names(&filter_by_name(&all, "APP")), vec!["Apple"]);
        assert_eq!(names(&filter_by_name(&all, "rR")), vec!["Cherry"]);
    }

    #[test]
    fn matches_name_only() {
        let mut item = InventoryItem::new("Bolt");
        item.description = Some("steel fastener".into());
        assert!(filter_by_name(&[item], "steel").is_empty());
    }

    #[test]
    fn keeps_order_of_matches() {
        let all = items(&["tape", "Stapler", "paper", "TAPE measure"]);
        assert_eq!(
            names(&filter_by_name(&all, "tap")),
            vec!["tape", "Stapler", "TAPE measure"]
        );
    }
}
