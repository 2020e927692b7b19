//! Entitlement helpers for the application catalog
//!
//! Translates identity-provider application ids into catalog ids and splits
//! the catalog into the tiles a tenant can open and the ones to upsell.

use std::collections::{HashMap, HashSet};

use super::models::AppDescriptor;

/// Map provider application ids to catalog ids
///
/// Ids with no matching `app_id` in the catalog are dropped. Order follows
/// `provider_ids`.
pub fn map_to_catalog_ids(provider_ids: &[String], catalog: &[AppDescriptor]) -> Vec<String> {
    let by_app_id: HashMap<&str, &str> = catalog
        .iter()
        .map(|app| (app.app_id.as_str(), app.id.as_str()))
        .collect();

    provider_ids
        .iter()
        .filter_map(|provider_id| {
            let mapped = by_app_id.get(provider_id.as_str());
            if mapped.is_none() {
                tracing::debug!(app_id = %provider_id, "Dropping entitlement with no catalog entry");
            }
            mapped.map(|id| id.to_string())
        })
        .collect()
}

/// Split the catalog into (assigned, unassigned), preserving catalog order
pub fn partition_catalog(
    catalog: &[AppDescriptor],
    assigned_ids: &[String],
) -> (Vec<AppDescriptor>, Vec<AppDescriptor>) {
    let assigned_set = build_id_set(assigned_ids);
    catalog
        .iter()
        .cloned()
        .partition(|app| assigned_set.contains(app.id.as_str()))
}

/// Build a HashSet of ids from a slice for efficient lookups
pub fn build_id_set(ids: &[String]) -> HashSet<&str> {
    ids.iter().map(|s| s.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, app_id: &str) -> AppDescriptor {
        AppDescriptor {
            id: id.to_string(),
            app_id: app_id.to_string(),
            name: id.to_uppercase(),
            description: format!("{} application", id),
            url: format!("https://{}.example.com", id),
            icon: "📱".to_string(),
            color: "from-gray-500 to-gray-600".to_string(),
        }
    }

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_map_to_catalog_ids_translates_known_ids() {
        let catalog = vec![app("travel", "fe-travel"), app("fintech", "fe-fintech")];
        let mapped = map_to_catalog_ids(&ids(&["fe-fintech", "fe-travel"]), &catalog);
        assert_eq!(mapped, vec!["fintech", "travel"]);
    }

    #[test]
    fn test_map_to_catalog_ids_drops_unknown_ids() {
        let catalog = vec![app("travel", "fe-travel")];
        let mapped = map_to_catalog_ids(&ids(&["fe-unknown", "fe-travel", "travel"]), &catalog);
        // "travel" is a catalog id, not a provider id, so it does not match either
        assert_eq!(mapped, vec!["travel"]);
        assert_eq!(mapped.len(), 1);
    }

    #[test]
    fn test_map_to_catalog_ids_empty_catalog() {
        assert!(map_to_catalog_ids(&ids(&["fe-travel"]), &[]).is_empty());
    }

    #[test]
    fn test_partition_catalog_preserves_catalog_order() {
        let catalog = vec![
            app("travel", "a"),
            app("fintech", "b"),
            app("biopharma", "c"),
            app("logistics", "d"),
        ];
        let (assigned, unassigned) = partition_catalog(&catalog, &ids(&["logistics", "travel"]));

        let assigned_ids: Vec<&str> = assigned.iter().map(|a| a.id.as_str()).collect();
        let unassigned_ids: Vec<&str> = unassigned.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(assigned_ids, vec!["travel", "logistics"]);
        assert_eq!(unassigned_ids, vec!["fintech", "biopharma"]);
    }

    #[test]
    fn test_partition_catalog_nothing_assigned() {
        let catalog = vec![app("travel", "a"), app("fintech", "b")];
        let (assigned, unassigned) = partition_catalog(&catalog, &[]);
        assert!(assigned.is_empty());
        assert_eq!(unassigned.len(), 2);
    }

    #[test]
    fn test_build_id_set() {
        let v = ids(&["travel", "fintech"]);
        let set = build_id_set(&v);
        assert!(set.contains("travel"));
        assert!(!set.contains("logistics"));
    }
}
