use std::collections::HashMap;

use crate::app::Result;
use crate::domain::{OrderedSource, SourceDescriptor, TriState};
use crate::store::PreferenceStore;

/// Resolve each source against the user's choices and move enabled sources
/// ahead of disabled ones. Catalog order is kept within each group.
pub fn order_sources(
    descriptors: Vec<SourceDescriptor>,
    preferences: &HashMap<String, TriState>,
) -> Vec<OrderedSource> {
    let (mut enabled, disabled): (Vec<_>, Vec<_>) = descriptors
        .into_iter()
        .map(|descriptor| {
            let choice = preferences
                .get(&descriptor.name)
                .copied()
                .unwrap_or_default();
            let enabled = choice.resolve(descriptor.is_enabled_by_default);
            OrderedSource {
                descriptor,
                enabled,
            }
        })
        .partition(|source| source.enabled);

    enabled.extend(disabled);
    enabled
}

pub async fn order_with_store(
    descriptors: Vec<SourceDescriptor>,
    store: &PreferenceStore,
) -> Result<Vec<OrderedSource>> {
    let preferences = store.snapshot().await?;
    Ok(order_sources(descriptors, &preferences))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, default: bool) -> SourceDescriptor {
        SourceDescriptor::new(name, format!("http://{name}.example/?limit=10&offset=0"), default)
    }

    fn summary(ordered: &[OrderedSource]) -> Vec<(&str, bool)> {
        ordered.iter().map(|s| (s.name(), s.enabled)).collect()
    }

    #[test]
    fn test_defaults_only() {
        let ordered = order_sources(vec![source("A", true), source("B", false)], &HashMap::new());
        assert_eq!(summary(&ordered), vec![("A", true), ("B", false)]);
    }

    #[test]
    fn test_disabling_a_default_source() {
        let prefs = HashMap::from([("A".to_string(), TriState::Disabled)]);
        let ordered = order_sources(vec![source("A", true), source("B", false)], &prefs);
        assert_eq!(summary(&ordered), vec![("A", false), ("B", false)]);
    }

    #[test]
    fn test_user_enabled_moves_ahead() {
        let prefs = HashMap::from([("C".to_string(), TriState::Enabled)]);
        let ordered = order_sources(
            vec![source("A", false), source("B", true), source("C", false)],
            &prefs,
        );
        assert_eq!(
            summary(&ordered),
            vec![("B", true), ("C", true), ("A", false)]
        );
    }

    #[test]
    fn test_partition_is_stable() {
        let prefs = HashMap::from([
            ("d2".to_string(), TriState::Disabled),
            ("e3".to_string(), TriState::Enabled),
        ]);
        let catalog = vec![
            source("d1", false),
            source("e1", true),
            source("d2", true),
            source("e2", true),
            source("d3", false),
            source("e3", false),
        ];
        let ordered = order_sources(catalog, &prefs);
        assert_eq!(
            summary(&ordered),
            vec![
                ("e1", true),
                ("e2", true),
                ("e3", true),
                ("d1", false),
                ("d2", false),
                ("d3", false),
            ]
        );
    }

    #[test]
    fn test_empty_catalog() {
        assert!(order_sources(Vec::new(), &HashMap::new()).is_empty());
    }

    #[tokio::test]
    async fn test_order_with_store() {
        use std::sync::Arc;

        use crate::store::SqliteStore;

        let store = PreferenceStore::new(Arc::new(SqliteStore::in_memory().unwrap()));
        store.set_enabled("B").await.unwrap();
        let ordered = order_with_store(vec![source("A", false), source("B", false)], &store)
            .await
            .unwrap();
        assert_eq!(summary(&ordered), vec![("B", true), ("A", false)]);
    }
}
