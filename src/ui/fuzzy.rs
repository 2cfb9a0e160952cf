//! Node search for the sidebar list.
//!
//! Uses `fuzzy-matcher` (skim algorithm) against node labels and ids. The list
//! stays sorted by label; the query only filters it.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::core::graph::Node;

/// Nodes sorted by label (id breaks ties), keeping only fuzzy matches of `query`.
pub fn search_nodes<'a>(nodes: &'a [Node], query: &str) -> Vec<&'a Node> {
    let query = query.trim();
    let matcher = SkimMatcherV2::default();
    let mut hits: Vec<&Node> = nodes
        .iter()
        .filter(|n| {
            query.is_empty()
                || matcher.fuzzy_match(&n.label, query).is_some()
                || matcher.fuzzy_match(&n.id, query).is_some()
        })
        .collect();
    hits.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, label: &str) -> Node {
        Node {
            id: id.to_string(),
            label: label.to_string(),
            value: 0.0,
            category: "c".to_string(),
        }
    }

    fn labels(nodes: Vec<&Node>) -> Vec<&str> {
        nodes.into_iter().map(|n| n.label.as_str()).collect()
    }

    #[test]
    fn empty_query_lists_everything_by_label() {
        let nodes = vec![node("1", "Smoking"), node("2", "Cancer"), node("3", "Age")];
        assert_eq!(labels(search_nodes(&nodes, "  ")), vec!["Age", "Cancer", "Smoking"]);
    }

    #[test]
    fn query_filters_fuzzily() {
        let nodes = vec![
            node("1", "Smoking"),
            node("2", "Lung cancer"),
            node("3", "Exercise"),
        ];
        assert_eq!(labels(search_nodes(&nodes, "lcan")), vec!["Lung cancer"]);
        assert!(search_nodes(&nodes, "zzz").is_empty());
    }

    #[test]
    fn ids_are_searchable_too() {
        let nodes = vec![node("gene_brca1", "Tumor suppressor")];
        assert_eq!(search_nodes(&nodes, "brca").len(), 1);
    }
}
