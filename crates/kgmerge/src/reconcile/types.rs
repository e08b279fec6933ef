//! Type hierarchy reconciliation.

use std::collections::HashSet;

/// Merge two type paths for the same entity.
///
/// Tags from `primary` keep their order, tags only found in `secondary` are
/// appended in their order, and `base_type` always ends the list. An empty
/// `secondary` returns `primary` untouched.
pub fn reconcile_types(primary: &[String], secondary: &[String], base_type: &str) -> Vec<String> {
    if secondary.is_empty() {
        return primary.to_vec();
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(primary.len() + secondary.len());
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());

    for tag in primary.iter().chain(secondary) {
        if tag == base_type {
            continue;
        }
        if seen.insert(tag.as_str()) {
            merged.push(tag.clone());
        }
    }

    merged.push(base_type.to_string());
    merged
}

/// Strip the CURIE prefix from a type tag (`biolink:Gene` -> `Gene`).
pub fn type_name(tag: &str) -> &str {
    tag.split_once(':').map(|(_, name)| name).unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "biolink:NamedThing";

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_appends_secondary_tags_before_base() {
        let merged = reconcile_types(
            &tags(&["biolink:Gene", BASE]),
            &tags(&["biolink:BiologicalEntity", BASE]),
            BASE,
        );
        assert_eq!(
            merged,
            tags(&["biolink:Gene", "biolink:BiologicalEntity", BASE])
        );
    }

    #[test]
    fn test_empty_secondary_returns_primary() {
        let primary = tags(&["biolink:Disease", BASE]);
        assert_eq!(reconcile_types(&primary, &[], BASE), primary);
    }

    #[test]
    fn test_identical_lists_unchanged() {
        let list = tags(&["biolink:Protein", "biolink:GeneProduct", BASE]);
        assert_eq!(reconcile_types(&list, &list, BASE), list);
    }

    #[test]
    fn test_shared_tag_keeps_first_position() {
        let merged = reconcile_types(
            &tags(&["biolink:Gene", "biolink:BiologicalEntity", BASE]),
            &tags(&["biolink:BiologicalEntity", "biolink:Protein", BASE]),
            BASE,
        );
        assert_eq!(
            merged,
            tags(&[
                "biolink:Gene",
                "biolink:BiologicalEntity",
                "biolink:Protein",
                BASE
            ])
        );
    }

    #[test]
    fn test_base_forced_last() {
        let merged = reconcile_types(
            &tags(&[BASE, "biolink:Gene"]),
            &tags(&["biolink:Protein"]),
            BASE,
        );
        assert_eq!(merged, tags(&["biolink:Gene", "biolink:Protein", BASE]));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name("biolink:Gene"), "Gene");
        assert_eq!(type_name("Gene"), "Gene");
    }
}
