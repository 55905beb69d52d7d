//! Link filtering: the multi-field query matcher plus the listing helpers
//! (sorting and tag filters) used when browsing the collection.
use clap::ValueEnum;
use log::debug;

use crate::Link;

/// Returns the links matching `query`, in their original order.
///
/// A link matches when its name, url, notes or any tag contains the query,
/// case-insensitively. A blank query matches nothing.
pub fn match_links<'a>(query: &str, links: &'a [Link]) -> Vec<&'a Link> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    let matched: Vec<&Link> = links
        .iter()
        .filter(|link| link_matches(link, &needle))
        .collect();

    debug!(
        "Query '{}' matched {} of {} links",
        query,
        matched.len(),
        links.len()
    );
    matched
}

/// `needle` must already be lower-cased.
pub fn link_matches(link: &Link, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&link.name)
        || contains(&link.url)
        || link.notes.as_deref().is_some_and(|notes| contains(notes))
        || link.tags.iter().any(|tag| contains(tag))
}

/// Orderings offered when listing links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortBy {
    /// Newest first
    #[default]
    Created,
    /// Most used first
    UseCount,
}

pub fn sort_links(links: &mut [Link], sort_by: SortBy) {
    match sort_by {
        SortBy::Created => links.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::UseCount => links.sort_by(|a, b| b.use_count.cmp(&a.use_count)),
    }
}

/// Keeps the links that carry every tag in `tags`. No tags keeps everything.
pub fn filter_by_tags(links: Vec<Link>, tags: &[String]) -> Vec<Link> {
    if tags.is_empty() {
        return links;
    }
    links
        .into_iter()
        .filter(|link| tags.iter().all(|tag| link.has_tag(tag)))
        .collect()
}

/// Distinct tags in first-seen order.
pub fn all_tags(links: &[Link]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in links.iter().flat_map(|link| link.tags.iter()) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn link(id: &str, name: &str, url: &str, tags: &[&str]) -> Link {
        Link {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            notes: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            use_count: 0,
        }
    }

    fn ids(links: &[&Link]) -> Vec<String> {
        links.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn git_matches_name_and_tag() {
        let links = vec![
            link("1", "GitHub", "https://github.com", &[]),
            link("2", "Docs", "https://docs.io", &["git"]),
        ];

        assert_eq!(ids(&match_links("git", &links)), vec!["1", "2"]);
    }

    #[test]
    fn blank_query_matches_nothing() {
        let links = vec![link("1", "GitHub", "https://github.com", &[])];
        assert!(match_links("", &links).is_empty());
        assert!(match_links("   \t", &links).is_empty());
    }

    #[test]
    fn matching_is_case_insensitive_on_every_field() {
        let mut with_notes = link("3", "Plain", "https://plain.example", &[]);
        with_notes.notes = Some("Read the RFC later".to_string());
        let links = vec![
            link("1", "Rust Book", "https://doc.rust-lang.org/book", &[]),
            link("2", "Other", "https://EXAMPLE.com/Rfc", &[]),
            with_notes,
            link("4", "Tagged", "https://t.example", &["Specs", "RFCs"]),
        ];

        assert_eq!(ids(&match_links("rfc", &links)), vec!["2", "3", "4"]);
        assert_eq!(ids(&match_links("BOOK", &links)), vec!["1"]);
    }

    #[test]
    fn missing_notes_never_match() {
        let links = vec![link("1", "Name", "https://u.example", &[])];
        assert!(match_links("later", &links).is_empty());
    }

    #[test]
    fn result_is_an_ordered_subsequence() {
        let links = vec![
            link("a", "alpha", "https://x.example", &[]),
            link("b", "beta", "https://y.example", &[]),
            link("c", "alphabet", "https://z.example", &[]),
        ];

        let matched = match_links("alpha", &links);
        assert_eq!(ids(&matched), vec!["a", "c"]);
        for m in matched {
            assert!(link_matches(m, "alpha"));
        }
    }

    #[test]
    fn tags_are_not_capped() {
        let links = vec![link("1", "n", "https://u.example", &["a", "b", "c", "needle"])];
        assert_eq!(match_links("needle", &links).len(), 1);
    }

    #[test]
    fn sorting_by_use_count_and_created() {
        let mut older = link("old", "o", "https://o.example", &[]);
        older.created_at = DateTime::from_timestamp_millis(1_000).unwrap();
        older.use_count = 9;
        let newer = link("new", "n", "https://n.example", &[]);

        let mut links = vec![older.clone(), newer.clone()];
        sort_links(&mut links, SortBy::Created);
        assert_eq!(links[0].id, "new");

        sort_links(&mut links, SortBy::UseCount);
        assert_eq!(links[0].id, "old");
    }

    #[test]
    fn tag_filter_requires_every_tag() {
        let links = vec![
            link("1", "a", "https://a.example", &["rust", "docs"]),
            link("2", "b", "https://b.example", &["rust"]),
        ];

        let filtered = filter_by_tags(links.clone(), &["rust".to_string(), "docs".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
        assert_eq!(filter_by_tags(links, &[]).len(), 2);
    }

    #[test]
    fn all_tags_keeps_first_seen_order() {
        let links = vec![
            link("1", "a", "https://a.example", &["rust", "docs"]),
            link("2", "b", "https://b.example", &["web", "rust"]),
        ];
        assert_eq!(all_tags(&links), vec!["rust", "docs", "web"]);
    }
}
