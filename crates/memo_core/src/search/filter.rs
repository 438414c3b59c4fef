//! Title + tag filter over hydrated memos.
//!
//! # Invariants
//! - Empty title query and empty tag set each match everything.
//! - Title matching is a case-insensitive substring test.
//! - Required tags combine with AND and compare by id only.
//! - Output keeps input order.

use crate::model::memo::HydratedMemo;
use crate::model::tag::Tag;

/// Filter criteria for the memo list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoFilter {
    pub title_query: String,
    pub required_tags: Vec<Tag>,
}

impl MemoFilter {
    pub fn new(title_query: impl Into<String>, required_tags: Vec<Tag>) -> Self {
        Self {
            title_query: title_query.into(),
            required_tags,
        }
    }

    /// Whether this filter lets every memo through.
    pub fn is_empty(&self) -> bool {
        self.title_query.is_empty() && self.required_tags.is_empty()
    }

    pub fn matches(&self, memo: &HydratedMemo) -> bool {
        let needle = self.title_query.to_lowercase();
        title_matches(memo, &needle) && tags_match(memo, &self.required_tags)
    }

    /// Returns the matching memos in input order.
    pub fn apply(&self, memos: &[HydratedMemo]) -> Vec<HydratedMemo> {
        filter_memos(memos, &self.title_query, &self.required_tags)
    }
}

/// Returns memos whose title contains `title_query` (ignoring case) and that
/// carry every tag in `required_tags`.
pub fn filter_memos(
    memos: &[HydratedMemo],
    title_query: &str,
    required_tags: &[Tag],
) -> Vec<HydratedMemo> {
    let needle = title_query.to_lowercase();
    memos
        .iter()
        .filter(|memo| title_matches(memo, &needle) && tags_match(memo, required_tags))
        .cloned()
        .collect()
}

fn title_matches(memo: &HydratedMemo, needle: &str) -> bool {
    needle.is_empty() || memo.title.to_lowercase().contains(needle)
}

fn tags_match(memo: &HydratedMemo, required_tags: &[Tag]) -> bool {
    required_tags.iter().all(|tag| memo.has_tag(&tag.id))
}

#[cfg(test)]
mod tests {
    use super::{filter_memos, MemoFilter};
    use crate::model::memo::HydratedMemo;
    use crate::model::tag::Tag;

    fn memo(title: &str, tags: &[&Tag]) -> HydratedMemo {
        HydratedMemo {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            body: String::new(),
            tags: tags.iter().map(|tag| (*tag).clone()).collect(),
        }
    }

    fn titles(memos: &[HydratedMemo]) -> Vec<&str> {
        memos.iter().map(|memo| memo.title.as_str()).collect()
    }

    #[test]
    fn empty_criteria_return_everything_in_order() {
        let memos = vec![memo("b", &[]), memo("a", &[]), memo("c", &[])];
        assert_eq!(filter_memos(&memos, "", &[]), memos);
        assert!(MemoFilter::default().is_empty());
    }

    #[test]
    fn title_query_is_case_insensitive_substring() {
        let memos = vec![memo("Project A", &[]), memo("Home", &[]), memo("Projector", &[])];
        let filtered = filter_memos(&memos, "proj", &[]);
        assert_eq!(titles(&filtered), vec!["Project A", "Projector"]);

        let upper = filter_memos(&memos, "HOME", &[]);
        assert_eq!(titles(&upper), vec!["Home"]);
    }

    #[test]
    fn required_tags_use_and_semantics() {
        let x = Tag::with_id("x", "X");
        let y = Tag::with_id("y", "Y");
        let memos = vec![
            memo("only x", &[&x]),
            memo("both", &[&x, &y]),
            memo("only y", &[&y]),
            memo("none", &[]),
        ];

        let filtered = filter_memos(&memos, "", &[x.clone(), y.clone()]);
        assert_eq!(titles(&filtered), vec!["both"]);
    }

    #[test]
    fn required_tags_compare_by_id_not_label() {
        let stored = Tag::with_id("x", "current label");
        let selected = Tag::with_id("x", "stale label");
        let memos = vec![memo("tagged", &[&stored])];
        assert_eq!(filter_memos(&memos, "", &[selected]).len(), 1);
    }

    #[test]
    fn both_predicates_must_pass() {
        let x = Tag::with_id("x", "X");
        let memos = vec![memo("Project", &[]), memo("Project tagged", &[&x])];
        let filter = MemoFilter::new("project", vec![x]);
        assert_eq!(titles(&filter.apply(&memos)), vec!["Project tagged"]);
        assert!(!filter.matches(&memos[0]));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_memos(&[], "x", &[Tag::with_id("x", "X")]).is_empty());
    }
}
