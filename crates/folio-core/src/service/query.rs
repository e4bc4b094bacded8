//! List/query service - search, sort and paginate administrative listings.
//!
//! The service holds no state besides the page size. Each request passes a
//! [`ListQuery`] describing what the operator is looking at and gets a fresh
//! [`Page`] back; nothing is cached between calls.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use serde::{Deserialize, Serialize};

use crate::domain::{Category, PostWithCategories};

/// Items per page in the admin listings.
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Ordering applied before pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Creation time, newest first.
    #[default]
    #[serde(alias = "newest")]
    New,
    /// Creation time, oldest first.
    #[serde(alias = "oldest")]
    Old,
    /// Title (or name) in collation order.
    Title,
}

/// Layout the operator picked. Carried through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

/// View state of an admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub sort: SortKey,
    /// 1-based.
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub view: ViewMode,
}

fn first_page() -> u32 {
    1
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            term: String::new(),
            sort: SortKey::default(),
            page: first_page(),
            view: ViewMode::default(),
        }
    }
}

impl ListQuery {
    /// Change the search term. The result set changes, so paging restarts at 1.
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self.page = first_page();
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// One page of a filtered, sorted listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}

/// Something that can appear in an admin listing.
pub trait Listable {
    /// Text matched by the search term and compared by [`SortKey::Title`].
    fn label(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;
}

impl Listable for PostWithCategories {
    fn label(&self) -> &str {
        &self.post.title
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.post.created_at
    }
}

impl Listable for Category {
    fn label(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryService {
    page_size: usize,
}

impl Default for QueryService {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryService {
    /// A zero page size is bumped to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Filter, sort and slice `items` according to `query`.
    pub fn run<T: Listable>(&self, items: Vec<T>, query: &ListQuery) -> Page<T> {
        let mut matched = filter(items, &query.term);
        sort(&mut matched, query.sort);

        let total_items = matched.len();
        let total_pages = total_items.div_ceil(self.page_size);
        // Page 0 means "first page"; anything past the end is an empty slice.
        let page = query.page.max(1);
        let start = (page as usize - 1).saturating_mul(self.page_size);

        let items = matched
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect();

        Page {
            items,
            page,
            total_pages,
            total_items,
        }
    }
}

/// Case-insensitive substring match on the label. An empty term keeps everything.
pub fn filter<T: Listable>(items: Vec<T>, term: &str) -> Vec<T> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| item.label().to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort: items with equal keys keep their relative order.
pub fn sort<T: Listable>(items: &mut [T], key: SortKey) {
    match key {
        SortKey::New => items.sort_by_key(|item| std::cmp::Reverse(item.created_at())),
        SortKey::Old => items.sort_by_key(|item| item.created_at()),
        SortKey::Title => {
            let collation = TitleCollation::new();
            items.sort_by(|a, b| collation.compare(a.label(), b.label()));
        }
    }
}

/// Locale-aware ordering for titles and names, using the Japanese tailoring
/// of the Unicode collation order.
///
/// Labels the collator considers equal are ordered by raw code points.
pub struct TitleCollation {
    collator: Option<Collator>,
}

impl TitleCollation {
    pub fn new() -> Self {
        let collator = match Collator::try_new(&locale!("ja").into(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(err) => {
                tracing::warn!(error = ?err, "Collation data unavailable, sorting by code point");
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b).then_with(|| a.cmp(b)),
            None => a.cmp(b),
        }
    }
}

impl Default for TitleCollation {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare two labels the way [`SortKey::Title`] does.
pub fn collate(a: &str, b: &str) -> Ordering {
    TitleCollation::new().compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        label: String,
        created_at: DateTime<Utc>,
        tag: u32,
    }

    impl Listable for Row {
        fn label(&self) -> &str {
            &self.label
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
    }

    fn rows(labels: &[&str]) -> Vec<Row> {
        let base = Utc::now();
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| Row {
                label: label.to_string(),
                created_at: base + Duration::seconds(i as i64),
                tag: i as u32,
            })
            .collect()
    }

    #[test]
    fn seventeen_items_span_three_pages() {
        let service = QueryService::default();
        let items = rows(&["post"; 17]);

        let first = service.run(items.clone(), &ListQuery::default());
        assert_eq!(first.items.len(), 8);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_items, 17);

        let last = service.run(items, &ListQuery::default().with_page(3));
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.total_pages, 3);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let service = QueryService::default();
        let items = rows(&["a", "b", "c"]);

        let page = service.run(items, &ListQuery::default().with_page(2));
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let service = QueryService::new(2);
        let page = service.run(rows(&["a", "b", "c"]), &ListQuery::default().with_page(0));
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let service = QueryService::default();
        let items = rows(&["Rust Ownership", "async RUST", "Go channels", "Trust"]);

        let page = service.run(items, &ListQuery::default().with_term("rust"));
        let labels: Vec<_> = page.items.iter().map(|r| r.label.as_str()).collect();

        assert_eq!(page.total_items, 3);
        assert!(labels.iter().all(|l| l.to_lowercase().contains("rust")));
        assert!(!labels.contains(&"Go channels"));
    }

    #[test]
    fn empty_term_matches_everything() {
        let items = rows(&["x", "y", ""]);
        assert_eq!(filter(items, "").len(), 3);
    }

    #[test]
    fn no_matches_yields_zero_pages() {
        let page = QueryService::default().run(rows(&["a"]), &ListQuery::default().with_term("zzz"));
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn newest_first_is_the_default() {
        let page = QueryService::default().run(rows(&["first", "second", "third"]), &ListQuery::default());
        let labels: Vec<_> = page.items.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["third", "second", "first"]);
    }

    #[test]
    fn oldest_first_reverses_creation_order() {
        let query = ListQuery::default().with_sort(SortKey::Old);
        let page = QueryService::default().run(rows(&["first", "second", "third"]), &query);
        let labels: Vec<_> = page.items.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
    }

    #[test]
    fn title_sort_folds_case() {
        let mut items = rows(&["banana", "Apple", "cherry", "apple pie"]);
        sort(&mut items, SortKey::Title);
        let labels: Vec<_> = items.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Apple", "apple pie", "banana", "cherry"]);
    }

    #[test]
    fn title_sort_follows_collation_not_code_points() {
        let mut items = rows(&["Zebra", "Éclair", "eclair"]);
        sort(&mut items, SortKey::Title);
        let labels: Vec<_> = items.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["eclair", "Éclair", "Zebra"]);
    }

    #[test]
    fn kana_titles_sort_in_syllabary_order() {
        let mut items = rows(&["い", "ア", "か"]);
        sort(&mut items, SortKey::Title);
        let labels: Vec<_> = items.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["ア", "い", "か"]);
    }

    #[test]
    fn collate_orders_accented_before_later_letters() {
        assert_eq!(collate("Éclair", "Zebra"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn title_sort_keeps_prior_order_for_equal_titles() {
        let mut items = rows(&["same", "other", "same"]);
        // Reverse the two "same" rows relative to creation order.
        items.swap(0, 2);
        let before: Vec<u32> = items
            .iter()
            .filter(|r| r.label == "same")
            .map(|r| r.tag)
            .collect();

        sort(&mut items, SortKey::Title);
        sort(&mut items, SortKey::Title);

        let after: Vec<u32> = items
            .iter()
            .filter(|r| r.label == "same")
            .map(|r| r.tag)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn changing_the_term_resets_the_page() {
        let query = ListQuery::default().with_page(4).with_term("rust");
        assert_eq!(query.page, 1);
        assert_eq!(query.term, "rust");
    }

    #[test]
    fn query_deserializes_with_defaults_and_aliases() {
        let query: ListQuery = serde_json::from_str(r#"{"sort":"oldest"}"#).unwrap();
        assert_eq!(query.sort, SortKey::Old);
        assert_eq!(query.page, 1);
        assert_eq!(query.term, "");
        assert_eq!(query.view, ViewMode::List);
    }
}
