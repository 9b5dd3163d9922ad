//! Client-side search, category filtering and pagination.
//!
//! Lists are fetched once and filtered in memory on every keystroke, so the
//! predicate must be cheap and total: it never fails, and an unmatched
//! category simply yields an empty list.

use serde::Serialize;

use crate::models::{BlogPost, Project};

/// Category value the UI uses for "no category selected".
pub const ALL_CATEGORIES: &str = "all";

/// A record that can be searched and grouped by category.
pub trait Searchable {
    /// Text fields matched by the search term (title, excerpt, description).
    fn search_fields(&self) -> Vec<&str>;

    /// Tags matched by the search term.
    fn tags(&self) -> &[String];

    /// Category name, if the record has one.
    fn category(&self) -> Option<&str>;
}

impl Searchable for Project {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str()).filter(|c| !c.is_empty())
    }
}

impl Searchable for BlogPost {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.excerpt.as_str()]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Search term and category selection of a list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    search: String,
    category: Option<String>,
}

impl ListFilter {
    /// Create a filter. Blank values and [`ALL_CATEGORIES`] mean "no filter".
    #[must_use]
    pub fn new(search: impl Into<String>, category: Option<String>) -> Self {
        let mut filter = Self::default();
        filter.set_search(search);
        filter.set_category(category);
        filter
    }

    /// The lowercased, trimmed search term.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The selected category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into().trim().to_lowercase();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES));
    }

    /// Whether `item` is visible under this filter.
    ///
    /// The search term matches case-insensitively as a substring of any
    /// search field or tag. A selected category must equal the item's
    /// category (ignoring case). Both conditions must hold.
    #[must_use]
    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        let category_ok = self.category.as_deref().is_none_or(|selected| {
            item.category()
                .is_some_and(|c| c.trim().to_lowercase() == selected.to_lowercase())
        });
        if !category_ok {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.as_str();
        item.search_fields()
            .into_iter()
            .chain(item.tags().iter().map(String::as_str))
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Items of `items` visible under `filter`, in their original order.
#[must_use]
pub fn filter_items<'a, T: Searchable>(items: &'a [T], filter: &ListFilter) -> Vec<&'a T> {
    items.iter().filter(|item| filter.matches(*item)).collect()
}

/// Distinct category names in first-seen order.
#[must_use]
pub fn categories<T: Searchable>(items: &[T]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in items.iter().filter_map(Searchable::category) {
        if !seen.iter().any(|c| c.eq_ignore_ascii_case(category)) {
            seen.push(category.to_string());
        }
    }
    seen
}

/// One page of a client-side paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number after clamping.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice `items` into 1-based pages of `per_page`.
///
/// Out-of-range page numbers are clamped into `1..=total_pages`; a
/// `per_page` of zero is treated as one.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let page_items = items
        .chunks(per_page)
        .nth(page - 1)
        .map(<[T]>::to_vec)
        .unwrap_or_default();

    Page {
        items: page_items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ProjectId;

    fn project(id: &str, title: &str, category: &str, tags: &[&str]) -> Project {
        Project {
            id: ProjectId::new(id),
            title: title.to_string(),
            description: format!("{title} description"),
            category: category.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            image_url: None,
            live_url: None,
            repo_url: None,
            featured: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn fixture() -> Vec<Project> {
        vec![
            project("1", "Clinic booking", "Web App", &["Laravel", "Vue"]),
            project("2", "Company profile", "Website", &["Next.js"]),
            project("3", "Inventory API", "Backend", &["laravel", "MySQL"]),
            project("4", "Mobile ordering", "Mobile", &["Flutter"]),
            project("5", "Design system", "Website", &["Storybook"]),
        ]
    }

    fn ids(items: &[&Project]) -> Vec<String> {
        items.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_search_matches_tags_case_insensitively() {
        let projects = fixture();
        for term in ["laravel", "LARAVEL", "  LaRaVeL "] {
            let visible = filter_items(&projects, &ListFilter::new(term, None));
            assert_eq!(ids(&visible), vec!["1", "3"], "{term}");
        }
    }

    #[test]
    fn test_search_and_category_combine() {
        let projects = fixture();
        let visible = filter_items(&projects, &ListFilter::new("laravel", Some("Backend".into())));
        assert_eq!(ids(&visible), vec!["3"]);
    }

    #[test]
    fn test_unmatched_category_is_empty() {
        let projects = fixture();
        let visible = filter_items(&projects, &ListFilter::new("", Some("Games".into())));
        assert!(visible.is_empty());
    }

    #[test]
    fn test_all_category_means_no_filter() {
        let projects = fixture();
        let filter = ListFilter::new("", Some("All".into()));
        assert_eq!(filter.category(), None);
        assert_eq!(filter_items(&projects, &filter).len(), 5);
    }

    #[test]
    fn test_search_matches_description() {
        let projects = fixture();
        let visible = filter_items(&projects, &ListFilter::new("ordering desc", None));
        assert_eq!(ids(&visible), vec!["4"]);
    }

    #[test]
    fn test_categories_distinct_in_order() {
        assert_eq!(
            categories(&fixture()),
            vec!["Web App", "Website", "Backend", "Mobile"]
        );
    }

    #[test]
    fn test_paginate_clamps() {
        let items: Vec<u32> = (1..=7).collect();

        let first = paginate(&items, 1, 3);
        assert_eq!(first.items, vec![1, 2, 3]);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(&items, 99, 3);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![7]);
        assert!(!last.has_next());

        let empty = paginate::<u32>(&[], 0, 0);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }
}
