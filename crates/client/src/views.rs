//! List views over fetched collections.
//!
//! A view fetches its collection once. Search and category changes only
//! recompute the visible subset; they never touch the network.

use std::future::Future;

use atelier_core::{ListFilter, Page, Searchable, categories, paginate};

use crate::api::ApiResult;

/// A searchable, category-filterable list.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    items: Vec<T>,
    filter: ListFilter,
    visible: Vec<usize>,
    loaded: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            filter: ListFilter::default(),
            visible: Vec::new(),
            loaded: false,
        }
    }
}

impl<T: Searchable> ListView<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A view over items that are already loaded.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        let mut view = Self {
            items,
            loaded: true,
            ..Self::default()
        };
        view.recompute();
        view
    }

    /// Replace the collection with the result of one `fetch`.
    ///
    /// The current search and category are kept. On failure the view keeps
    /// its previous items.
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged.
    pub async fn load<F, Fut>(&mut self, fetch: F) -> ApiResult<usize>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<Vec<T>>>,
    {
        let items = fetch().await?;
        self.items = items;
        self.loaded = true;
        self.recompute();
        Ok(self.items.len())
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.set_search(search);
        self.recompute();
    }

    /// Select a category; `None`, blank or `"all"` clears the selection.
    pub fn set_category(&mut self, category: Option<String>) {
        self.filter.set_category(category);
        self.recompute();
    }

    #[must_use]
    pub const fn filter(&self) -> &ListFilter {
        &self.filter
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Every fetched item, ignoring the filter.
    #[must_use]
    pub fn all(&self) -> &[T] {
        &self.items
    }

    /// Items passing the current filter, in fetch order.
    #[must_use]
    pub fn visible(&self) -> Vec<&T> {
        self.visible
            .iter()
            .filter_map(|&index| self.items.get(index))
            .collect()
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Category names of the whole collection, for the category picker.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        categories(&self.items)
    }

    fn recompute(&mut self) {
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.filter.matches(*item))
            .map(|(index, _)| index)
            .collect();
    }
}

impl<T: Searchable + Clone> ListView<T> {
    /// One page of the visible items.
    #[must_use]
    pub fn page(&self, page: usize, per_page: usize) -> Page<T> {
        let indices = paginate(&self.visible, page, per_page);
        Page {
            items: indices
                .items
                .iter()
                .filter_map(|&index| self.items.get(index).cloned())
                .collect(),
            page: indices.page,
            per_page: indices.per_page,
            total_items: indices.total_items,
            total_pages: indices.total_pages,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use atelier_core::{Project, ProjectId};

    use super::*;
    use crate::api::ApiError;

    fn project(id: &str, category: &str, tags: &[&str]) -> Project {
        Project {
            id: ProjectId::new(id),
            title: format!("Project {id}"),
            description: String::new(),
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
            project("1", "Web App", &["Laravel"]),
            project("2", "Website", &["Next.js"]),
            project("3", "Backend", &["laravel"]),
            project("4", "Mobile", &["Flutter"]),
            project("5", "Website", &["Astro"]),
        ]
    }

    fn ids(view: &ListView<Project>) -> Vec<String> {
        view.visible().iter().map(|p| p.id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_load_fetches_once_and_filters_locally() {
        let calls = AtomicUsize::new(0);
        let mut view = ListView::new();

        let count = view
            .load(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(fixture())
            })
            .await
            .unwrap();
        assert_eq!(count, 5);

        view.set_search("LARAVEL");
        assert_eq!(ids(&view), vec!["1", "3"]);
        view.set_category(Some("Backend".into()));
        assert_eq!(ids(&view), vec!["3"]);
        view.set_category(Some("all".into()));
        view.set_search("");
        assert_eq!(view.visible_count(), 5);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_items() {
        let mut view = ListView::from_items(fixture());
        let err = view
            .load(|| async { Err(ApiError::Server { status: 503 }) })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Server { .. }));
        assert_eq!(view.all().len(), 5);
    }

    #[test]
    fn test_filter_survives_reload_order() {
        let mut view = ListView::new();
        view.set_category(Some("Website".into()));
        assert!(view.visible().is_empty());
        assert!(!view.is_loaded());

        view = ListView::from_items(fixture());
        view.set_category(Some("Website".into()));
        assert_eq!(ids(&view), vec!["2", "5"]);
        assert_eq!(view.categories(), vec!["Web App", "Website", "Backend", "Mobile"]);
    }

    static CLONES: AtomicUsize = AtomicUsize::new(0);

    struct Counted(Project);

    impl Clone for Counted {
        fn clone(&self) -> Self {
            CLONES.fetch_add(1, Ordering::SeqCst);
            Self(self.0.clone())
        }
    }

    impl Searchable for Counted {
        fn search_fields(&self) -> Vec<&str> {
            self.0.search_fields()
        }

        fn tags(&self) -> &[String] {
            self.0.tags()
        }

        fn category(&self) -> Option<&str> {
            self.0.category()
        }
    }

    #[test]
    fn test_page_clones_only_returned_items() {
        let view = ListView::from_items(fixture().into_iter().map(Counted).collect());
        CLONES.store(0, Ordering::SeqCst);

        let page = view.page(2, 2);

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].0.id.as_str(), "3");
        assert_eq!(CLONES.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_page_over_visible_items() {
        let mut view = ListView::from_items(fixture());
        view.set_category(Some("Website".into()));

        let page = view.page(1, 1);
        assert_eq!(page.total_items, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].id.as_str(), "2");

        let last = view.page(9, 1);
        assert_eq!(last.page, 2);
        assert_eq!(last.items[0].id.as_str(), "5");
        assert!(!last.has_next());
    }
}
