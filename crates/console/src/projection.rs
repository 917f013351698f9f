//! List projection: case-insensitive name filter plus 1-indexed pagination.

use std::ops::RangeInclusive;
use std::sync::Arc;

use supplydesk_core::Lifecycle;

/// One rendered page of a filtered collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<T> {
    pub rows: Vec<T>,
    /// Requested page (1-indexed). May exceed `page_count`; `rows` is then empty.
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    /// Number of items left after filtering.
    pub filtered_total: usize,
}

impl<T> ListView<T> {
    /// Page buttons to render: `1..=page_count` (empty when nothing matches).
    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        1..=self.page_count
    }

    /// Half-open `[first, last)` window of the filtered set this page covers.
    ///
    /// Saturates at `usize::MAX` for absurdly large page numbers.
    pub fn window(&self) -> (usize, usize) {
        let first = self.page.saturating_sub(1).saturating_mul(self.page_size);
        (first, first.saturating_add(self.page_size))
    }
}

/// True when `name` contains `needle`, ignoring case.
pub fn matches_search(name: &str, needle: &str) -> bool {
    needle.is_empty() || name.to_lowercase().contains(&needle.to_lowercase())
}

/// Filter `items` by name and slice out one page.
///
/// `hidden` removes a single entity (e.g. the signed-in user) before
/// filtering. Page `0` is treated as page `1`; a page past the end is empty.
pub fn project<T>(
    items: &[T],
    search: &str,
    page: usize,
    page_size: usize,
    hidden: Option<T::Id>,
) -> ListView<T>
where
    T: Lifecycle + Clone,
{
    let page = page.max(1);
    let page_size = page_size.max(1);

    let filtered: Vec<&T> = items
        .iter()
        .filter(|item| hidden.is_none_or(|id| item.id() != id))
        .filter(|item| matches_search(item.name(), search))
        .collect();

    let filtered_total = filtered.len();
    let page_count = filtered_total.div_ceil(page_size);
    let first = (page - 1).saturating_mul(page_size);

    let rows = filtered
        .into_iter()
        .skip(first)
        .take(page_size)
        .cloned()
        .collect();

    ListView {
        rows,
        page,
        page_size,
        page_count,
        filtered_total,
    }
}

/// Keeps a [`ListView`] in sync with its inputs.
///
/// The view is recomputed whenever the source collection, the search text or
/// the page changes. The page is not reset when the filter shrinks the result.
#[derive(Debug, Clone)]
pub struct ListProjection<T: Lifecycle> {
    source: Arc<[T]>,
    search: String,
    page: usize,
    page_size: usize,
    hidden: Option<T::Id>,
    view: ListView<T>,
}

impl<T> ListProjection<T>
where
    T: Lifecycle + Clone,
{
    pub fn new(page_size: usize) -> Self {
        let mut projection = Self {
            source: Arc::from(Vec::new()),
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
            hidden: None,
            view: ListView {
                rows: Vec::new(),
                page: 1,
                page_size: page_size.max(1),
                page_count: 0,
                filtered_total: 0,
            },
        };
        projection.recompute();
        projection
    }

    pub fn hide(&mut self, id: Option<T::Id>) {
        self.hidden = id;
        self.recompute();
    }

    pub fn set_source(&mut self, source: Arc<[T]>) {
        self.source = source;
        self.recompute();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.recompute();
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
        self.recompute();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub fn view(&self) -> &ListView<T> {
        &self.view
    }

    fn recompute(&mut self) {
        self.view = project(&self.source, &self.search, self.page, self.page_size, self.hidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplydesk_categories::Category;
    use supplydesk_core::CategoryId;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            description: "d".to_string(),
            active: true,
            created_at: None,
            updated_at: None,
            supply_items: vec![],
        }
    }

    fn names(view: &ListView<Category>) -> Vec<&str> {
        view.rows.iter().map(|c| c.name.as_str()).collect()
    }

    fn sample() -> Vec<Category> {
        ["Lácteos", "Carnes", "Verduras", "Harinas", "Bebidas", "Lacas", "Especias", "Aceites"]
            .iter()
            .enumerate()
            .map(|(i, n)| category(i as i64 + 1, n))
            .collect()
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let view = project(&sample(), "AC", 1, 6, None);
        assert_eq!(names(&view), vec!["Lacas", "Aceites"]);
        assert_eq!(view.filtered_total, 2);
        assert_eq!(view.page_count, 1);
    }

    #[test]
    fn accented_search_matches_accented_names() {
        let view = project(&sample(), "lÁc", 1, 6, None);
        assert_eq!(names(&view), vec!["Lácteos"]);
    }

    #[test]
    fn pages_are_one_indexed_slices() {
        let items = sample();
        let first = project(&items, "", 1, 6, None);
        let second = project(&items, "", 2, 6, None);
        assert_eq!(first.rows.len(), 6);
        assert_eq!(names(&second), vec!["Especias", "Aceites"]);
        assert_eq!(second.page_numbers().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(second.window(), (6, 12));
    }

    #[test]
    fn page_past_the_end_is_empty_not_a_panic() {
        let view = project(&sample(), "carnes", 4, 6, None);
        assert!(view.rows.is_empty());
        assert_eq!(view.page, 4);
        assert_eq!(view.page_count, 1);
    }

    #[test]
    fn huge_page_window_saturates() {
        let view = project::<Category>(&[], "", usize::MAX, 6, None);
        assert!(view.rows.is_empty());
        assert_eq!(view.window(), (usize::MAX, usize::MAX));

        let view = project(&sample(), "", usize::MAX / 2, 6, None);
        assert!(view.rows.is_empty());
        let (first, last) = view.window();
        assert!(first <= last);
    }

    #[test]
    fn empty_result_has_no_page_buttons() {
        let view = project(&sample(), "zzz", 1, 6, None);
        assert_eq!(view.page_numbers().count(), 0);
    }

    #[test]
    fn hidden_entity_is_never_listed() {
        let view = project(&sample(), "", 1, 20, Some(CategoryId::new(1)));
        assert!(!names(&view).contains(&"Lácteos"));
        assert_eq!(view.filtered_total, 7);
    }

    #[test]
    fn projection_recomputes_on_every_input_change() {
        let mut projection = ListProjection::new(3);
        projection.set_source(sample().into());
        assert_eq!(projection.view().page_count, 3);

        projection.set_page(3);
        assert_eq!(names(projection.view()), vec!["Especias", "Aceites"]);

        // Page is kept even though the filter leaves a single page.
        projection.set_search("bebidas");
        assert_eq!(projection.view().page, 3);
        assert!(projection.view().rows.is_empty());

        projection.set_page(1);
        assert_eq!(names(projection.view()), vec!["Bebidas"]);

        projection.set_source(vec![category(9, "Bebidas frías"), category(10, "Bebidas")].into());
        assert_eq!(projection.view().filtered_total, 2);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the filter keeps exactly the items whose name contains the needle.
            #[test]
            fn filter_is_exact(
                names in proptest::collection::vec("[a-zA-Z]{0,8}", 0..30),
                needle in "[a-zA-Z]{0,2}"
            ) {
                let items: Vec<Category> = names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| category(i as i64, n))
                    .collect();
                let view = project(&items, &needle, 1, usize::MAX / 2, None);
                let expected: Vec<&Category> = items
                    .iter()
                    .filter(|c| c.name.to_lowercase().contains(&needle.to_lowercase()))
                    .collect();
                prop_assert_eq!(view.rows.iter().collect::<Vec<_>>(), expected);
            }

            /// Property: a page holds exactly the filtered items in its window.
            #[test]
            fn page_stays_inside_its_window(
                count in 0usize..40,
                page in 1usize..10,
                page_size in 1usize..8
            ) {
                let items: Vec<Category> = (0..count).map(|i| category(i as i64, "x")).collect();
                let view = project(&items, "", page, page_size, None);
                let (first, last) = view.window();
                let expected: Vec<i64> = (first..last.min(count)).map(|i| i as i64).collect();
                let got: Vec<i64> = view.rows.iter().map(|c| c.id.get()).collect();
                prop_assert_eq!(got, expected);
                prop_assert_eq!(view.page_count, count.div_ceil(page_size));
            }
        }
    }
}
