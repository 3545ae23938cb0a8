//! Page views over materialized collections.
//!
//! # Responsibility
//! - Slice an already-loaded collection into one page.
//! - Build next/previous locators from the request path.
//!
//! # Invariants
//! - Locators always use the `page` query parameter: `{path}?page={n}`.
//! - Page `0` is read as page `1`, matching `Repository::paged`.
//! - A zero page size yields zero total pages and an empty page.

use serde::Serialize;

const PAGE_QUERY_PARAM: &str = "page";

/// One display-ready page of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginator<T> {
    /// Size of the whole input collection.
    pub count: usize,
    pub current_page: u32,
    pub total_pages: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginator<T> {
    /// Builds page `page_number` of `data`.
    ///
    /// `path` is the request path the locators are appended to, e.g. `/foos`.
    pub fn new(
        data: impl IntoIterator<Item = T>,
        page_number: u32,
        page_size: u32,
        path: &str,
    ) -> Self {
        let items: Vec<T> = data.into_iter().collect();
        let count = items.len();
        let current_page = page_number.max(1);
        let total_pages = total_pages(count, page_size);

        let next = (current_page < total_pages).then(|| page_locator(path, current_page + 1));
        let previous = (current_page > 1).then(|| page_locator(path, current_page - 1));

        let size = page_size as usize;
        let results = items
            .into_iter()
            .skip((current_page as usize - 1).saturating_mul(size))
            .take(size)
            .collect();

        Self {
            count,
            current_page,
            total_pages,
            next,
            previous,
            results,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

fn total_pages(count: usize, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = count.div_ceil(page_size as usize);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

fn page_locator(path: &str, page: u32) -> String {
    format!("{path}?{PAGE_QUERY_PARAM}={page}")
}

#[cfg(test)]
mod tests {
    use super::{page_locator, total_pages};

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(100, 10), 10);
        assert_eq!(total_pages(101, 10), 11);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn locator_uses_page_parameter() {
        assert_eq!(page_locator("/api/foos", 3), "/api/foos?page=3");
    }
}
