//! Paging links for admin list pages.

use freshwater_backend::ADMIN_PAGE_SIZE;
use freshwater_core::Page;
use url::form_urlencoded;

/// Previous/next links that keep the current search and filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pager {
    pub page: u32,
    pub total_pages: u64,
    pub count: u64,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pager {
    /// Build links for `page` of the list at `path`.
    ///
    /// `params` are the active search and filter values; blank ones are
    /// left out of the links.
    #[must_use]
    pub fn new<T>(path: &str, page: &Page<T>, current: u32, params: &[(&str, Option<&str>)]) -> Self {
        let link = |number: u32| {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (key, value) in params {
                if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                    query.append_pair(key, value);
                }
            }
            if number > 1 {
                query.append_pair("page", &number.to_string());
            }
            let query = query.finish();
            if query.is_empty() {
                path.to_string()
            } else {
                format!("{path}?{query}")
            }
        };

        Self {
            page: current,
            total_pages: page.total_pages(ADMIN_PAGE_SIZE),
            count: page.count,
            previous_url: page.previous_page().map(link),
            next_url: page.next_page().map(link),
        }
    }

    /// Whether there is more than one page to move between.
    #[must_use]
    pub const fn has_links(&self) -> bool {
        self.previous_url.is_some() || self.next_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(next: Option<&str>, previous: Option<&str>) -> Page<u32> {
        Page {
            results: vec![1],
            count: 45,
            next: next.map(String::from),
            previous: previous.map(String::from),
        }
    }

    #[test]
    fn test_links_keep_filters() {
        let page = page(
            Some("http://backend/api/admin/orders/?page=3&status=pending"),
            Some("http://backend/api/admin/orders/?status=pending"),
        );
        let pager = Pager::new(
            "/orders",
            &page,
            2,
            &[("search", Some("ORD")), ("status", Some("pending")), ("payment_status", None)],
        );
        assert_eq!(pager.total_pages, 3);
        assert_eq!(pager.previous_url.as_deref(), Some("/orders?search=ORD&status=pending"));
        assert_eq!(
            pager.next_url.as_deref(),
            Some("/orders?search=ORD&status=pending&page=3")
        );
        assert!(pager.has_links());
    }

    #[test]
    fn test_single_page_has_no_links() {
        let pager = Pager::new("/users", &page(None, None), 1, &[("search", Some(" "))]);
        assert!(!pager.has_links());
        assert_eq!(pager.count, 45);
    }
}
