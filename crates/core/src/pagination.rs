//! The `{results, count, next, previous}` envelope of backend list endpoints.

use serde::{Deserialize, Serialize};
use url::Url;

/// One page of a paginated backend listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Page<T> {
    /// A page with no results and no neighbours.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            results: Vec::new(),
            count: 0,
            next: None,
            previous: None,
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Page number encoded in the `next` link.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.next.as_deref().and_then(page_param)
    }

    /// Page number encoded in the `previous` link.
    ///
    /// The backend drops `page` from the link to the first page, so a link
    /// without it means page 1.
    #[must_use]
    pub fn previous_page(&self) -> Option<u32> {
        self.previous
            .as_deref()
            .map(|link| page_param(link).unwrap_or(1))
    }

    /// Opaque cursor in the `next` link, for cursor-paginated listings.
    #[must_use]
    pub fn next_cursor(&self) -> Option<String> {
        self.next.as_deref().and_then(|link| query_param(link, "cursor"))
    }

    /// Opaque cursor in the `previous` link.
    #[must_use]
    pub fn previous_cursor(&self) -> Option<String> {
        self.previous
            .as_deref()
            .and_then(|link| query_param(link, "cursor"))
    }

    /// Number of pages for `count` results at `page_size` per page (at least 1).
    #[must_use]
    pub fn total_pages(&self, page_size: u32) -> u64 {
        let size = u64::from(page_size.max(1));
        self.count.div_ceil(size).max(1)
    }

    /// Transform each result, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            count: self.count,
            next: self.next,
            previous: self.previous,
        }
    }
}

fn page_param(link: &str) -> Option<u32> {
    query_param(link, "page").and_then(|value| value.parse().ok())
}

/// Value of query parameter `name` in a pagination link.
#[must_use]
pub fn query_param(link: &str, name: &str) -> Option<String> {
    // Links are usually absolute, but tolerate relative ones.
    let url = Url::parse(link)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(link)))
        .ok()?;
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
