//! Response envelope for paginated listings.

use serde::Serialize;
use url::Url;

/// Navigation links attached to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLinks {
    /// URL of the current page.
    #[serde(rename = "self")]
    pub current: String,
    /// URL of the next page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PaginationLinks {
    /// Build links from the request URL.
    ///
    /// The `next` link keeps every query parameter of the request except
    /// `cursor` and `limit`, which are replaced with the supplied values.
    #[must_use]
    pub fn from_request(request_url: &Url, limit: usize, next_cursor: Option<&str>) -> Self {
        Self {
            current: request_url.to_string(),
            next: next_cursor.map(|cursor| with_page(request_url, limit, cursor)),
        }
    }
}

fn with_page(request_url: &Url, limit: usize, cursor: &str) -> String {
    let retained: Vec<(String, String)> = request_url
        .query_pairs()
        .filter(|(name, _)| name != "cursor" && name != "limit")
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut next = request_url.clone();
    next.set_query(None);
    {
        let mut pairs = next.query_pairs_mut();
        for (name, value) in &retained {
            pairs.append_pair(name, value);
        }
        pairs.append_pair("limit", &limit.to_string());
        pairs.append_pair("cursor", cursor);
    }
    next.to_string()
}

/// A page of results with its navigation links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Effective page size used to build the page.
    pub limit: usize,
    /// Navigation links.
    pub links: PaginationLinks,
}

impl<T> Paginated<T> {
    /// Assemble a page.
    #[must_use]
    pub const fn new(data: Vec<T>, limit: usize, links: PaginationLinks) -> Self {
        Self { data, limit, links }
    }
}

#[cfg(test)]
mod tests {
    //! Link construction coverage.
    use super::*;
    use rstest::rstest;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[rstest]
    fn last_page_has_no_next_link() {
        let links = PaginationLinks::from_request(&url("http://h/api/v1/articles"), 20, None);
        assert_eq!(links.current, "http://h/api/v1/articles");
        assert!(links.next.is_none());
    }

    #[rstest]
    fn next_link_replaces_page_parameters_and_keeps_filters() {
        let request = url("http://h/api/v1/articles/search?q=rust&cursor=old&limit=5");
        let links = PaginationLinks::from_request(&request, 5, Some("new"));
        assert_eq!(
            links.next.as_deref(),
            Some("http://h/api/v1/articles/search?q=rust&limit=5&cursor=new")
        );
    }

    #[rstest]
    fn envelope_serialises_self_link() {
        let links = PaginationLinks::from_request(&url("http://h/a"), 1, None);
        let value = serde_json::to_value(Paginated::new(vec![1], 1, links)).expect("json");
        assert_eq!(value["links"]["self"], "http://h/a");
        assert!(value["links"].get("next").is_none());
    }
}
