//! Page-number pagination
//!
//! `?page=N` (1-based) and `?limit=M` select a page; the response carries the
//! total count and absolute links to the neighbouring pages.

use serde::Serialize;
use url::Url;

use super::errors::{ApiError, ApiResult};
use super::extractors::{QueryParams, RequestUrl};
use crate::config::PaginationConfig;

const PAGE_PARAM: &str = "page";
const LIMIT_PARAM: &str = "limit";

/// Requested page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Read `page` and `limit`
    ///
    /// A `page` that is not a positive integer is an invalid page. A bad
    /// `limit` falls back to the default; a large one is capped.
    pub fn from_query(query: &QueryParams, config: &PaginationConfig) -> ApiResult<Self> {
        let page = match query.get(PAGE_PARAM) {
            None => 1,
            Some("last") => i64::MAX,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or(ApiError::InvalidPage)?,
        };

        let limit = query
            .positive_int(LIMIT_PARAM)
            .map(|l| l.min(i64::from(config.max_page_size)))
            .unwrap_or_else(|| i64::from(config.page_size));

        Ok(Self { page, limit })
    }

    /// Resolve `last` and reject pages past the end
    pub fn checked(self, count: i64) -> ApiResult<Self> {
        let pages = Self::page_count(count, self.limit);
        let page = if self.page == i64::MAX { pages } else { self.page };
        if page > pages {
            return Err(ApiError::InvalidPage);
        }
        Ok(Self { page, ..self })
    }

    /// Number of pages; an empty result still has one (empty) page
    fn page_count(count: i64, limit: i64) -> i64 {
        if count <= 0 {
            1
        } else {
            (count + limit - 1) / limit
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Paginated response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, request: PageRequest, url: &RequestUrl) -> Self {
        let pages = PageRequest::page_count(count, request.limit);

        let next = (request.page < pages).then(|| page_link(url, Some(request.page + 1)));
        let previous = (request.page > 1).then(|| {
            if request.page == 2 {
                page_link(url, None)
            } else {
                page_link(url, Some(request.page - 1))
            }
        });

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Current URL with `page` replaced, or removed when `None`
fn page_link(url: &RequestUrl, page: Option<i64>) -> String {
    let base = url.absolute(&url.path);
    let Ok(mut link) = Url::parse(&base) else {
        return base;
    };

    let kept: Vec<(String, String)> = url
        .query
        .as_deref()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .filter(|(k, _)| k != PAGE_PARAM)
                .collect()
        })
        .unwrap_or_default();

    if kept.is_empty() && page.is_none() {
        link.set_query(None);
    } else {
        let mut pairs = link.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        if let Some(page) = page {
            pairs.append_pair(PAGE_PARAM, &page.to_string());
        }
    }

    link.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(query: Option<&str>) -> RequestUrl {
        RequestUrl {
            scheme: "http".to_string(),
            host: "localhost:9090".to_string(),
            path: "/api/recipes/".to_string(),
            query: query.map(str::to_string),
        }
    }

    fn request(query: &str) -> ApiResult<PageRequest> {
        PageRequest::from_query(&QueryParams::parse(query), &PaginationConfig::default())
    }

    #[test]
    fn test_defaults() {
        let req = request("").unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 6 });
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_limit_is_capped_and_bad_limit_ignored() {
        assert_eq!(request("limit=500").unwrap().limit, 100);
        assert_eq!(request("limit=-3").unwrap().limit, 6);
        assert_eq!(request("limit=x").unwrap().limit, 6);
    }

    #[test]
    fn test_invalid_page_numbers() {
        assert!(matches!(request("page=0"), Err(ApiError::InvalidPage)));
        assert!(matches!(request("page=abc"), Err(ApiError::InvalidPage)));
    }

    #[test]
    fn test_page_past_end_is_rejected() {
        let req = request("page=3&limit=5").unwrap();
        assert!(req.checked(10).is_err());
        assert!(req.checked(11).is_ok());
        // An empty collection still has page 1
        assert!(request("").unwrap().checked(0).is_ok());
        assert!(request("page=2").unwrap().checked(0).is_err());
    }

    #[test]
    fn test_last_page() {
        let req = request("page=last&limit=4").unwrap().checked(9).unwrap();
        assert_eq!(req.page, 3);
        assert_eq!(req.offset(), 8);
    }

    #[test]
    fn test_links() {
        let req = request("page=2&limit=2").unwrap().checked(5).unwrap();
        let page = Page::new(vec![3, 4], 5, req, &url(Some("page=2&limit=2&tags=lunch")));

        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:9090/api/recipes/?limit=2&tags=lunch&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:9090/api/recipes/?limit=2&tags=lunch")
        );
    }

    #[test]
    fn test_single_page_has_no_links() {
        let req = request("").unwrap().checked(3).unwrap();
        let page = Page::new(vec![1, 2, 3], 3, req, &url(None));
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn test_previous_link_to_first_page_drops_page_param() {
        let req = request("page=2").unwrap().checked(12).unwrap();
        let page = Page::new(Vec::<i32>::new(), 12, req, &url(Some("page=2")));
        assert_eq!(page.previous.as_deref(), Some("http://localhost:9090/api/recipes/"));
        assert!(page.next.is_none());
    }
}
