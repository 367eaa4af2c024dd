// Page slicing and navigation links for list resources
use serde::Serialize;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: None,
        }
    }

    pub fn titled(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: Some(title.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLinks {
    pub first: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
    pub last: Link,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    #[serde(rename = "_links")]
    pub links: PageLinks,
}

/// 1-based page request. Zero or missing values fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Slice `all` and build first/prev/next/last links under `base_path`.
/// `extra_query` pairs are appended to every link, url-encoded.
pub fn paginate<T>(
    all: Vec<T>,
    request: PageRequest,
    base_path: &str,
    extra_query: &[(&str, &str)],
) -> Page<T> {
    let total = all.len();
    let PageRequest { page, limit } = request;
    let last_page = total.div_ceil(limit).max(1);

    let items: Vec<T> = all
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    let suffix: String = extra_query
        .iter()
        .map(|(key, value)| format!("&{}={}", key, urlencoding::encode(value)))
        .collect();
    let link = |p: usize| Link::new(format!("{}?page={}&limit={}{}", base_path, p, limit, suffix));

    let links = PageLinks {
        first: link(1),
        prev: (page > 1).then(|| link(page - 1)),
        next: (page < last_page).then(|| link(page + 1)),
        last: link(last_page),
    };

    Page {
        items,
        total,
        page,
        limit,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::new(Some(0), None), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(Some(3), Some(5)), PageRequest { page: 3, limit: 5 });
    }

    #[test]
    fn test_middle_page_links() {
        let page = paginate((1..=25).collect(), PageRequest::new(Some(2), Some(10)), "/kpis", &[]);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total, 25);
        assert_eq!(page.links.first.href, "/kpis?page=1&limit=10");
        assert_eq!(page.links.prev.unwrap().href, "/kpis?page=1&limit=10");
        assert_eq!(page.links.next.unwrap().href, "/kpis?page=3&limit=10");
        assert_eq!(page.links.last.href, "/kpis?page=3&limit=10");
    }

    #[test]
    fn test_empty_collection_has_single_page() {
        let page = paginate(Vec::<u8>::new(), PageRequest::default(), "/dashboards", &[]);
        assert!(page.items.is_empty());
        assert!(page.links.prev.is_none());
        assert!(page.links.next.is_none());
        assert_eq!(page.links.last.href, "/dashboards?page=1&limit=10");
    }

    #[test]
    fn test_extra_query_is_encoded() {
        let page = paginate(vec![1], PageRequest::default(), "/kpis", &[("status", "on track")]);
        assert_eq!(page.links.first.href, "/kpis?page=1&limit=10&status=on%20track");
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(Some(9), Some(2)), "/kpis", &[]);
        assert!(page.items.is_empty());
        assert_eq!(page.links.prev.unwrap().href, "/kpis?page=8&limit=2");
        assert!(page.links.next.is_none());
    }
}
