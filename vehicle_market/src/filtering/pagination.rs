use axum::http::header::HeaderMap;

pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page size bounds applied to every list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    pub page_size: u64,
    pub max_page_size: u64,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("{param} must be a positive integer, got '{value}'")]
    NotPositive { param: &'static str, value: String },
}

/// A resolved 1-based page with its store offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    /// Number of items this page holds when `total` rows match.
    #[must_use]
    pub fn expected_len(&self, total: u64) -> u64 {
        self.limit.min(total.saturating_sub(self.offset))
    }
}

fn parse_positive(param: &'static str, raw: Option<&str>) -> Result<Option<u64>, PageError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(PageError::NotPositive {
            param,
            value: raw.to_string(),
        }),
    }
}

/// Resolve `page`/`limit` query values into LIMIT/OFFSET.
///
/// Missing values take the defaults; `limit` is clamped to the configured
/// maximum. Zero, negative and non-numeric values are rejected.
///
/// # Errors
///
/// Returns every [`PageError`] found.
pub fn resolve_page(
    page: Option<&str>,
    limit: Option<&str>,
    defaults: PageDefaults,
) -> Result<PageRequest, Vec<PageError>> {
    let page = parse_positive("page", page);
    let limit = parse_positive("limit", limit);
    let (page, limit) = match (page, limit) {
        (Ok(page), Ok(limit)) => (page, limit),
        (page, limit) => {
            return Err([page.err(), limit.err()].into_iter().flatten().collect());
        }
    };

    let page = page.unwrap_or(1);
    let limit = limit
        .unwrap_or(defaults.page_size)
        .min(defaults.max_page_size);
    Ok(PageRequest {
        page,
        limit,
        offset: (page - 1).saturating_mul(limit),
    })
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// Build the `Content-Range` header for a list response.
///
/// The range is inclusive and clipped to `total`; a page past the end is
/// reported as `<name> */<total>`.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    limit: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let safe_name = sanitize_resource_name(resource_name);
    let end = offset.saturating_add(limit).min(total_count);

    let content_range = if limit == 0 || offset >= end {
        format!("{safe_name} */{total_count}")
    } else {
        format!("{safe_name} {offset}-{}/{total_count}", end - 1)
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    }
    headers
}
