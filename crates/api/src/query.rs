//! Shared query parameter types for API handlers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use lacquer_core::catalog::url::{decode, decode_page, parse_query_string};
use lacquer_core::catalog::FilterState;
use serde::Deserialize;

/// Key for an explicit page size on paginated listings.
pub const KEY_PAGE_SIZE: &str = "page_size";

/// Catalog filter, page and optional page size decoded from the raw query
/// string.
///
/// Facet values are comma-joined and may carry escaped commas, which serde's
/// flat query deserializer cannot express, so this goes through the catalog
/// URL codec instead. Extraction never fails: malformed parameters fall back
/// to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub filter: FilterState,
    pub page: i64,
    pub page_size: Option<i64>,
}

impl CatalogQuery {
    pub fn from_query_str(query: &str) -> Self {
        let params = parse_query_string(query);
        let page_size = params
            .iter()
            .filter(|(k, _)| k == KEY_PAGE_SIZE)
            .filter_map(|(_, v)| v.trim().parse::<i64>().ok())
            .last();
        Self {
            filter: decode(params.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            page: decode_page(params.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            page_size,
        }
    }
}

impl<S> FromRequestParts<S> for CatalogQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query_str(parts.uri.query().unwrap_or_default()))
    }
}

/// Body for attaching an image by remote URL.
#[derive(Debug, Deserialize)]
pub struct ImageUrlBody {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use lacquer_core::catalog::Facet;
    use lacquer_core::rating::Rating;

    use super::*;

    #[test]
    fn decodes_filter_page_and_size() {
        let q = CatalogQuery::from_query_str("brand=OPI&rating=A%2B&page=3&page_size=25");
        assert_eq!(
            q.filter,
            FilterState::default()
                .with(Facet::Brand, "OPI")
                .with_rating(Rating::APlus)
        );
        assert_eq!(q.page, 3);
        assert_eq!(q.page_size, Some(25));
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let q = CatalogQuery::from_query_str("page=abc&sort=sideways&year=soon&page_size=x");
        assert_eq!(q.filter, FilterState::default());
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, None);
    }
}
