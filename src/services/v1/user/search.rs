use crate::database::{Reader, SEARCH_LIMIT};
use crate::errors::{ApiError, SEARCH_FAILED};
use crate::models::v1::user::SearchPattern;
use crate::requests::v1::search::SearchQuery;
use crate::responses::v1::user::SearchResponse;

/// Users whose name contains `q` literally. A blank `q` returns nothing
/// without a query.
#[tracing::instrument(skip_all, fields(q_len = query.q.chars().count()))]
pub async fn search(reader: &dyn Reader, query: &SearchQuery) -> Result<SearchResponse, ApiError> {
    if query.is_blank() {
        return Ok(SearchResponse::default());
    }

    let pattern = SearchPattern::contains(&query.q);
    let users = reader
        .search(&pattern, SEARCH_LIMIT)
        .await
        .map_err(|e| ApiError::store(e, SEARCH_FAILED))?;

    Ok(SearchResponse { users })
}
