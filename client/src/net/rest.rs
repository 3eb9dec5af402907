//! Row-storage client (PostgREST-compatible `/rest/v1` endpoints).
//!
//! DESIGN
//! ======
//! Filters map directly onto PostgREST predicates: categorical filters become
//! `col=eq.value`, free-text search becomes an `or=(col.ilike.*term*,...)`
//! across the record's searchable columns. No query language is defined
//! locally beyond that projection.
//!
//! Row counts come from `Prefer: count=exact` and the total in the
//! `Content-Range` header, never from the length of a page of rows, since
//! hosted projects cap every response at a maximum row count.

#[cfg(test)]
#[path = "rest_test.rs"]
mod rest_test;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, classify_api_error};
use super::http::{self, HttpRequest, HttpResponse, Method};
use super::types::{BackendConfig, Communication, Contact, Deal, PurchaseHistory, Task};

/// A CRM table whose rows can be listed, fetched, and mutated.
pub trait Record: Clone + PartialEq + DeserializeOwned + Send + Sync + 'static {
    /// Table name in the row store.
    const TABLE: &'static str;
    /// Columns matched by free-text search.
    const SEARCH_COLUMNS: &'static [&'static str];
    /// Default sort column (descending).
    const ORDER_COLUMN: &'static str = "created_at";

    fn id(&self) -> &str;
}

impl Record for Contact {
    const TABLE: &'static str = "contacts";
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "email", "company"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Deal {
    const TABLE: &'static str = "deals";
    const SEARCH_COLUMNS: &'static [&'static str] = &["title", "stage"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Task {
    const TABLE: &'static str = "tasks";
    const SEARCH_COLUMNS: &'static [&'static str] = &["title", "description"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Communication {
    const TABLE: &'static str = "communications";
    const SEARCH_COLUMNS: &'static [&'static str] = &["subject", "content"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for PurchaseHistory {
    const TABLE: &'static str = "purchase_history";
    const SEARCH_COLUMNS: &'static [&'static str] = &["product_name"];

    fn id(&self) -> &str {
        &self.id
    }
}

/// Filter/sort/limit parameters for a list request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub equals: Vec<(String, String)>,
    pub order: Option<(String, bool)>,
    pub limit: Option<u32>,
}

impl ListQuery {
    #[must_use]
    pub fn search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_owned());
        self
    }

    #[must_use]
    pub fn equals(mut self, column: &str, value: &str) -> Self {
        self.equals.push((column.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_owned(), ascending));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Strip characters that carry meaning in PostgREST's filter grammar.
fn sanitize_search_term(term: &str) -> String {
    term.chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '"' | '\\'))
        .collect::<String>()
        .trim()
        .to_owned()
}

fn table_url(config: &BackendConfig, table: &str, params: &[(String, String)]) -> Result<String, ApiError> {
    let raw = format!("{}/rest/v1/{table}", config.supabase_url.trim_end_matches('/'));
    let mut url = url::Url::parse(&raw).map_err(|e| ApiError::Network(format!("invalid backend url: {e}")))?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    Ok(url.into())
}

fn id_filter(id: &str) -> (String, String) {
    ("id".to_owned(), format!("eq.{id}"))
}

/// Query parameters for a list request against `R`'s table.
pub(crate) fn list_params<R: Record>(query: &ListQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_owned(), "*".to_owned())];
    for (column, value) in &query.equals {
        params.push((column.clone(), format!("eq.{value}")));
    }
    if let Some(term) = query.search.as_deref().map(sanitize_search_term).filter(|t| !t.is_empty()) {
        let clauses: Vec<String> = R::SEARCH_COLUMNS
            .iter()
            .map(|column| format!("{column}.ilike.*{term}*"))
            .collect();
        if !clauses.is_empty() {
            params.push(("or".to_owned(), format!("({})", clauses.join(","))));
        }
    }
    let (column, ascending) = query
        .order
        .clone()
        .unwrap_or_else(|| (R::ORDER_COLUMN.to_owned(), false));
    params.push(("order".to_owned(), format!("{column}.{}", if ascending { "asc" } else { "desc" })));
    if let Some(limit) = query.limit {
        params.push(("limit".to_owned(), limit.to_string()));
    }
    params
}

/// Query parameters for an exact count: filters only, a single `id` column,
/// one row.
pub(crate) fn count_params<R: Record>(query: &ListQuery) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = list_params::<R>(query)
        .into_iter()
        .filter(|(key, _)| !matches!(key.as_str(), "select" | "order" | "limit"))
        .collect();
    params.insert(0, ("select".to_owned(), "id".to_owned()));
    params.push(("limit".to_owned(), "1".to_owned()));
    params
}

/// Total from a `Content-Range` header such as `0-0/57` or `*/0`.
pub(crate) fn content_range_total(header: Option<&str>) -> Result<usize, ApiError> {
    let header = header.ok_or_else(|| ApiError::Decode("missing Content-Range header".to_owned()))?;
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse::<usize>().ok())
        .ok_or_else(|| ApiError::Decode(format!("no exact total in Content-Range {header:?}")))
}

/// Row-storage client bound to one backend project.
#[derive(Clone, Debug)]
pub struct RestClient {
    config: BackendConfig,
}

impl RestClient {
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    fn request(&self, method: Method, url: String, access_token: &str) -> HttpRequest {
        HttpRequest::new(method, url)
            .header("apikey", &self.config.supabase_anon_key)
            .bearer(access_token)
    }

    pub(crate) fn list_request<R: Record>(&self, access_token: &str, query: &ListQuery) -> Result<HttpRequest, ApiError> {
        let url = table_url(&self.config, R::TABLE, &list_params::<R>(query))?;
        Ok(self.request(Method::Get, url, access_token))
    }

    pub(crate) fn count_request<R: Record>(&self, access_token: &str, query: &ListQuery) -> Result<HttpRequest, ApiError> {
        let url = table_url(&self.config, R::TABLE, &count_params::<R>(query))?;
        Ok(self
            .request(Method::Get, url, access_token)
            .header("Prefer", "count=exact"))
    }

    pub(crate) fn get_request<R: Record>(&self, access_token: &str, id: &str) -> Result<HttpRequest, ApiError> {
        let params = [("select".to_owned(), "*".to_owned()), id_filter(id)];
        let url = table_url(&self.config, R::TABLE, &params)?;
        Ok(self
            .request(Method::Get, url, access_token)
            .header("Accept", "application/vnd.pgrst.object+json"))
    }

    pub(crate) fn insert_request<R: Record, I: Serialize>(
        &self,
        access_token: &str,
        input: &I,
    ) -> Result<HttpRequest, ApiError> {
        let url = table_url(&self.config, R::TABLE, &[])?;
        let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(self
            .request(Method::Post, url, access_token)
            .header("Prefer", "return=representation")
            .json_body(&body))
    }

    pub(crate) fn update_request<R: Record, I: Serialize>(
        &self,
        access_token: &str,
        id: &str,
        input: &I,
    ) -> Result<HttpRequest, ApiError> {
        let url = table_url(&self.config, R::TABLE, &[id_filter(id)])?;
        let body = serde_json::to_value(input).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(self
            .request(Method::Patch, url, access_token)
            .header("Prefer", "return=representation")
            .json_body(&body))
    }

    pub(crate) fn delete_request<R: Record>(&self, access_token: &str, id: &str) -> Result<HttpRequest, ApiError> {
        let url = table_url(&self.config, R::TABLE, &[id_filter(id)])?;
        Ok(self.request(Method::Delete, url, access_token))
    }

    async fn execute(request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = http::send(request).await.map_err(ApiError::Network)?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(classify_api_error(response.status, &response.body))
        }
    }

    /// Fetch rows of `R` matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failure.
    pub async fn list<R: Record>(&self, access_token: &str, query: &ListQuery) -> Result<Vec<R>, ApiError> {
        let response = Self::execute(self.list_request::<R>(access_token, query)?).await?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Exact number of rows of `R` matching `query`'s filters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the response carries no exact total.
    pub async fn count<R: Record>(&self, access_token: &str, query: &ListQuery) -> Result<usize, ApiError> {
        let response = Self::execute(self.count_request::<R>(access_token, query)?).await?;
        content_range_total(response.header_value("Content-Range"))
    }

    /// Fetch a single row by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no row matches.
    pub async fn get<R: Record>(&self, access_token: &str, id: &str) -> Result<R, ApiError> {
        let response = Self::execute(self.get_request::<R>(access_token, id)?).await?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Insert a row and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or decode failure.
    pub async fn insert<R: Record, I: Serialize>(&self, access_token: &str, input: &I) -> Result<R, ApiError> {
        let response = Self::execute(self.insert_request::<R, I>(access_token, input)?).await?;
        first_row(&response.body)
    }

    /// Update a row by id and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the update matched no row.
    pub async fn update<R: Record, I: Serialize>(&self, access_token: &str, id: &str, input: &I) -> Result<R, ApiError> {
        let response = Self::execute(self.update_request::<R, I>(access_token, id, input)?).await?;
        first_row(&response.body)
    }

    /// Delete a row by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or status failure.
    pub async fn delete<R: Record>(&self, access_token: &str, id: &str) -> Result<(), ApiError> {
        Self::execute(self.delete_request::<R>(access_token, id)?).await?;
        Ok(())
    }
}

/// Decode the first element of a `return=representation` array body.
pub(crate) fn first_row<R: DeserializeOwned>(body: &str) -> Result<R, ApiError> {
    let mut rows: Vec<R> = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(rows.swap_remove(0))
}
