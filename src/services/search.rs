//! Bullhorn `query/` and `search/` operations.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{BullhornClient, RequestOptions};
use crate::core::{HttpMethod, HttpTransport};
use crate::error::BullhornResult;
use crate::services::entity::check_entity_name;
use crate::token::TokenManager;
use crate::types::{QueryOptions, QueryPage};

/// Filter length (in characters) at which the filter moves from the query
/// string into a POST body. Bullhorn rejects longer URLs.
pub const QUERY_BODY_THRESHOLD: usize = 7500;

/// Largest page Bullhorn returns for query and search.
pub const MAX_RECORDS: u32 = 200;

/// Whether a filter of this length is sent as a POST body.
pub fn uses_request_body(filter: &str) -> bool {
    filter.chars().count() >= QUERY_BODY_THRESHOLD
}

#[derive(Clone, Copy, Debug)]
enum Endpoint {
    Query,
    Search,
}

impl Endpoint {
    fn path(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Search => "search",
        }
    }

    fn filter_key(&self) -> &'static str {
        match self {
            Self::Query => "where",
            Self::Search => "query",
        }
    }
}

/// Service for query and search operations.
pub struct SearchService<'a, T: HttpTransport, M: TokenManager> {
    client: &'a BullhornClient<T, M>,
}

impl<'a, T: HttpTransport, M: TokenManager> SearchService<'a, T, M> {
    pub fn new(client: &'a BullhornClient<T, M>) -> Self {
        Self { client }
    }

    /// Runs a `where` query against `query/{entity}`.
    pub async fn query<R: DeserializeOwned>(
        &self,
        entity: &str,
        where_clause: &str,
        options: &QueryOptions,
    ) -> BullhornResult<QueryPage<R>> {
        self.execute(Endpoint::Query, entity, where_clause, options).await
    }

    /// Runs a Lucene search against `search/{entity}`.
    pub async fn search<R: DeserializeOwned>(
        &self,
        entity: &str,
        query: &str,
        options: &QueryOptions,
    ) -> BullhornResult<QueryPage<R>> {
        self.execute(Endpoint::Search, entity, query, options).await
    }

    /// Collects every matching record of a query, page by page.
    pub async fn query_all<R: DeserializeOwned>(
        &self,
        entity: &str,
        where_clause: &str,
        options: &QueryOptions,
    ) -> BullhornResult<Vec<R>> {
        self.collect(Endpoint::Query, entity, where_clause, options).await
    }

    /// Collects every matching record of a search, page by page.
    pub async fn search_all<R: DeserializeOwned>(
        &self,
        entity: &str,
        query: &str,
        options: &QueryOptions,
    ) -> BullhornResult<Vec<R>> {
        self.collect(Endpoint::Search, entity, query, options).await
    }

    async fn collect<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        entity: &str,
        filter: &str,
        options: &QueryOptions,
    ) -> BullhornResult<Vec<R>> {
        let mut records = Vec::new();
        let mut start = options.start.unwrap_or(0);

        loop {
            let page_options = options.clone().start(start).count(MAX_RECORDS);
            let page: QueryPage<R> = self.execute(endpoint, entity, filter, &page_options).await?;
            let received = page.data.len();
            records.extend(page.data);

            let reached_total = page
                .total
                .map(|total| u64::from(start) + received as u64 >= total)
                .unwrap_or(false);
            if received < MAX_RECORDS as usize || reached_total {
                break;
            }
            start += received as u32;
        }

        tracing::debug!(entity, records = records.len(), "Collected all pages");
        Ok(records)
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        entity: &str,
        filter: &str,
        options: &QueryOptions,
    ) -> BullhornResult<QueryPage<R>> {
        check_entity_name(entity)?;

        let (method, request) = if uses_request_body(filter) {
            let mut body = options.to_json();
            body.insert(endpoint.filter_key().to_string(), Value::from(filter));
            (HttpMethod::Post, RequestOptions::new().body(Value::Object(body)))
        } else {
            let pairs = options
                .to_pairs()
                .into_iter()
                .filter(|(key, _)| key != endpoint.filter_key());
            let request = RequestOptions::new()
                .query_param(endpoint.filter_key(), filter)
                .query_pairs(pairs);
            (HttpMethod::Get, request)
        };

        self.client
            .request_json(method, [endpoint.path(), entity], request)
            .await
    }
}
