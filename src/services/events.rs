//! Event subscription polling.
//!
//! Bullhorn does not document ordering or delivery guarantees for the
//! `requestId` cursor; consumers should tolerate both gaps and repeats.

use serde_json::Value;

use crate::client::{BullhornClient, RequestOptions};
use crate::core::{HttpMethod, HttpTransport};
use crate::error::{BullhornResult, ProtocolError};
use crate::token::TokenManager;
use crate::types::{EventBatch, EventPoll};

/// Service for event subscription operations.
pub struct EventService<'a, T: HttpTransport, M: TokenManager> {
    client: &'a BullhornClient<T, M>,
}

impl<'a, T: HttpTransport, M: TokenManager> EventService<'a, T, M> {
    pub fn new(client: &'a BullhornClient<T, M>) -> Self {
        Self { client }
    }

    /// Polls `event/subscription/{id}`.
    ///
    /// With `request_id` set, the batch identified by that cursor is read
    /// again instead of fetching new events.
    pub async fn poll_events(
        &self,
        subscription_id: &str,
        max_events: u32,
        request_id: Option<i64>,
    ) -> BullhornResult<EventPoll> {
        let mut options = RequestOptions::new().query_param("maxEvents", max_events.to_string());
        if let Some(request_id) = request_id {
            options = options.query_param("requestId", request_id.to_string());
        }

        let response = self
            .client
            .dispatch(HttpMethod::Get, ["event", "subscription", subscription_id], options)
            .await?;

        if response.body.trim().is_empty() {
            tracing::debug!(subscription_id, "No new events");
            return Ok(EventPoll::NoEvents);
        }

        let batch: EventBatch = response.json()?;
        tracing::debug!(
            subscription_id,
            request_id = batch.request_id,
            events = batch.events.len(),
            "Polled events"
        );
        Ok(EventPoll::Batch(batch))
    }

    /// Cursor of the last batch delivered: `event/subscription/{id}/lastRequestId`.
    pub async fn last_capture_id(&self, subscription_id: &str) -> BullhornResult<i64> {
        let value: Value = self
            .client
            .request_json(
                HttpMethod::Get,
                ["event", "subscription", subscription_id, "lastRequestId"],
                RequestOptions::new(),
            )
            .await?;

        let id = match &value {
            Value::Object(map) => map.get("result").or_else(|| map.get("lastRequestId")),
            other => Some(other),
        };
        id.and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .ok_or_else(|| {
                ProtocolError::InvalidResponse {
                    message: format!("unexpected lastRequestId response: {value}"),
                }
                .into()
            })
    }

    /// Re-reads the last delivered batch.
    pub async fn recapture(
        &self,
        subscription_id: &str,
        max_events: u32,
    ) -> BullhornResult<EventPoll> {
        let request_id = self.last_capture_id(subscription_id).await?;
        tracing::info!(subscription_id, request_id, "Recapturing event batch");
        self.poll_events(subscription_id, max_events, Some(request_id)).await
    }
}
