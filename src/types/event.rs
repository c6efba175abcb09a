//! Event Subscription Types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entity event delivered by a subscription.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionEvent {
    pub event_id: String,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub event_timestamp: Option<i64>,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub entity_id: Option<i64>,
    #[serde(default)]
    pub entity_event_type: Option<String>,
    #[serde(default)]
    pub updated_properties: Vec<String>,
    #[serde(default)]
    pub event_metadata: Option<Value>,
}

/// A decoded batch of events.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBatch {
    /// Cursor identifying this batch; pass it back to re-read the batch.
    pub request_id: i64,
    #[serde(default)]
    pub events: Vec<SubscriptionEvent>,
}

/// Outcome of polling a subscription.
///
/// `NoEvents` is the zero-length response; a batch with an empty `events`
/// list is a different, decoded answer.
#[derive(Clone, Debug)]
pub enum EventPoll {
    NoEvents,
    Batch(EventBatch),
}

impl EventPoll {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::NoEvents => true,
            Self::Batch(batch) => batch.events.is_empty(),
        }
    }

    pub fn events(&self) -> &[SubscriptionEvent] {
        match self {
            Self::NoEvents => &[],
            Self::Batch(batch) => &batch.events,
        }
    }

    pub fn request_id(&self) -> Option<i64> {
        match self {
            Self::NoEvents => None,
            Self::Batch(batch) => Some(batch.request_id),
        }
    }
}
