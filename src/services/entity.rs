//! Bullhorn entity operations: CRUD and to-many relations.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{BullhornClient, RequestOptions};
use crate::core::{HttpMethod, HttpTransport};
use crate::error::{ArgumentError, BullhornError, BullhornResult};
use crate::token::TokenManager;
use crate::types::{ChangeResponse, EntityResponse, QueryOptions, QueryPage};

/// Entity types Bullhorn refuses to delete.
pub const IMMUTABLE_ENTITIES: [&str; 8] = [
    "BusinessSector",
    "Category",
    "Country",
    "ClientCorporation",
    "Skill",
    "Specialty",
    "State",
    "TimeUnit",
];

/// Whether `entity` is in [`IMMUTABLE_ENTITIES`], ignoring ASCII case.
pub fn is_immutable(entity: &str) -> bool {
    IMMUTABLE_ENTITIES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(entity))
}

/// A non-empty list of entity identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityIds(Vec<i64>);

impl EntityIds {
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Comma-joined decimal form used in resource paths.
    pub fn to_path_segment(&self) -> String {
        self.0
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn from_vec(ids: Vec<i64>) -> BullhornResult<Self> {
        if ids.is_empty() {
            return Err(ArgumentError::invalid("entity ids must not be empty").into());
        }
        Ok(Self(ids))
    }
}

/// Conversion into [`EntityIds`], validated before any request is built.
pub trait IntoEntityIds {
    fn into_entity_ids(self) -> BullhornResult<EntityIds>;
}

impl IntoEntityIds for EntityIds {
    fn into_entity_ids(self) -> BullhornResult<EntityIds> {
        Ok(self)
    }
}

impl IntoEntityIds for i64 {
    fn into_entity_ids(self) -> BullhornResult<EntityIds> {
        Ok(EntityIds(vec![self]))
    }
}

impl IntoEntityIds for Vec<i64> {
    fn into_entity_ids(self) -> BullhornResult<EntityIds> {
        EntityIds::from_vec(self)
    }
}

impl IntoEntityIds for &[i64] {
    fn into_entity_ids(self) -> BullhornResult<EntityIds> {
        EntityIds::from_vec(self.to_vec())
    }
}

impl<const N: usize> IntoEntityIds for [i64; N] {
    fn into_entity_ids(self) -> BullhornResult<EntityIds> {
        EntityIds::from_vec(self.to_vec())
    }
}

/// Accepts a JSON integer or a non-empty array of JSON integers.
impl IntoEntityIds for &Value {
    fn into_entity_ids(self) -> BullhornResult<EntityIds> {
        let not_an_id = |value: &Value| {
            BullhornError::from(ArgumentError::invalid(format!(
                "entity ids should be an integer or a list of integers, got {value}"
            )))
        };
        match self {
            Value::Number(n) => n
                .as_i64()
                .map(|id| EntityIds(vec![id]))
                .ok_or_else(|| not_an_id(self)),
            Value::Array(items) => {
                let ids = items
                    .iter()
                    .map(|item| item.as_i64().ok_or_else(|| not_an_id(item)))
                    .collect::<BullhornResult<Vec<_>>>()?;
                EntityIds::from_vec(ids)
            }
            other => Err(not_an_id(other)),
        }
    }
}

/// Normalize identifiers to the comma-joined decimal form.
pub fn identifier_list(ids: impl IntoEntityIds) -> BullhornResult<String> {
    Ok(ids.into_entity_ids()?.to_path_segment())
}

pub(crate) fn check_entity_name(entity: &str) -> BullhornResult<()> {
    if entity.is_empty() || entity.contains('/') {
        return Err(ArgumentError::invalid(format!("invalid entity type name '{entity}'")).into());
    }
    Ok(())
}

fn check_relation_name(relation: &str) -> BullhornResult<()> {
    if relation.is_empty() || relation.contains('/') {
        return Err(ArgumentError::invalid(format!("invalid association name '{relation}'")).into());
    }
    Ok(())
}

/// Service for entity operations.
pub struct EntityService<'a, T: HttpTransport, M: TokenManager> {
    client: &'a BullhornClient<T, M>,
}

impl<'a, T: HttpTransport, M: TokenManager> EntityService<'a, T, M> {
    pub fn new(client: &'a BullhornClient<T, M>) -> Self {
        Self { client }
    }

    /// Reads one or more entities: `GET entity/{type}/{ids}`.
    pub async fn read<R: DeserializeOwned>(
        &self,
        entity: &str,
        ids: impl IntoEntityIds,
        options: &QueryOptions,
    ) -> BullhornResult<EntityResponse<R>> {
        check_entity_name(entity)?;
        let ids = identifier_list(ids)?;
        self.client
            .request_json(
                HttpMethod::Get,
                ["entity", entity, ids.as_str()],
                RequestOptions::new().query_pairs(options.to_pairs()),
            )
            .await
    }

    /// Reads a to-many association: `GET entity/{type}/{ids}/{relation}`.
    pub async fn read_related<R: DeserializeOwned>(
        &self,
        entity: &str,
        ids: impl IntoEntityIds,
        relation: &str,
        options: &QueryOptions,
    ) -> BullhornResult<QueryPage<R>> {
        check_entity_name(entity)?;
        check_relation_name(relation)?;
        let ids = identifier_list(ids)?;
        self.client
            .request_json(
                HttpMethod::Get,
                ["entity", entity, ids.as_str(), relation],
                RequestOptions::new().query_pairs(options.to_pairs()),
            )
            .await
    }

    /// Creates an entity: `PUT entity/{type}`.
    pub async fn create(&self, entity: &str, payload: &Value) -> BullhornResult<ChangeResponse> {
        check_entity_name(entity)?;
        self.client
            .request_json(
                HttpMethod::Put,
                ["entity", entity],
                RequestOptions::new().body(payload.clone()),
            )
            .await
    }

    /// Updates an entity: `POST entity/{type}/{payload.id}`.
    pub async fn update(&self, entity: &str, payload: &Value) -> BullhornResult<ChangeResponse> {
        check_entity_name(entity)?;
        let id = payload
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| ArgumentError::invalid("update payload must carry an integer 'id'"))?;
        self.client
            .request_json(
                HttpMethod::Post,
                ["entity", entity, id.to_string().as_str()],
                RequestOptions::new().body(payload.clone()),
            )
            .await
    }

    /// Deletes an entity: `DELETE entity/{type}/{id}`.
    pub async fn delete(&self, entity: &str, id: i64) -> BullhornResult<ChangeResponse> {
        check_entity_name(entity)?;
        if is_immutable(entity) {
            return Err(ArgumentError::ImmutableEntity {
                entity: entity.to_string(),
            }
            .into());
        }
        self.client
            .request_json(
                HttpMethod::Delete,
                ["entity", entity, id.to_string().as_str()],
                RequestOptions::new(),
            )
            .await
    }

    /// Adds to-many associations: `PUT entity/{type}/{id}/{relation}/{ids}`.
    pub async fn relate(
        &self,
        entity: &str,
        id: i64,
        relation: &str,
        related_ids: impl IntoEntityIds,
    ) -> BullhornResult<ChangeResponse> {
        self.association(HttpMethod::Put, entity, id, relation, related_ids)
            .await
    }

    /// Removes to-many associations: `DELETE entity/{type}/{id}/{relation}/{ids}`.
    pub async fn unrelate(
        &self,
        entity: &str,
        id: i64,
        relation: &str,
        related_ids: impl IntoEntityIds,
    ) -> BullhornResult<ChangeResponse> {
        self.association(HttpMethod::Delete, entity, id, relation, related_ids)
            .await
    }

    async fn association(
        &self,
        method: HttpMethod,
        entity: &str,
        id: i64,
        relation: &str,
        related_ids: impl IntoEntityIds,
    ) -> BullhornResult<ChangeResponse> {
        check_entity_name(entity)?;
        check_relation_name(relation)?;
        let related = identifier_list(related_ids)?;
        self.client
            .request_json(
                method,
                [
                    "entity",
                    entity,
                    id.to_string().as_str(),
                    relation,
                    related.as_str(),
                ],
                RequestOptions::new(),
            )
            .await
    }
}
