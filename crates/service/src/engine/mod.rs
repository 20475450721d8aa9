//! Collection mutation engine.
//!
//! One generic [`Collection`] serves every resource type. A resource only
//! describes its collection name, key field, required fields and how a payload
//! becomes a new record; the engine owns key generation, validation, lookup and
//! the read-modify-persist cycle.
//!
//! Stored records stay plain JSON objects. Nothing beyond the primary key is read
//! from them, so a record written by another tool with unexpected fields or types
//! never blocks the rest of its collection.

pub mod keys;
pub mod validate;

use std::{borrow::Cow, collections::HashSet, marker::PhantomData, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

pub use keys::KeyStrategy;
pub use validate::{FieldKind, FieldRule};

/// Per-resource configuration of the engine.
pub trait Resource: Send + Sync + 'static {
    /// Typed form of a create body.
    type Payload: DeserializeOwned + Send;

    /// Field of the backing document holding this collection.
    const COLLECTION: &'static str;
    /// Name of the primary key field.
    const PRIMARY_KEY: &'static str;
    /// Message for an incomplete payload.
    const MISSING_DATA: &'static str;
    /// Message for an unknown key.
    const NOT_FOUND: &'static str;
    /// Acknowledgment for a bulk delete.
    const DELETED: &'static str;

    fn required_fields() -> Vec<FieldRule>;

    /// Fields of a new record in document order, optional ones defaulted.
    /// The engine puts the generated key in front.
    fn fields(payload: Self::Payload) -> Vec<(&'static str, Value)>;
}

/// Primary key of a stored record. Integer keys read as their decimal form.
pub fn record_key<'a>(record: &'a Value, field: &str) -> Option<Cow<'a, str>> {
    match record.get(field)? {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// Position of the record whose key equals `id` exactly.
pub fn locate<R: Resource>(records: &[Value], id: &str) -> Option<usize> {
    records.iter().position(|r| record_key(r, R::PRIMARY_KEY).as_deref() == Some(id))
}

/// Overwrite every field `payload` carries except the primary key.
pub fn merge<R: Resource>(record: &mut Value, payload: Map<String, Value>) {
    if let Value::Object(fields) = record {
        for (name, value) in payload {
            if name != R::PRIMARY_KEY {
                fields.insert(name, value);
            }
        }
    }
}

/// Engine handle for one collection of the shared document.
pub struct Collection<R: Resource> {
    store: Arc<dyn DocumentStore>,
    rules: Vec<FieldRule>,
    keys: KeyStrategy,
    lock: Mutex<()>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Collection<R> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_rules(store, R::required_fields())
    }

    pub fn with_rules(store: Arc<dyn DocumentStore>, rules: Vec<FieldRule>) -> Self {
        Self { store, rules, keys: KeyStrategy::default(), lock: Mutex::new(()), _resource: PhantomData }
    }

    pub fn key_strategy(mut self, keys: KeyStrategy) -> Self {
        self.keys = keys;
        self
    }

    /// Hand the new collection to the store; it is either flushed or not installed at all.
    async fn commit(&self, previous: Vec<Value>, records: Vec<Value>) -> Result<(), ServiceError> {
        self.store.replace(R::COLLECTION, records, previous).await.map_err(|e| {
            error!(collection = R::COLLECTION, error = %e, "persist failed, collection left unchanged");
            e
        })
    }

    fn check(&self, payload: &Value) -> Result<(), ServiceError> {
        validate::require_fields(&self.rules, payload, R::MISSING_DATA)
    }

    pub async fn list(&self) -> Vec<Value> {
        self.store.get(R::COLLECTION).await
    }

    pub async fn get(&self, id: &str) -> Result<Value, ServiceError> {
        let mut records = self.list().await;
        let pos = locate::<R>(&records, id).ok_or_else(|| ServiceError::not_found(R::NOT_FOUND))?;
        Ok(records.swap_remove(pos))
    }

    /// Validate, assign the next key, append and persist.
    pub async fn create(&self, payload: Value) -> Result<Value, ServiceError> {
        self.check(&payload)?;
        let payload: R::Payload = validate::decode_payload(payload, R::MISSING_DATA)?;

        let _guard = self.lock.lock().await;
        let previous = self.store.get(R::COLLECTION).await;
        let key = {
            let existing: Vec<Cow<'_, str>> = previous
                .iter()
                .map(|r| record_key(r, R::PRIMARY_KEY).unwrap_or_default())
                .collect();
            let existing: Vec<&str> = existing.iter().map(|k| &**k).collect();
            keys::next_key(&existing, self.keys)
                .ok_or_else(|| ServiceError::Persistence(format!("no free key left in `{}`", R::COLLECTION)))?
        };

        let mut fields = Map::new();
        fields.insert(R::PRIMARY_KEY.to_string(), Value::String(key.clone()));
        for (name, value) in R::fields(payload) {
            fields.insert(name.to_string(), value);
        }
        let record = Value::Object(fields);

        let mut records = previous.clone();
        records.push(record.clone());
        self.commit(previous, records).await?;

        info!(collection = R::COLLECTION, id = %key, "record created");
        Ok(record)
    }

    /// Validate, merge into the record with key `id` in place, and persist.
    pub async fn update(&self, id: &str, payload: Value) -> Result<Value, ServiceError> {
        self.check(&payload)?;
        let Value::Object(payload) = payload else {
            return Err(ServiceError::invalid(R::MISSING_DATA));
        };

        let _guard = self.lock.lock().await;
        let previous = self.store.get(R::COLLECTION).await;
        let pos = locate::<R>(&previous, id).ok_or_else(|| ServiceError::not_found(R::NOT_FOUND))?;
        let mut records = previous.clone();
        merge::<R>(&mut records[pos], payload);
        let updated = records[pos].clone();
        self.commit(previous, records).await?;

        info!(collection = R::COLLECTION, id, "record updated");
        Ok(updated)
    }

    /// Drop every record whose key appears in the body's `ids` array.
    ///
    /// Returns how many records were removed; unknown ids are ignored.
    pub async fn bulk_delete(&self, payload: &Value) -> Result<usize, ServiceError> {
        let ids = validate::parse_ids(payload)?;
        let purge: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let _guard = self.lock.lock().await;
        let previous = self.store.get(R::COLLECTION).await;
        let records: Vec<Value> = previous
            .iter()
            .filter(|r| !record_key(r, R::PRIMARY_KEY).is_some_and(|k| purge.contains(&*k)))
            .cloned()
            .collect();
        let removed = previous.len() - records.len();
        self.commit(previous, records).await?;

        info!(collection = R::COLLECTION, requested = ids.len(), removed, "bulk delete applied");
        Ok(removed)
    }

    pub async fn delete(&self, id: &str) -> Result<Value, ServiceError> {
        let _guard = self.lock.lock().await;
        let previous = self.store.get(R::COLLECTION).await;
        let pos = locate::<R>(&previous, id).ok_or_else(|| ServiceError::not_found(R::NOT_FOUND))?;
        let mut records = previous.clone();
        let removed = records.remove(pos);
        self.commit(previous, records).await?;

        info!(collection = R::COLLECTION, id, "record deleted");
        Ok(removed)
    }
}
