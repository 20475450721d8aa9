use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::{
    fs,
    sync::{Mutex, RwLock},
};
use tracing::{debug, error};

use crate::errors::ServiceError;

/// Persistence contract the mutation engine talks to.
///
/// The backing document holds one array per collection. `set` only replaces the
/// in-memory copy; nothing reaches disk until `persist` flushes the whole document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Current records of `collection`, empty if the collection does not exist yet.
    async fn get(&self, collection: &str) -> Vec<Value>;
    /// Replace the records of `collection`.
    async fn set(&self, collection: &str, records: Vec<Value>);
    /// Flush the entire document to durable storage.
    async fn persist(&self) -> Result<(), ServiceError>;

    /// Replace `collection` and flush, or leave the store as it was.
    ///
    /// The default goes through `set` + `persist` and puts `previous` back when the
    /// flush fails. Stores that can flush a candidate document before installing it
    /// should override this so readers never observe an unflushed collection.
    async fn replace(&self, collection: &str, records: Vec<Value>, previous: Vec<Value>) -> Result<(), ServiceError> {
        self.set(collection, records).await;
        if let Err(e) = self.persist().await {
            self.set(collection, previous).await;
            return Err(e);
        }
        Ok(())
    }
}

/// JSON file-backed document store.
///
/// Keeps the whole document in memory and rewrites the file on every `persist`,
/// going through a sibling temp file and a rename so a failed write never leaves
/// a truncated document behind.
pub struct JsonDocumentStore {
    inner: RwLock<Map<String, Value>>,
    file_path: PathBuf,
    flush: Mutex<()>,
}

impl JsonDocumentStore {
    /// Open the document at `path`, creating an empty one if the file is missing.
    ///
    /// A file that exists but is not a JSON object is an error rather than being
    /// silently replaced.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::persistence)?;
            }
        }

        let document = match fs::read(&file_path).await {
            Ok(bytes) => parse_document(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = Map::new();
                let data = serde_json::to_vec_pretty(&empty).map_err(ServiceError::persistence)?;
                fs::write(&file_path, data).await.map_err(ServiceError::persistence)?;
                empty
            }
            Err(e) => return Err(ServiceError::persistence(e)),
        };

        Ok(Arc::new(Self { inner: RwLock::new(document), file_path, flush: Mutex::new(()) }))
    }

    pub fn path(&self) -> &std::path::Path { &self.file_path }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    /// Write `doc` through the temp file. Callers hold `flush`.
    async fn write_document(&self, doc: &Map<String, Value>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc).map_err(ServiceError::persistence)?;

        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, &data).await {
            error!(path = %tmp.display(), error = %e, "failed to write temp document");
            return Err(ServiceError::persistence(e));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            error!(path = %self.file_path.display(), error = %e, "failed to replace document");
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::persistence(e));
        }
        debug!(path = %self.file_path.display(), bytes = data.len(), "document persisted");
        Ok(())
    }
}

fn parse_document(bytes: &[u8]) -> Result<Map<String, Value>, ServiceError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes).map_err(ServiceError::persistence)? {
        Value::Object(map) => Ok(map),
        _ => Err(ServiceError::Persistence("backing document must be a JSON object".into())),
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn get(&self, collection: &str) -> Vec<Value> {
        let doc = self.inner.read().await;
        match doc.get(collection) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    async fn set(&self, collection: &str, records: Vec<Value>) {
        let _flush = self.flush.lock().await;
        let mut doc = self.inner.write().await;
        doc.insert(collection.to_string(), Value::Array(records));
    }

    async fn persist(&self) -> Result<(), ServiceError> {
        let _flush = self.flush.lock().await;
        let doc = self.inner.read().await.clone();
        self.write_document(&doc).await
    }

    /// Flush a candidate document first and install it in memory only once it is
    /// on disk, so no other flush or read ever sees the uncommitted collection.
    async fn replace(&self, collection: &str, records: Vec<Value>, _previous: Vec<Value>) -> Result<(), ServiceError> {
        let _flush = self.flush.lock().await;
        let mut candidate = self.inner.read().await.clone();
        candidate.insert(collection.to_string(), Value::Array(records));
        self.write_document(&candidate).await?;
        *self.inner.write().await = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_file() -> PathBuf {
        std::env::temp_dir().join(format!("document_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn document_store_set_and_persist_survive_reload() -> Result<(), anyhow::Error> {
        let tmp = temp_file();
        let store = JsonDocumentStore::new(&tmp).await?;

        // missing collections read as empty
        assert!(store.get("productos").await.is_empty());

        store.set("productos", vec![json!({"id_producto": "1", "nombre": "Tornillo"})]).await;
        store.set("usuarios", vec![]).await;
        store.persist().await?;

        let reloaded = JsonDocumentStore::new(&tmp).await?;
        let productos = reloaded.get("productos").await;
        assert_eq!(productos.len(), 1);
        assert_eq!(productos[0]["nombre"], "Tornillo");
        assert!(reloaded.get("usuarios").await.is_empty());

        // no temp file left behind
        assert!(!store.temp_path().exists());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn set_without_persist_stays_in_memory() -> Result<(), anyhow::Error> {
        let tmp = temp_file();
        let store = JsonDocumentStore::new(&tmp).await?;
        store.set("tareas", vec![json!({"id_tarea": "1"})]).await;

        let reloaded = JsonDocumentStore::new(&tmp).await?;
        assert!(reloaded.get("tareas").await.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_replace_leaves_memory_and_disk_untouched() -> Result<(), anyhow::Error> {
        let tmp = temp_file();
        let store = JsonDocumentStore::new(&tmp).await?;
        let kept = vec![json!({"id_producto": "1", "nombre": "Tornillo"})];
        store.replace("productos", kept.clone(), Vec::new()).await?;

        // a directory squatting on the temp path makes the next write fail
        tokio::fs::create_dir(store.temp_path()).await?;
        let res = store.replace("productos", Vec::new(), kept.clone()).await;
        assert!(matches!(res, Err(ServiceError::Persistence(_))));
        assert_eq!(store.get("productos").await, kept);

        // a later flush for another collection must not leak the rejected state
        tokio::fs::remove_dir(store.temp_path()).await?;
        store.replace("usuarios", vec![json!({"id_usuario": "1"})], Vec::new()).await?;
        let reloaded = JsonDocumentStore::new(&tmp).await?;
        assert_eq!(reloaded.get("productos").await, kept);
        assert_eq!(reloaded.get("usuarios").await.len(), 1);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn document_keeps_field_order() -> Result<(), anyhow::Error> {
        let tmp = temp_file();
        let store = JsonDocumentStore::new(&tmp).await?;
        store
            .replace("productos", vec![json!({"id_producto": "1", "nombre": "Tornillo", "categoria": "F", "stock": 0})], Vec::new())
            .await?;

        let text = tokio::fs::read_to_string(&tmp).await?;
        let positions: Vec<usize> = ["id_producto", "nombre", "categoria", "stock"]
            .iter()
            .map(|field| text.find(field).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn non_object_document_is_rejected() -> Result<(), anyhow::Error> {
        let tmp = temp_file();
        tokio::fs::write(&tmp, b"[1, 2, 3]").await?;
        let res = JsonDocumentStore::new(&tmp).await;
        assert!(matches!(res, Err(ServiceError::Persistence(_))));

        tokio::fs::write(&tmp, b"{ not json").await?;
        assert!(JsonDocumentStore::new(&tmp).await.is_err());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn existing_document_is_loaded() -> Result<(), anyhow::Error> {
        let tmp = temp_file();
        tokio::fs::write(&tmp, br#"{"solicitudes":[{"id_solicitud":"7","estado":"pendiente"}]}"#).await?;
        let store = JsonDocumentStore::new(&tmp).await?;
        let solicitudes = store.get("solicitudes").await;
        assert_eq!(solicitudes[0]["id_solicitud"], "7");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
