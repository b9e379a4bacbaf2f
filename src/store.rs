use crate::errors::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Entry point of an embedded key-value store: hands out database handles.
#[async_trait]
pub trait EmbeddedStore: Send + Sync {
    async fn open(&self, database: &str) -> Result<Box<dyn StoreDatabase>, StoreError>;
}

#[async_trait]
pub trait StoreDatabase: Send + Sync {
    fn has_collection(&self, name: &str) -> bool;

    async fn read_all(&self, name: &str) -> Result<Vec<Value>, StoreError>;
}

/// Store kept on disk as `<root>/<database>/<collection>.json`, each file a
/// JSON array of entries.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl EmbeddedStore for JsonDirStore {
    async fn open(&self, database: &str) -> Result<Box<dyn StoreDatabase>, StoreError> {
        let dir = self.root.join(database);
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(StoreError::DatabaseMissing(database.to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::DatabaseMissing(database.to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        let mut collections = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    collections.push(stem.to_string());
                }
            }
        }

        Ok(Box::new(JsonDirDatabase { dir, collections }))
    }
}

struct JsonDirDatabase {
    dir: PathBuf,
    collections: Vec<String>,
}

impl JsonDirDatabase {
    fn collection_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl StoreDatabase for JsonDirDatabase {
    fn has_collection(&self, name: &str) -> bool {
        self.collections.iter().any(|collection| collection == name)
    }

    async fn read_all(&self, name: &str) -> Result<Vec<Value>, StoreError> {
        if !self.has_collection(name) {
            return Err(StoreError::CollectionMissing(name.to_string()));
        }
        read_collection(&self.collection_path(name)).await
    }
}

async fn read_collection(path: &Path) -> Result<Vec<Value>, StoreError> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// In-process store; databases and collections exist once inserted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    databases: HashMap<String, HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(
        mut self,
        database: &str,
        collection: &str,
        entries: Vec<Value>,
    ) -> Self {
        self.databases
            .entry(database.to_string())
            .or_default()
            .insert(collection.to_string(), entries);
        self
    }
}

#[async_trait]
impl EmbeddedStore for MemoryStore {
    async fn open(&self, database: &str) -> Result<Box<dyn StoreDatabase>, StoreError> {
        let collections = self
            .databases
            .get(database)
            .cloned()
            .ok_or_else(|| StoreError::DatabaseMissing(database.to_string()))?;
        Ok(Box::new(MemoryDatabase { collections }))
    }
}

struct MemoryDatabase {
    collections: HashMap<String, Vec<Value>>,
}

#[async_trait]
impl StoreDatabase for MemoryDatabase {
    fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    async fn read_all(&self, name: &str) -> Result<Vec<Value>, StoreError> {
        self.collections
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::CollectionMissing(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unique_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("analytics_store_{tag}_{}_{nanos}", std::process::id()))
    }

    #[tokio::test]
    async fn json_dir_store_reads_collection_files() {
        let root = unique_dir("read");
        let db_dir = root.join("PrintingStoreDB");
        fs::create_dir_all(&db_dir).await.unwrap();
        fs::write(
            db_dir.join("orders.json"),
            serde_json::to_vec(&json!([{ "orderId": "A" }, { "orderId": "B" }])).unwrap(),
        )
        .await
        .unwrap();

        let store = JsonDirStore::new(root.clone());
        let db = store.open("PrintingStoreDB").await.unwrap();
        assert!(db.has_collection("orders"));
        assert!(!db.has_collection("customers"));
        assert_eq!(db.read_all("orders").await.unwrap().len(), 2);

        fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn json_dir_store_reports_missing_database() {
        let store = JsonDirStore::new(unique_dir("missing"));
        let result = store.open("PrintingStoreDB").await;
        assert!(matches!(result, Err(StoreError::DatabaseMissing(_))));
    }

    #[tokio::test]
    async fn memory_store_reports_missing_collection() {
        let store = MemoryStore::new().with_collection("db", "orders", vec![json!({})]);
        let db = store.open("db").await.unwrap();
        assert!(matches!(
            db.read_all("refunds").await,
            Err(StoreError::CollectionMissing(_))
        ));
    }
}
