use crate::error::{AppError, Result};
use crate::models::{Emergency, User};
use crate::state::{EmergencyFilter, EmergencyStore, UserStore};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Persistent store using Sled embedded database
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    emergencies_tree: sled::Tree,
    users_tree: sled::Tree,
    usernames_tree: sled::Tree,
    /// Lowercased email -> user id
    emails_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref();
        let db = sled::open(&path).map_err(|e| {
            AppError::Database(format!("Failed to open Sled database: {}", e))
        })?;

        let emergencies_tree = db.open_tree("emergencies").map_err(|e| {
            AppError::Database(format!("Failed to open emergencies tree: {}", e))
        })?;

        let users_tree = db.open_tree("users").map_err(|e| {
            AppError::Database(format!("Failed to open users tree: {}", e))
        })?;

        let usernames_tree = db.open_tree("usernames").map_err(|e| {
            AppError::Database(format!("Failed to open usernames tree: {}", e))
        })?;

        let emails_tree = db.open_tree("emails").map_err(|e| {
            AppError::Database(format!("Failed to open emails tree: {}", e))
        })?;

        tracing::info!("Initialized Sled store at {:?}", path_str);

        Ok(Self {
            db: Arc::new(db),
            emergencies_tree,
            users_tree,
            usernames_tree,
            emails_tree,
        })
    }

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize record: {}", e)))
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to deserialize record: {}", e)))
    }

    /// Bind `key` to `id` unless another id already holds it
    fn claim(tree: &sled::Tree, key: &[u8], id: &Uuid) -> Result<bool> {
        let swapped = tree
            .compare_and_swap(key, None as Option<&[u8]>, Some(Self::id_key(id)))
            .map_err(|e| AppError::Database(format!("Failed to update index: {}", e)))?;
        Ok(swapped.is_ok())
    }

    /// Drop `key` only while it still points at `id`
    fn release(tree: &sled::Tree, key: &[u8], id: &Uuid) -> Result<()> {
        let _ = tree
            .compare_and_swap(key, Some(Self::id_key(id)), None as Option<&[u8]>)
            .map_err(|e| AppError::Database(format!("Failed to update index: {}", e)))?;
        Ok(())
    }

    fn lookup(tree: &sled::Tree, key: &[u8]) -> Result<Option<Uuid>> {
        let id_bytes = tree
            .get(key)
            .map_err(|e| AppError::Database(format!("Failed to query index: {}", e)))?;

        id_bytes
            .map(|bytes| {
                Uuid::from_slice(&bytes)
                    .map_err(|e| AppError::Database(format!("Corrupt index entry: {}", e)))
            })
            .transpose()
    }

    fn id_key(id: &Uuid) -> Vec<u8> {
        id.as_bytes().to_vec()
    }

    fn scan_emergencies(&self, filter: &EmergencyFilter) -> Result<Vec<Emergency>> {
        let mut emergencies = Vec::new();

        for result in self.emergencies_tree.iter() {
            let (_, value) = result.map_err(|e| {
                AppError::Database(format!("Failed to iterate emergencies: {}", e))
            })?;

            let emergency: Emergency = Self::decode(&value)?;
            if filter.matches(&emergency) {
                emergencies.push(emergency);
            }
        }

        Ok(emergencies)
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await.map_err(|e| {
            AppError::Database(format!("Failed to flush database: {}", e))
        })?;
        Ok(())
    }
}

#[async_trait]
impl EmergencyStore for SledStore {
    async fn save_emergency(&self, emergency: &Emergency) -> Result<()> {
        let key = Self::id_key(&emergency.id);
        let value = Self::encode(emergency)?;

        self.emergencies_tree.insert(key, value).map_err(|e| {
            AppError::Database(format!("Failed to save emergency: {}", e))
        })?;

        self.emergencies_tree.flush().map_err(|e| {
            AppError::Database(format!("Failed to flush emergencies tree: {}", e))
        })?;

        tracing::debug!(emergency_id = %emergency.id, "Emergency saved to Sled");
        Ok(())
    }

    async fn get_emergency(&self, id: &Uuid) -> Result<Option<Emergency>> {
        match self.emergencies_tree.get(Self::id_key(id)) {
            Ok(Some(bytes)) => Ok(Some(Self::decode(&bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(AppError::Database(format!(
                "Failed to get emergency: {}",
                e
            ))),
        }
    }

    async fn update_emergency(&self, emergency: &Emergency) -> Result<()> {
        let key = Self::id_key(&emergency.id);

        if !self.emergencies_tree.contains_key(&key).map_err(|e| {
            AppError::Database(format!("Failed to check emergency existence: {}", e))
        })? {
            return Err(AppError::NotFound(format!(
                "Emergency {} not found",
                emergency.id
            )));
        }

        let value = Self::encode(emergency)?;
        self.emergencies_tree.insert(key, value).map_err(|e| {
            AppError::Database(format!("Failed to update emergency: {}", e))
        })?;

        self.emergencies_tree.flush().map_err(|e| {
            AppError::Database(format!("Failed to flush emergencies tree: {}", e))
        })?;

        tracing::debug!(emergency_id = %emergency.id, "Emergency updated in Sled");
        Ok(())
    }

    async fn list_emergencies(&self, filter: &EmergencyFilter) -> Result<Vec<Emergency>> {
        let mut emergencies = self.scan_emergencies(filter)?;

        // Sort by report time (newest first)
        emergencies.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(emergencies)
    }

    async fn count_emergencies(&self, filter: &EmergencyFilter) -> Result<u64> {
        Ok(self.scan_emergencies(filter)?.len() as u64)
    }
}

#[async_trait]
impl UserStore for SledStore {
    async fn save_user(&self, user: &User) -> Result<()> {
        let conflict = || AppError::Conflict("Username or email already exists".to_string());
        let email_key = user.email.to_lowercase();

        // Both claims are atomic; a lost race surfaces as a conflict
        if !Self::claim(&self.usernames_tree, user.username.as_bytes(), &user.id)? {
            return Err(conflict());
        }
        if !Self::claim(&self.emails_tree, email_key.as_bytes(), &user.id)? {
            Self::release(&self.usernames_tree, user.username.as_bytes(), &user.id)?;
            return Err(conflict());
        }

        let value = Self::encode(user)?;
        self.users_tree
            .insert(Self::id_key(&user.id), value)
            .map_err(|e| AppError::Database(format!("Failed to save user: {}", e)))?;

        self.db.flush().map_err(|e| {
            AppError::Database(format!("Failed to flush database: {}", e))
        })?;

        tracing::debug!(user_id = %user.id, username = %user.username, "User saved to Sled");
        Ok(())
    }

    async fn get_user(&self, id: &Uuid) -> Result<Option<User>> {
        match self.users_tree.get(Self::id_key(id)) {
            Ok(Some(bytes)) => Ok(Some(Self::decode(&bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(AppError::Database(format!("Failed to get user: {}", e))),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        match Self::lookup(&self.usernames_tree, username.as_bytes())? {
            Some(id) => self.get_user(&id).await,
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        match Self::lookup(&self.emails_tree, email.to_lowercase().as_bytes())? {
            Some(id) => self.get_user(&id).await,
            None => Ok(None),
        }
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool> {
        let removed = self
            .usernames_tree
            .remove(username.as_bytes())
            .map_err(|e| AppError::Database(format!("Failed to update username index: {}", e)))?;

        let Some(id_bytes) = removed else {
            return Ok(false);
        };

        let removed_user = self
            .users_tree
            .remove(&id_bytes)
            .map_err(|e| AppError::Database(format!("Failed to delete user: {}", e)))?;

        if let Some(bytes) = removed_user {
            let user: User = Self::decode(&bytes)?;
            Self::release(&self.emails_tree, user.email.to_lowercase().as_bytes(), &user.id)?;
        }

        self.db.flush().map_err(|e| {
            AppError::Database(format!("Failed to flush database: {}", e))
        })?;

        tracing::debug!(username = %username, "User deleted from Sled");
        Ok(true)
    }
}
