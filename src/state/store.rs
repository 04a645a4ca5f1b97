use crate::error::{AppError, Result};
use crate::models::{Emergency, User};
use crate::state::{EmergencyFilter, EmergencyStore, UserStore};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use uuid::Uuid;

/// In-memory store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    emergencies: Arc<DashMap<Uuid, Emergency>>,
    users: Arc<DashMap<Uuid, User>>,
    username_index: Arc<DashMap<String, Uuid>>,
    /// Keyed by lowercased email
    email_index: Arc<DashMap<String, Uuid>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            emergencies: Arc::new(DashMap::new()),
            users: Arc::new(DashMap::new()),
            username_index: Arc::new(DashMap::new()),
            email_index: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmergencyStore for InMemoryStore {
    async fn save_emergency(&self, emergency: &Emergency) -> Result<()> {
        self.emergencies.insert(emergency.id, emergency.clone());
        tracing::debug!(emergency_id = %emergency.id, "Emergency saved");
        Ok(())
    }

    async fn get_emergency(&self, id: &Uuid) -> Result<Option<Emergency>> {
        Ok(self.emergencies.get(id).map(|entry| entry.clone()))
    }

    async fn update_emergency(&self, emergency: &Emergency) -> Result<()> {
        if self.emergencies.contains_key(&emergency.id) {
            self.emergencies.insert(emergency.id, emergency.clone());
            tracing::debug!(emergency_id = %emergency.id, "Emergency updated");
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Emergency {} not found",
                emergency.id
            )))
        }
    }

    async fn list_emergencies(&self, filter: &EmergencyFilter) -> Result<Vec<Emergency>> {
        let mut emergencies: Vec<Emergency> = self
            .emergencies
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|emergency| filter.matches(emergency))
            .collect();

        // Newest first
        emergencies.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(emergencies)
    }

    async fn count_emergencies(&self, filter: &EmergencyFilter) -> Result<u64> {
        let count = self
            .emergencies
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count();

        Ok(count as u64)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn save_user(&self, user: &User) -> Result<()> {
        let conflict = || AppError::Conflict("Username or email already exists".to_string());

        match self.username_index.entry(user.username.clone()) {
            Entry::Occupied(_) => return Err(conflict()),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        match self.email_index.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => {
                self.username_index.remove(&user.username);
                return Err(conflict());
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        self.users.insert(user.id, user.clone());
        tracing::debug!(user_id = %user.id, username = %user.username, "User saved");
        Ok(())
    }

    async fn get_user(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self.users.get(id).map(|entry| entry.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let id = match self.username_index.get(username) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let id = match self.email_index.get(&email.to_lowercase()) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool> {
        match self.username_index.remove(username) {
            Some((_, id)) => {
                if let Some((_, user)) = self.users.remove(&id) {
                    self.email_index.remove(&user.email.to_lowercase());
                }
                tracing::debug!(user_id = %id, username = %username, "User deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
