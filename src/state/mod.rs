pub mod store;
pub mod sled_store;
pub mod factory;

pub use store::*;
pub use sled_store::SledStore;
pub use factory::{create_in_memory_store, create_store, Stores};

use crate::error::Result;
use crate::models::{Emergency, EmergencyStatus, Priority, User};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for emergency record storage
#[async_trait]
pub trait EmergencyStore: Send + Sync {
    /// Save a new emergency
    async fn save_emergency(&self, emergency: &Emergency) -> Result<()>;

    /// Get an emergency by ID
    async fn get_emergency(&self, id: &Uuid) -> Result<Option<Emergency>>;

    /// Replace an existing emergency
    async fn update_emergency(&self, emergency: &Emergency) -> Result<()>;

    /// List emergencies matching the filter, newest first
    async fn list_emergencies(&self, filter: &EmergencyFilter) -> Result<Vec<Emergency>>;

    /// Count emergencies matching filter
    async fn count_emergencies(&self, filter: &EmergencyFilter) -> Result<u64>;
}

/// Trait for account storage
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Save a new user; fails with `Conflict` when the username or email is taken
    async fn save_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID
    async fn get_user(&self, id: &Uuid) -> Result<Option<User>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Delete the user with this username, returning whether one existed
    async fn delete_by_username(&self, username: &str) -> Result<bool>;
}

/// Filter for querying emergencies
#[derive(Debug, Clone, Default)]
pub struct EmergencyFilter {
    pub statuses: Vec<EmergencyStatus>,
    pub priorities: Vec<Priority>,
    pub user_id: Option<Uuid>,
    pub responder: Option<Uuid>,
}

impl EmergencyFilter {
    pub fn matches(&self, emergency: &Emergency) -> bool {
        let status_match = self.statuses.is_empty() || self.statuses.contains(&emergency.status);

        let priority_match =
            self.priorities.is_empty() || self.priorities.contains(&emergency.priority);

        let user_match = self.user_id.map_or(true, |id| emergency.user_id == id);

        let responder_match = self
            .responder
            .map_or(true, |id| emergency.responder == Some(id));

        status_match && priority_match && user_match && responder_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches() {
        let user = Uuid::new_v4();
        let emergency = Emergency::new(
            "Medical".to_string(),
            "Fainted".to_string(),
            "Park".to_string(),
            Priority::Medium,
            user,
        );

        assert!(EmergencyFilter::default().matches(&emergency));

        let filter = EmergencyFilter {
            priorities: vec![Priority::High],
            ..Default::default()
        };
        assert!(!filter.matches(&emergency));

        let filter = EmergencyFilter {
            statuses: vec![EmergencyStatus::Pending],
            user_id: Some(user),
            ..Default::default()
        };
        assert!(filter.matches(&emergency));

        let filter = EmergencyFilter {
            responder: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!filter.matches(&emergency));
    }
}
