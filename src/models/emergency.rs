use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Triage urgency tier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Check if responders should be dispatched immediately
    pub fn is_urgent(&self) -> bool {
        matches!(self, Priority::High)
    }
}

/// Lifecycle of a reported emergency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmergencyStatus {
    Pending,
    Assigned,
    Resolved,
}

/// An emergency reported by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emergency {
    /// Unique identifier
    pub id: Uuid,

    /// Kind of emergency as chosen by the reporter ("Fire", "Medical", ...)
    #[serde(rename = "type")]
    pub emergency_type: String,

    /// Free-text description
    pub description: String,

    /// Address or GPS fix
    pub location: String,

    pub priority: Priority,

    pub status: EmergencyStatus,

    /// Report time
    pub timestamp: DateTime<Utc>,

    /// Reporting user
    #[serde(rename = "userId")]
    pub user_id: Uuid,

    /// Responder handling the emergency
    pub responder: Option<Uuid>,
}

impl Emergency {
    /// Create a new pending emergency
    pub fn new(
        emergency_type: String,
        description: String,
        location: String,
        priority: Priority,
        user_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            emergency_type,
            description,
            location,
            priority,
            status: EmergencyStatus::Pending,
            timestamp: Utc::now(),
            user_id,
            responder: None,
        }
    }

    /// Hand the emergency to a responder
    pub fn assign(&mut self, responder: Uuid) {
        self.responder = Some(responder);
        self.status = EmergencyStatus::Assigned;
    }

    pub fn is_open(&self) -> bool {
        self.status != EmergencyStatus::Resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Emergency {
        Emergency::new(
            "Fire".to_string(),
            "Smoke in the stairwell".to_string(),
            "12 Main St".to_string(),
            Priority::High,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_new_emergency_is_pending() {
        let emergency = sample();
        assert_eq!(emergency.status, EmergencyStatus::Pending);
        assert!(emergency.responder.is_none());
        assert!(emergency.is_open());
    }

    #[test]
    fn test_assign_sets_status() {
        let mut emergency = sample();
        let responder = Uuid::new_v4();
        emergency.assign(responder);
        assert_eq!(emergency.status, EmergencyStatus::Assigned);
        assert_eq!(emergency.responder, Some(responder));
    }

    #[test]
    fn test_json_field_names() {
        let emergency = sample();
        let value = serde_json::to_value(&emergency).unwrap();
        assert_eq!(value["type"], "Fire");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["status"], "pending");
        assert!(value.get("userId").is_some());
        assert!(value["responder"].is_null());
    }

    #[test]
    fn test_priority_ordering_and_parsing() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!(Priority::High.to_string(), "high");
        assert!(Priority::High.is_urgent());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "resolved".parse::<EmergencyStatus>().unwrap(),
            EmergencyStatus::Resolved
        );
        assert_eq!(EmergencyStatus::Assigned.to_string(), "assigned");
    }
}
