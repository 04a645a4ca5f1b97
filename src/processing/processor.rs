use crate::error::{AppError, Result};
use crate::metrics::{
    CLASSIFICATIONS_TOTAL, CLASSIFICATION_DURATION_SECONDS, CLASSIFICATION_FAILURES_TOTAL,
    EMERGENCIES_TOTAL,
};
use crate::models::{Emergency, EmergencyStatus, Priority};
use crate::state::{EmergencyFilter, EmergencyStore};
use crate::triage::{Classification, ClassificationError, PriorityClassifier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// A new emergency as submitted by a reporter
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportEmergency {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100))]
    pub emergency_type: String,

    #[validate(length(min = 1))]
    pub description: String,

    #[validate(length(min = 1, max = 500))]
    pub location: String,

    /// Reporter-chosen priority; classified from the description when absent
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Changes a responder can make to an emergency
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmergencyUpdate {
    pub status: Option<EmergencyStatus>,
    pub responder: Option<Uuid>,
}

/// Emergency workflow: triage, persistence, lookup and status changes
pub struct EmergencyProcessor {
    store: Arc<dyn EmergencyStore>,
    classifier: Arc<PriorityClassifier>,
}

impl EmergencyProcessor {
    pub fn new(store: Arc<dyn EmergencyStore>, classifier: Arc<PriorityClassifier>) -> Self {
        Self { store, classifier }
    }

    /// Classify a description, recording metrics
    pub fn classify(&self, description: &str) -> Result<Classification> {
        if let Some(max_len) = self.classifier.config().max_description_len {
            let len = description.chars().count();
            if len > max_len {
                return Err(ClassificationError::InvalidInput(format!(
                    "Description is {} characters; the limit is {}",
                    len, max_len
                ))
                .into());
            }
        }

        let timer = CLASSIFICATION_DURATION_SECONDS.start_timer();
        let outcome = self.classifier.classify(description);
        timer.observe_duration();

        match outcome {
            Ok(classification) => {
                CLASSIFICATIONS_TOTAL
                    .with_label_values(&[classification.priority.to_string().as_str()])
                    .inc();
                Ok(classification)
            }
            Err(e) => {
                CLASSIFICATION_FAILURES_TOTAL.inc();
                tracing::error!(error = %e, "Classification failed");
                Err(e.into())
            }
        }
    }

    /// Record a new pending emergency for `user_id`
    pub async fn report(&self, request: ReportEmergency, user_id: Uuid) -> Result<Emergency> {
        request.validate()?;

        let priority = match request.priority {
            Some(priority) => priority,
            None => self.classify(&request.description)?.priority,
        };

        let emergency = Emergency::new(
            request.emergency_type,
            request.description,
            request.location,
            priority,
            user_id,
        );

        self.store.save_emergency(&emergency).await?;

        EMERGENCIES_TOTAL
            .with_label_values(&[emergency.priority.to_string().as_str()])
            .inc();

        tracing::info!(
            emergency_id = %emergency.id,
            user_id = %user_id,
            priority = %emergency.priority,
            "Emergency reported"
        );

        if emergency.priority.is_urgent() {
            tracing::warn!(
                emergency_id = %emergency.id,
                location = %emergency.location,
                "High priority emergency awaiting dispatch"
            );
        }

        Ok(emergency)
    }

    /// Emergencies matching `filter`, newest first
    pub async fn list(&self, filter: &EmergencyFilter) -> Result<Vec<Emergency>> {
        self.store.list_emergencies(filter).await
    }

    pub async fn get(&self, id: &Uuid) -> Result<Emergency> {
        self.store
            .get_emergency(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Emergency {} not found", id)))
    }

    /// Apply a status and/or responder change.
    ///
    /// Naming a responder without a status moves the emergency to
    /// `assigned`.
    pub async fn update(&self, id: &Uuid, update: EmergencyUpdate) -> Result<Emergency> {
        if update.status.is_none() && update.responder.is_none() {
            return Err(AppError::Validation(
                "Nothing to update: provide status or responder".to_string(),
            ));
        }

        let mut emergency = self.get(id).await?;

        match update.status {
            Some(status) => {
                if let Some(responder) = update.responder {
                    emergency.responder = Some(responder);
                }
                emergency.status = status;
            }
            None => {
                if let Some(responder) = update.responder {
                    emergency.assign(responder);
                }
            }
        }

        self.store.update_emergency(&emergency).await?;

        tracing::info!(
            emergency_id = %emergency.id,
            status = %emergency.status,
            responder = ?emergency.responder,
            "Emergency updated"
        );

        Ok(emergency)
    }
}
