use emergency_triage::{
    error::AppError,
    models::{Emergency, EmergencyStatus, Priority, Role, User},
    state::{EmergencyFilter, EmergencyStore, InMemoryStore, SledStore, UserStore},
};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

/// Helper to create test emergency
fn create_test_emergency(description: &str, priority: Priority, user_id: Uuid) -> Emergency {
    Emergency::new(
        "Medical".to_string(),
        description.to_string(),
        "Central Station".to_string(),
        priority,
        user_id,
    )
}

/// Test suite that runs against any EmergencyStore implementation
async fn test_emergency_operations<S: EmergencyStore + 'static>(store: Arc<S>) {
    let reporter = Uuid::new_v4();

    // Save and retrieve
    let emergency = create_test_emergency("Passenger collapsed", Priority::High, reporter);
    let id = emergency.id;
    store.save_emergency(&emergency).await.unwrap();

    let retrieved = store.get_emergency(&id).await.unwrap();
    assert!(retrieved.is_some());
    assert_eq!(
        retrieved.as_ref().unwrap().description,
        "Passenger collapsed"
    );

    // Assign a responder
    let mut emergency = retrieved.unwrap();
    let responder = Uuid::new_v4();
    emergency.assign(responder);
    store.update_emergency(&emergency).await.unwrap();

    let updated = store.get_emergency(&id).await.unwrap().unwrap();
    assert_eq!(updated.status, EmergencyStatus::Assigned);
    assert_eq!(updated.responder, Some(responder));

    // Filter by responder
    let filter = EmergencyFilter {
        responder: Some(responder),
        ..Default::default()
    };
    let assigned = store.list_emergencies(&filter).await.unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].id, id);

    // Unknown ids
    assert!(store.get_emergency(&Uuid::new_v4()).await.unwrap().is_none());
    let ghost = create_test_emergency("ghost", Priority::Low, reporter);
    assert!(matches!(
        store.update_emergency(&ghost).await,
        Err(AppError::NotFound(_))
    ));
}

async fn test_filtering<S: EmergencyStore + 'static>(store: Arc<S>) {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for i in 0..9 {
        let priority = match i % 3 {
            0 => Priority::High,
            1 => Priority::Medium,
            _ => Priority::Low,
        };
        let reporter = if i < 4 { alice } else { bob };
        let emergency = create_test_emergency(&format!("Report {}", i), priority, reporter);
        store.save_emergency(&emergency).await.unwrap();
    }

    let high = EmergencyFilter {
        priorities: vec![Priority::High],
        ..Default::default()
    };
    assert_eq!(store.count_emergencies(&high).await.unwrap(), 3);

    let by_alice = EmergencyFilter {
        user_id: Some(alice),
        ..Default::default()
    };
    let alice_reports = store.list_emergencies(&by_alice).await.unwrap();
    assert_eq!(alice_reports.len(), 4);
    assert!(alice_reports.iter().all(|e| e.user_id == alice));

    let pending = EmergencyFilter {
        statuses: vec![EmergencyStatus::Pending],
        ..Default::default()
    };
    assert_eq!(store.count_emergencies(&pending).await.unwrap(), 9);

    // Newest first
    let all = store.list_emergencies(&EmergencyFilter::default()).await.unwrap();
    assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

async fn test_user_operations<S: UserStore + 'static>(store: Arc<S>) {
    let user = User::new(
        "erin".to_string(),
        "erin@example.com".to_string(),
        "hash".to_string(),
        Role::User,
    );
    store.save_user(&user).await.unwrap();

    assert_eq!(
        store.find_by_username("erin").await.unwrap().unwrap().id,
        user.id
    );
    assert_eq!(
        store
            .find_by_email("ERIN@example.com")
            .await
            .unwrap()
            .unwrap()
            .id,
        user.id
    );

    let same_name = User::new(
        "erin".to_string(),
        "erin2@example.com".to_string(),
        "hash".to_string(),
        Role::User,
    );
    assert!(matches!(
        store.save_user(&same_name).await,
        Err(AppError::Conflict(_))
    ));

    let same_email = User::new(
        "erin2".to_string(),
        "erin@example.com".to_string(),
        "hash".to_string(),
        Role::User,
    );
    assert!(matches!(
        store.save_user(&same_email).await,
        Err(AppError::Conflict(_))
    ));

    assert!(store.delete_by_username("erin").await.unwrap());
    assert!(store.get_user(&user.id).await.unwrap().is_none());

    // Name is free again
    store.save_user(&same_name).await.unwrap();
}

#[tokio::test]
async fn test_in_memory_store() {
    let store = Arc::new(InMemoryStore::new());
    test_emergency_operations(store.clone()).await;
    test_user_operations(store).await;
}

#[tokio::test]
async fn test_in_memory_filtering() {
    test_filtering(Arc::new(InMemoryStore::new())).await;
}

#[tokio::test]
async fn test_sled_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SledStore::new(temp_dir.path()).unwrap());
    test_emergency_operations(store.clone()).await;
    test_user_operations(store).await;
}

#[tokio::test]
async fn test_sled_filtering() {
    let temp_dir = TempDir::new().unwrap();
    test_filtering(Arc::new(SledStore::new(temp_dir.path()).unwrap())).await;
}

#[tokio::test]
async fn test_sled_persistence() {
    let temp_dir = TempDir::new().unwrap();
    let reporter = Uuid::new_v4();
    let emergency = create_test_emergency("Gas leak", Priority::High, reporter);

    {
        let store = SledStore::new(temp_dir.path()).unwrap();
        store.save_emergency(&emergency).await.unwrap();
        store
            .save_user(&User::new(
                "frank".to_string(),
                "frank@example.com".to_string(),
                "hash".to_string(),
                Role::Responder,
            ))
            .await
            .unwrap();
        store.flush().await.unwrap();
    }

    let store = SledStore::new(temp_dir.path()).unwrap();
    let retrieved = store.get_emergency(&emergency.id).await.unwrap().unwrap();
    assert_eq!(retrieved.user_id, reporter);
    assert_eq!(retrieved.priority, Priority::High);

    let frank = store.find_by_username("frank").await.unwrap().unwrap();
    assert_eq!(frank.role, Role::Responder);
}
