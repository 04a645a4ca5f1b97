use crate::api::AppState;
use crate::auth::{AuthSession, AuthUser, OptionalAuthUser};
use crate::error::{AppError, Result};
use crate::metrics::gather_metrics;
use crate::models::{Emergency, EmergencyStatus, Priority, UserProfile};
use crate::processing::{EmergencyUpdate, ReportEmergency};
use crate::state::EmergencyFilter;
use crate::triage::Classification;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Prometheus scrape endpoint
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthSession>> {
    let session = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(flatten)]
    pub session: AuthSession,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let session = state
        .auth
        .register(&request.username, &request.password, &request.email)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            session,
        }),
    ))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub user: UserProfile,
}

/// Echo the account behind the bearer token
pub async fn validate_token(AuthUser(user): AuthUser) -> Json<ValidateResponse> {
    Json(ValidateResponse { user })
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub description: String,
}

/// Triage a description without recording an emergency
pub async fn classify_priority(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<Classification>> {
    let classification = state.processor.classify(&request.description)?;
    Ok(Json(classification))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEmergenciesQuery {
    pub status: Option<EmergencyStatus>,
    pub priority: Option<Priority>,
    #[serde(alias = "userId")]
    pub user_id: Option<Uuid>,
    pub responder: Option<Uuid>,
}

impl From<ListEmergenciesQuery> for EmergencyFilter {
    fn from(query: ListEmergenciesQuery) -> Self {
        EmergencyFilter {
            statuses: query.status.into_iter().collect(),
            priorities: query.priority.into_iter().collect(),
            user_id: query.user_id,
            responder: query.responder,
        }
    }
}

/// List emergencies, newest first
pub async fn list_emergencies(
    State(state): State<AppState>,
    Query(params): Query<ListEmergenciesQuery>,
) -> Result<Json<Vec<Emergency>>> {
    let emergencies = state.processor.list(&params.into()).await?;
    Ok(Json(emergencies))
}

#[derive(Debug, Deserialize)]
pub struct CreateEmergencyRequest {
    #[serde(flatten)]
    pub report: ReportEmergency,

    /// Reporter, when the request carries no bearer token
    #[serde(rename = "userId", default)]
    pub user_id: Option<Uuid>,
}

/// Report an emergency on behalf of the signed-in user or the given `userId`.
///
/// A bearer token that fails validation is rejected, never skipped.
pub async fn create_emergency(
    State(state): State<AppState>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Json(request): Json<CreateEmergencyRequest>,
) -> Result<(StatusCode, Json<Emergency>)> {
    let user_id = match (auth, request.user_id) {
        (Some(user), _) => user.id,
        (None, Some(user_id)) => user_id,
        (None, None) => {
            return Err(AppError::Validation(
                "userId is required without a bearer token".to_string(),
            ))
        }
    };

    let emergency = state.processor.report(request.report, user_id).await?;
    Ok((StatusCode::CREATED, Json(emergency)))
}

/// Get an emergency by ID
pub async fn get_emergency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Emergency>> {
    let emergency = state.processor.get(&id).await?;
    Ok(Json(emergency))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateEmergencyResponse {
    pub message: String,
    pub emergency: Emergency,
}

/// Change status and/or responder
pub async fn update_emergency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EmergencyUpdate>,
) -> Result<Json<UpdateEmergencyResponse>> {
    let emergency = state.processor.update(&id, request).await?;

    Ok(Json(UpdateEmergencyResponse {
        message: "Emergency updated successfully".to_string(),
        emergency,
    }))
}
