use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use bson::oid::ObjectId;
use chrono::Local;
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    AppState,
    auth::{self, Claims},
    error::ApiError,
    extract::{ApiJson, ApiQuery},
    models::{ClassPayload, FitnessClass, Role, User},
    store::{BookOutcome, ClassFilter, UpdateOutcome},
    validation,
};

type AuthHeader = Option<TypedHeader<Authorization<Bearer>>>;

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    /// One of member, trainer, admin. Defaults to member.
    pub role: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct ListClassesQuery {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub trainer: Option<String>,
    pub capacity: Option<u32>,
    pub available_slots: Option<u32>,
    pub participants: Option<String>,
    pub created_by: Option<String>,
}

fn authenticate(state: &AppState, auth: AuthHeader) -> Result<Claims, ApiError> {
    auth::verify_token(&state.settings, auth.map(|TypedHeader(a)| a))
}

#[utoipa::path(get, path = "/", tag = "health")]
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Fitness Class Management and Booking System API",
        "endpoints": {
            "/auth/register": "Register a new user",
            "/auth/login": "Log in and receive a bearer token",
            "/classes/": "List classes or create one (admin)",
            "/classes/{id}/book": "Book a class (member)"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "health")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "health")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 200, description = "User created"),
        (status = 400, description = "Invalid registration fields"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_credentials(&payload.name, &payload.email, &payload.password)?;
    let role = match payload.role.as_deref() {
        None => Role::Member,
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::BadRequest("Role must be one of: member, trainer, admin".into())
        })?,
    };

    let password_hash = auth::hash_password(&payload.password)?;
    let user = User {
        id: ObjectId::new().to_hex(),
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        role,
        password_hash,
        birthdate: payload.birthdate,
        gender: payload.gender,
    };
    let id = state.users.insert_unique(user)?;
    Ok(Json(json!({ "message": format!("User created with id: {id}") })))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login successful, token in body"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    // One message for both failure modes, no information leakage
    let invalid = || ApiError::Unauthorized("Invalid email or password".into());
    let user = state
        .users
        .find_by_email(&payload.email)
        .ok_or_else(invalid)?;
    if !auth::verify_password(&payload.password, &user.password_hash) {
        return Err(invalid());
    }
    let token = auth::issue_token(&state.settings, &user)?;
    Ok(Json(json!({ "message": "Login successful", "token": token })))
}

#[utoipa::path(
    get,
    path = "/classes/",
    params(
        ("name" = Option<String>, Query, description = "Filter by class name (substring)"),
        ("description" = Option<String>, Query, description = "Filter by description (substring)"),
        ("date" = Option<String>, Query, description = "Filter by date (exact)"),
        ("start_time" = Option<String>, Query, description = "Filter by start time (exact)"),
        ("end_time" = Option<String>, Query, description = "Filter by end time (exact)"),
        ("location" = Option<String>, Query, description = "Filter by location (substring)"),
        ("trainer" = Option<String>, Query, description = "Filter by trainer (substring)"),
        ("capacity" = Option<u32>, Query, description = "Filter by capacity (exact)"),
        ("available_slots" = Option<u32>, Query, description = "Filter by available slots (exact)"),
        ("participants" = Option<String>, Query, description = "Filter by participant id (substring)"),
        ("created_by" = Option<String>, Query, description = "Filter by creator (substring)")
    ),
    responses((status = 200, description = "List of classes", body = [FitnessClass])),
    tag = "classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListClassesQuery>,
) -> impl IntoResponse {
    let filter = ClassFilter {
        name: query.name,
        description: query.description,
        date: query.date,
        start_time: query.start_time,
        end_time: query.end_time,
        location: query.location,
        trainer: query.trainer,
        capacity: query.capacity,
        available_slots: query.available_slots,
        participants: query.participants,
        created_by: query.created_by,
    };
    let classes = state.classes.list(&filter);
    Json(json!({ "message": classes }))
}

#[utoipa::path(
    post,
    path = "/classes/",
    request_body = ClassPayload,
    responses(
        (status = 200, description = "Fitness class created"),
        (status = 400, description = "Invalid value provided for one of the fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "classes"
)]
pub async fn create_class(
    State(state): State<AppState>,
    auth: AuthHeader,
    ApiJson(payload): ApiJson<ClassPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = authenticate(&state, auth)?;
    auth::require_role(&claims, Role::Admin)?;
    validation::validate_class_payload(&payload)?;

    let class = FitnessClass {
        id: ObjectId::new().to_hex(),
        name: payload.name,
        description: payload.description,
        date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        location: payload.location,
        trainer: payload.trainer,
        capacity: payload.capacity,
        available_slots: payload.capacity,
        participants: Vec::new(),
        created_by: claims.sub,
    };
    let id = state.classes.insert(class);
    Ok(Json(
        json!({ "message": format!("Fitness class created with id: {id}") }),
    ))
}

#[utoipa::path(
    get,
    path = "/classes/{id}",
    params(("id" = String, Path, description = "Class id")),
    responses(
        (status = 200, description = "Fitness class", body = FitnessClass),
        (status = 404, description = "Fitness class not found")
    ),
    tag = "classes"
)]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let class = state
        .classes
        .find(&id)
        .ok_or_else(|| ApiError::NotFound("Fitness class not found".into()))?;
    Ok(Json(json!({ "message": class })))
}

#[utoipa::path(
    put,
    path = "/classes/{id}",
    params(("id" = String, Path, description = "Class id")),
    request_body = ClassPayload,
    responses(
        (status = 200, description = "Fitness class updated"),
        (status = 400, description = "Invalid value provided for one of the fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Fitness class not found")
    ),
    security(("bearer_auth" = [])),
    tag = "classes"
)]
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthHeader,
    ApiJson(payload): ApiJson<ClassPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = authenticate(&state, auth)?;
    auth::require_role(&claims, Role::Admin)?;
    validation::validate_class_payload(&payload)?;

    match state.classes.update(&id, &payload) {
        UpdateOutcome::Updated => Ok(Json(json!({ "message": "Fitness class updated" }))),
        UpdateOutcome::NotFound => Err(ApiError::NotFound("Fitness class not found".into())),
        UpdateOutcome::CapacityTooSmall => Err(ApiError::BadRequest(
            "Capacity cannot be lower than the current participant count".into(),
        )),
    }
}

#[utoipa::path(
    get,
    path = "/classes/{id}/participants",
    params(("id" = String, Path, description = "Class id")),
    responses(
        (status = 200, description = "Participant user ids"),
        (status = 404, description = "Fitness class not found")
    ),
    tag = "classes"
)]
pub async fn get_participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let participants = state
        .classes
        .participants(&id)
        .ok_or_else(|| ApiError::NotFound("Fitness class not found".into()))?;
    Ok(Json(json!({ "message": participants })))
}

#[utoipa::path(
    post,
    path = "/classes/{id}/book",
    params(("id" = String, Path, description = "Class id")),
    responses(
        (status = 200, description = "Class booked"),
        (status = 400, description = "Booking closed, already booked, or class full"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Member access required"),
        (status = 404, description = "Fitness class not found")
    ),
    security(("bearer_auth" = [])),
    tag = "classes"
)]
pub async fn book_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthHeader,
) -> Result<impl IntoResponse, ApiError> {
    let claims = authenticate(&state, auth)?;
    let class = state
        .classes
        .find(&id)
        .ok_or_else(|| ApiError::NotFound("Fitness class not found".into()))?;

    let now = Local::now().naive_local();
    if validation::booking_closed(
        &class.date,
        &class.start_time,
        state.settings.booking_grace_minutes,
        now,
    )? {
        return Err(ApiError::BadRequest(
            "Booking for this class has closed".into(),
        ));
    }
    auth::require_role(&claims, Role::Member)?;

    match state.classes.book(&id, &claims.sub) {
        BookOutcome::Booked => Ok(Json(json!({ "message": format!("Booked class {id}") }))),
        BookOutcome::NotFound => Err(ApiError::NotFound("Fitness class not found".into())),
        BookOutcome::AlreadyBooked => Err(ApiError::BadRequest(
            "You have already booked this class".into(),
        )),
        BookOutcome::Full => Err(ApiError::BadRequest("Class is fully booked".into())),
    }
}
